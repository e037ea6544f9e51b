//! Parameter/wiring configuration and CLI argument surface for the JANA
//! core (§6, §4.8).
//!
//! This crate owns everything "out of scope" for the algorithmic core that
//! is nonetheless part of the engine's external interface: parameter file
//! parsing, `-Pkey=value` overrides, wiring file parsing and layered
//! overlay, and the CLI argument struct. It never reaches into the
//! execution engine itself — `jana-engine` and `jana-cli` consume the types
//! defined here.

mod cli;
mod error;
mod parameter;
mod wiring;

pub use cli::CliArgs;
pub use error::ConfigError;
pub use parameter::ParameterManager;
pub use wiring::ResolvedWiring;
pub use wiring::WiringEntry;
pub use wiring::WiringFile;
