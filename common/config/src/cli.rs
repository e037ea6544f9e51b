//! CLI surface (§6).
//!
//! Parsing itself is handled by `clap`; this module owns the argument
//! struct and the small amount of post-processing needed to turn it into a
//! [`crate::ParameterManager`] plus a list of wiring files to load, which is
//! as far as this core goes — plugin discovery and dynamic loading are out
//! of scope (§1) and surface here only as a stub error.

use crate::error::ConfigError;
use crate::error::PluginLoadingNotImplementedSnafu;
use clap::Parser;

/// Top-level CLI arguments for the `jana` entry point.
#[derive(Debug, Clone, Parser)]
#[command(name = "jana", about = "JANA multi-threaded event processing core")]
pub struct CliArgs {
    /// Initial worker thread count.
    #[arg(long, default_value_t = num_cpus::get())]
    pub nthreads: usize,

    /// Maximum events to emit per source. Unbounded if omitted.
    #[arg(long)]
    pub nevents: Option<u64>,

    /// Load a named plugin. Delegated to the external plugin loader; this
    /// core only validates the flag's shape and reports
    /// [`ConfigError::PluginLoadingNotImplemented`] if any are supplied.
    #[arg(long = "plugin")]
    pub plugins: Vec<String>,

    /// Directory to search for plugin shared objects.
    #[arg(long = "sodir")]
    pub so_dirs: Vec<String>,

    /// Load a specific plugin shared object file.
    #[arg(long = "so")]
    pub so_files: Vec<String>,

    /// Parameter file(s) to load, in increasing precedence order.
    #[arg(long = "config")]
    pub config_files: Vec<String>,

    /// Wiring file(s) to load, in increasing priority order.
    #[arg(long = "wiring")]
    pub wiring_files: Vec<String>,

    /// Set or override a single parameter: `-Pkey=value`.
    #[arg(short = 'P', value_name = "key=value")]
    pub param_overrides: Vec<String>,

    /// Force a factory to run on every event even with no declared
    /// consumer. Repeatable; `type[:label]`.
    #[arg(long = "auto_activate")]
    pub auto_activate: Vec<String>,
}

impl CliArgs {
    /// Returns an error if any plugin-loading flags were supplied, since
    /// this core does not implement dynamic shared-object loading (§1).
    pub fn reject_plugin_loading(&self) -> Result<(), ConfigError> {
        if let Some(what) = self
            .plugins
            .first()
            .or_else(|| self.so_dirs.first())
            .or_else(|| self.so_files.first())
        {
            return PluginLoadingNotImplementedSnafu {
                what: what.clone(),
            }
            .fail();
        }
        Ok(())
    }

    /// Splits an `--auto_activate=type[:label]` entry into its factory
    /// type name and optional label.
    pub fn parse_auto_activate(entry: &str) -> (&str, &str) {
        match entry.split_once(':') {
            Some((type_name, label)) => (type_name, label),
            None => (entry, ""),
        }
    }
}

#[cfg(test)]
#[path = "cli.test.rs"]
mod tests;
