//! `jana` process entry point (§6 "CLI surface").
//!
//! Everything this binary does beyond argument parsing and lifecycle
//! sequencing — plugin discovery, the concrete sources/processors/factories
//! a real run would register — is out of this core's scope (§1); an
//! embedding application links `jana-engine` directly and calls
//! [`jana_engine::Engine::registry`] before `initialize` to add its own
//! components. This binary exists so the CLI surface described in §6 has a
//! real process behind it: it loads parameter and wiring files, applies
//! `-Pkey=value` overrides, rejects `--plugin`/`--sodir`/`--so` since
//! dynamic loading isn't implemented here, and runs an otherwise-empty
//! topology through `Initialize -> Run -> Stop`, exiting with the status
//! code §6 specifies.

use clap::Parser;
use error::CliError;
use error::IoSnafu;
use jana_config::CliArgs;
use jana_config::ParameterManager;
use jana_config::ResolvedWiring;
use jana_config::WiringFile;
use jana_engine::Engine;
use jana_engine::EngineConfig;
use jana_error::ErrorExt;
use jana_otel::LogFormat;
use snafu::ResultExt;
use std::time::Duration;

mod error;

fn main() {
    let args = CliArgs::parse();

    if let Err(err) = jana_otel::init_logging(LogFormat::Compact) {
        eprintln!("warning: logging already initialized: {err}");
    }

    let exit_code = run(args).unwrap_or_else(|err| {
        eprintln!("jana: {err}");
        err.status_code().exit_code()
    });
    std::process::exit(exit_code);
}

fn run(args: CliArgs) -> Result<i32, CliError> {
    args.reject_plugin_loading()?;

    let mut parameters = ParameterManager::new();
    for path in &args.config_files {
        parameters.load_file(std::path::Path::new(path))?;
    }
    for raw in &args.param_overrides {
        parameters.apply_override(raw)?;
    }

    let mut wiring_layers = Vec::with_capacity(args.wiring_files.len());
    for path in &args.wiring_files {
        let contents = std::fs::read_to_string(path).context(IoSnafu { path: path.clone() })?;
        wiring_layers.push(WiringFile::parse(&contents).map_err(|source| {
            jana_config::ConfigError::MalformedWiring { path: path.into(), source }
        })?);
    }
    let wiring = ResolvedWiring::from_layers(wiring_layers)?;
    tracing::debug!(prefixes = wiring.prefixes().count(), "resolved wiring layers");

    let auto_activate = args
        .auto_activate
        .iter()
        .map(|entry| {
            let (type_name, label) = CliArgs::parse_auto_activate(entry);
            (type_name.to_string(), label.to_string())
        })
        .collect();

    let config = EngineConfig {
        nthreads: args.nthreads.max(1),
        nevents: args.nevents,
        auto_activate,
        per_event_timeout: Some(Duration::from_secs(8)),
        ..EngineConfig::default()
    };

    let engine = Engine::new(config);

    // A real run registers sources/processors/factory generators here,
    // via `engine.registry().add_*`, before `initialize`; this core has
    // none of its own (§1 "the user-written processors, sources, and
    // factories themselves" is out of scope).

    engine.initialize(0)?;
    engine.run()?;
    engine.stop(true)?;

    Ok(engine.exit_code())
}

#[cfg(test)]
#[path = "main.test.rs"]
mod tests;
