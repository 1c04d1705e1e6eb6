//! # Fault Probe
//!
//! Small driver for the fault dispatch pipeline. Loads a configuration file,
//! registers a dispatcher with log and capture handlers, then raises one
//! simulated fault so the whole path (classification, handler chain, page
//! rendering, termination, shutdown check) can be observed end to end.

use clap::{Parser, ValueEnum};
use fault_common::config::{ConfigLoader, FaultConfig, SharedConfig};
use fault_common::fault::{Fault, Location};
use fault_common::host::Host;
use fault_common::severity::Severity;
use fault_dispatch::handlers::{CaptureHandler, JsonLineClient, LogHandler};
use fault_dispatch::{Dispatcher, ProcessHost, SharedDispatcher, register};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fault Probe: exercise the fault dispatch pipeline
#[derive(Parser, Debug)]
#[command(name = "fault_probe")]
#[command(version)]
#[command(about = "Raise a simulated fault through the dispatch pipeline")]
struct Args {
    /// Path to the fault pipeline configuration TOML.
    /// Built-in defaults are used when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fault to simulate.
    #[arg(value_enum, default_value_t = Scenario::Warning)]
    scenario: Scenario,

    /// Also write captured faults as JSON lines to stderr.
    #[arg(long)]
    capture: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Recoverable notice.
    Notice,
    /// Recoverable warning.
    Warning,
    /// Fatal user error: handlers run, then the process exits.
    Fatal,
    /// Panic caught by the caller; handlers see it as a native fault.
    Panic,
    /// Fatal fault recorded outside the pipeline, picked up at shutdown.
    Crash,
}

fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fault_probe: {e}");
            process::exit(2);
        }
    };
    setup_tracing(&args, &config.shared);

    info!(
        "Fault Probe v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Fault Probe finished");
}

fn load_config(args: &Args) -> Result<FaultConfig, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => FaultConfig::load(path)?,
        None => FaultConfig::from_toml(
            r#"
[shared]
service_name = "fault-probe"
"#,
        )?,
    };
    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: &FaultConfig) -> Result<(), Box<dyn std::error::Error>> {
    let host = Arc::new(ProcessHost::new(&config.host));
    let mut dispatcher = Dispatcher::from_config(host.clone(), &config.dispatch);
    dispatcher.push_handler(Arc::new(LogHandler::with_service(
        config.shared.service_name.as_str(),
    )));
    if args.capture {
        let client = JsonLineClient::new(config.shared.service_name.as_str(), std::io::stderr());
        dispatcher.push_handler(Arc::new(CaptureHandler::new(client)));
    }
    info!(
        "Dispatcher ready: fatal_mask={}, silenced={}, throw={}",
        dispatcher.fatal_mask(),
        dispatcher.is_silenced(),
        dispatcher.throws_as_exceptions()
    );

    let guard = register(SharedDispatcher::new(dispatcher))?;

    match args.scenario {
        Scenario::Notice => {
            guard.report(Severity::NOTICE, "probe notice")?;
        }
        Scenario::Warning => {
            guard.report(Severity::WARNING, "probe warning")?;
        }
        Scenario::Fatal => {
            guard.report(Severity::USER_ERROR, "probe fatal error")?;
        }
        Scenario::Panic => {
            let outcome = std::panic::catch_unwind(probe_panic);
            info!("Panic contained: {}", outcome.is_err());
        }
        Scenario::Crash => {
            host.record_fault(Fault::converted(
                Severity::ERROR,
                "probe crash",
                Some(Location::from(std::panic::Location::caller())),
            ));
        }
    }

    info!("Response status: {}", host.response_status().code());
    guard.shutdown()?;
    guard.deregister();
    Ok(())
}

fn probe_panic() {
    panic!("probe panic");
}

/// Setup tracing subscriber from config and CLI flags.
fn setup_tracing(args: &Args, shared: &SharedConfig) {
    let directive = if args.verbose {
        "debug"
    } else {
        shared.log_level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
