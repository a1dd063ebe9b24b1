//! Runner utilities for standard main() implementations.
//!
//! The runner plays the host's role for a standalone process: it reads
//! newline-delimited JSON observation events from stdin and hands them to
//! the service one at a time.

use argh::FromArgs;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::load_config_or_default;
use super::traits::{Dispatch, HostInfo, WeatherService};
use crate::observation::ObservationEvent;

/// Host version assumed when none is given on the command line.
pub const DEFAULT_HOST_VERSION: &str = "4.10.2";

/// Standard CLI arguments for wxnow services.
#[derive(FromArgs, Debug)]
#[argh(description = "Write the wxnow status file from observation events on stdin")]
pub struct ServiceArgs {
    /// path to YAML configuration file
    #[argh(option, short = 'c', default = "String::from(\"wxnow.yaml\")")]
    pub config: String,

    /// version of the host engine producing the events
    #[argh(option, default = "String::from(DEFAULT_HOST_VERSION)")]
    pub host_version: String,
}

/// Per-run event counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub written: usize,
    pub ignored: usize,
    pub failed: usize,
    /// Lines that were not a valid observation event.
    pub malformed: usize,
}

impl DispatchSummary {
    fn record(&mut self, outcome: Dispatch) {
        match outcome {
            Dispatch::Written => self.written += 1,
            Dispatch::Ignored => self.ignored += 1,
            Dispatch::Failed => self.failed += 1,
        }
    }
}

/// Initialize logging with env_logger.
///
/// Respects RUST_LOG environment variable. Defaults to "info" level.
pub fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Run a WeatherService with standard CLI handling.
///
/// It handles:
/// - CLI argument parsing
/// - Logging setup
/// - Configuration loading (defaults when the file is absent)
/// - Host version check
/// - Stopping cleanly on Ctrl+C between events
pub fn run_service<S: WeatherService>() -> anyhow::Result<()> {
    setup_logging();

    let args: ServiceArgs = argh::from_env();
    let metadata = S::metadata();

    log::info!("Starting {} v{}", metadata.name, metadata.version);
    log::info!("  {}", metadata.description);
    log::info!("  events: {}", metadata.events.join(", "));
    log::info!("Loading config from: {}", args.config);

    let config: S::Config = load_config_or_default(&args.config)?;
    let host = HostInfo::new(args.host_version);
    let mut service = S::new(&host, config)?;

    // A Ctrl+C while idle on stdin exits at once; during an event the
    // runner finishes it first so the status file is never left half done.
    let stop = Arc::new(AtomicBool::new(false));
    let busy = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        let busy = Arc::clone(&busy);
        ctrlc::set_handler(move || {
            log::info!("Received shutdown signal");
            stop.store(true, Ordering::SeqCst);
            if !busy.load(Ordering::SeqCst) {
                std::process::exit(0);
            }
        })?;
    }

    let stdin = std::io::stdin();
    let summary = dispatch_events(&mut service, stdin.lock(), &stop, &busy)?;

    log::info!(
        "Service stopped: {} written, {} ignored, {} failed, {} malformed",
        summary.written,
        summary.ignored,
        summary.failed,
        summary.malformed
    );
    Ok(())
}

/// Feed every event line from `input` to `service` until EOF or `stop`.
///
/// Blank lines are skipped. A line that is not a valid observation event,
/// including one that is not UTF-8, is logged and counted as malformed; it
/// never ends the run. Only an I/O error reading `input` does.
pub fn dispatch_events<S: WeatherService, R: BufRead>(
    service: &mut S,
    mut input: R,
    stop: &AtomicBool,
    busy: &AtomicBool,
) -> std::io::Result<DispatchSummary> {
    let mut summary = DispatchSummary::default();
    let mut buf = Vec::new();

    while !stop.load(Ordering::SeqCst) {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        busy.store(true, Ordering::SeqCst);
        match serde_json::from_slice::<ObservationEvent>(line) {
            Ok(event) => summary.record(service.on_observation(&event)),
            Err(e) => {
                log::error!("Skipping malformed event: {}", e);
                summary.malformed += 1;
            }
        }
        busy.store(false, Ordering::SeqCst);
    }

    Ok(summary)
}
