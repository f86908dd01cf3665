//! review-notifier binary
//!
//! Reads credentials from the environment (and `.env`), then polls until SIGINT/SIGTERM.
//! Exits non-zero when a fatal error (missing or invalid configuration) stops it.

use review_notifier::config::env_file_outcome;
use review_notifier::{Config, Error, LoopState, ReviewMonitor, run_with_shutdown};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match env_file_outcome(dotenv) {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "loaded environment file"),
        // No .env file; real environment variables still apply
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "could not load .env file"),
    }

    let monitor = match Config::from_env().and_then(|config| ReviewMonitor::from_config(&config)) {
        Ok(monitor) => monitor,
        Err(e) => return startup_failure(&e),
    };

    run_with_shutdown(monitor).await.exit_code()
}

/// The monitor never started, so any error here fails the process
fn startup_failure(e: &Error) -> ExitCode {
    let missing = match e {
        Error::Config { missing, .. } => missing.join(", "),
        _ => String::new(),
    };
    tracing::error!(
        kind = e.kind(),
        state = %LoopState::after_error(e),
        missing = %missing,
        error = %e,
        "startup precondition failed"
    );
    ExitCode::FAILURE
}
