//! # review-notifier
//!
//! Watches a homework review status API and forwards status changes to a Telegram chat.
//!
//! ## How it works
//!
//! Every poll interval the [`Monitor`] asks the status API for submissions updated since
//! its cursor, validates the payload, and compares the newest submission's status with
//! the last one it reported. A change produces one message; an unchanged status
//! produces none. Failures of any single cycle are logged, reported to the chat when
//! possible, and retried on the next cycle. Only failures that waiting cannot fix
//! (missing or invalid configuration) stop the process.
//!
//! ## Quick Start
//!
//! ```no_run
//! use review_notifier::{Config, ReviewMonitor, run_with_shutdown};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let monitor = ReviewMonitor::from_config(&config)?;
//!
//!     // Polls until SIGINT/SIGTERM or a fatal error
//!     let state = run_with_shutdown(monitor).await;
//!     tracing::info!(%state, "stopped");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Injectable time source
pub mod clock;
/// Configuration types
pub mod config;
/// Status transition detection
pub mod detector;
/// Error types
pub mod error;
/// Status API client
pub mod fetcher;
/// Polling loop
pub mod monitor;
/// Message delivery
pub mod notifier;
/// Failure classification
pub mod retry;
/// Core types
pub mod types;
/// Response validation
pub mod validator;
/// Review status vocabulary
pub mod vocabulary;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{Error, Result, SchemaError};
pub use fetcher::{HttpStatusApi, StatusApi};
pub use monitor::{Monitor, ReviewMonitor};
pub use notifier::{Messenger, Notifier, TelegramMessenger};
pub use retry::IsRetryable;
pub use types::{Cursor, LoopState, StatusResponse, SubmissionRecord, Transition};
pub use vocabulary::{ReviewStatus, StatusVocabulary};

use tokio_util::sync::CancellationToken;

/// Run the monitor until SIGTERM or Ctrl+C, returning the state it stopped in.
///
/// A cycle that is already running finishes before the monitor stops. A fatal cycle error
/// stops it without a signal.
pub async fn run_with_shutdown<A, M, C>(monitor: Monitor<A, M, C>) -> LoopState
where
    A: StatusApi,
    M: Messenger,
    C: Clock,
{
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    let listener = tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();
    });

    let state = monitor.run(shutdown).await;
    listener.abort();
    state
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                _ = tokio::signal::ctrl_c() => tracing::info!("received Ctrl+C"),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C only");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl+C");
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl+C"),
        Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl+C"),
    }
}
