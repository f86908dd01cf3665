//! Polling loop
//!
//! [`Monitor`] owns the cursor and the last notified status and runs one
//! fetch → validate → detect → deliver cycle per poll interval. Every cycle-level error
//! is caught here, logged with its kind, and reported to the chat on a best-effort
//! basis. Retryable errors leave the loop [`LoopState::Degraded`] and polling goes on;
//! a non-retryable one moves it to [`LoopState::Fatal`] and [`Monitor::run`] returns.
//!
//! # Example
//!
//! ```no_run
//! use review_notifier::{Config, ReviewMonitor};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let monitor = ReviewMonitor::from_config(&config)?;
//!
//! // Runs until the token is cancelled or a fatal error
//! let state = monitor.run(CancellationToken::new()).await;
//! println!("stopped in state {state}");
//! # Ok(())
//! # }
//! ```

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::detector::process;
use crate::error::{Error, Result};
use crate::fetcher::{HttpStatusApi, StatusApi};
use crate::notifier::{Messenger, Notifier, TelegramMessenger};
use crate::retry::IsRetryable;
use crate::types::{Cursor, LoopState, Transition};
use crate::validator::validate;
use crate::vocabulary::StatusVocabulary;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Render the chat message sent when a cycle fails
pub fn diagnostic_message(error: &Error) -> String {
    format!("Program failure: {error}")
}

/// Monitor wired to the real status API, Telegram and the system clock
pub type ReviewMonitor = Monitor<HttpStatusApi, TelegramMessenger, SystemClock>;

/// The polling loop and the state it carries between cycles
pub struct Monitor<A, M, C> {
    /// Source of status payloads
    api: A,

    /// Delivery to the configured chat
    notifier: Notifier<M>,

    /// Time source for the initial cursor and inter-cycle sleeps
    clock: C,

    /// Verdict texts
    vocabulary: StatusVocabulary,

    /// Fixed delay between cycles
    poll_interval: Duration,

    /// Lower bound for the next fetch
    cursor: Cursor,

    /// Status of the most recently notified submission
    last_seen: Option<String>,

    /// Outcome of the last cycle
    state: LoopState,
}

impl ReviewMonitor {
    /// Build the production monitor from a validated config
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the config is incomplete or an HTTP client cannot
    /// be created
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config,
            HttpStatusApi::new(config)?,
            TelegramMessenger::new(config)?,
            SystemClock,
        ))
    }
}

impl<A, M, C> Monitor<A, M, C>
where
    A: StatusApi,
    M: Messenger,
    C: Clock,
{
    /// Create a monitor with the cursor seeded from `clock`
    pub fn new(config: &Config, api: A, messenger: M, clock: C) -> Self {
        let cursor = clock.now();
        Self {
            api,
            notifier: Notifier::new(messenger, config.telegram_chat_id.clone()),
            clock,
            vocabulary: config.vocabulary.clone(),
            poll_interval: config.poll_interval,
            cursor,
            last_seen: None,
            state: LoopState::Running,
        }
    }

    /// Replace the starting cursor
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    /// Replace the starting last-seen status
    pub fn with_last_seen(mut self, status: impl Into<String>) -> Self {
        self.last_seen = Some(status.into());
        self
    }

    /// Cursor for the next fetch
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Status of the most recently notified submission
    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Outcome of the last cycle
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Fetch, validate, detect and deliver, without touching loop state
    async fn cycle(&self) -> Result<Transition> {
        let raw = self.api.fetch(self.cursor).await?;
        let response = validate(&raw)?;
        let transition = process(
            &response,
            self.last_seen.as_deref(),
            self.cursor,
            &self.vocabulary,
        )?;

        if let Some(message) = &transition.message {
            self.notifier.notify(message).await?;
            info!(
                chat_id = self.notifier.chat_id(),
                from = self.last_seen.as_deref().unwrap_or("none"),
                to = transition.last_seen.as_deref().unwrap_or("none"),
                "review status changed"
            );
        }

        Ok(transition)
    }

    /// Run one cycle and handle its outcome, without sleeping
    ///
    /// On success the cursor and last-seen status are committed. On failure both are
    /// left as they were and a diagnostic is sent if possible. A retryable failure makes
    /// the state [`LoopState::Degraded`]; any other makes it [`LoopState::Fatal`].
    pub async fn run_cycle(&mut self) -> LoopState {
        match self.cycle().await {
            Ok(transition) => {
                if self.state == LoopState::Degraded {
                    info!(cursor = %transition.cursor, "polling recovered");
                }
                self.cursor = transition.cursor;
                self.last_seen = transition.last_seen;
                self.state = LoopState::Running;
            }
            Err(e) => {
                error!(
                    kind = e.kind(),
                    retryable = e.is_retryable(),
                    cursor = %self.cursor,
                    error = %e,
                    "polling cycle failed"
                );
                self.notifier.report(&diagnostic_message(&e)).await;
                self.state = LoopState::after_error(&e);
            }
        }
        self.state
    }

    /// Run one cycle, then sleep for the poll interval unless the cycle was fatal
    pub async fn tick(&mut self) -> LoopState {
        let state = self.run_cycle().await;
        if state != LoopState::Fatal {
            self.clock.sleep(self.poll_interval).await;
        }
        state
    }

    /// Poll until `shutdown` is cancelled or a cycle fails fatally
    ///
    /// Cancellation is observed between cycles and during the sleep; a cycle in progress
    /// always finishes. Returns the state the loop stopped in.
    pub async fn run(mut self, shutdown: CancellationToken) -> LoopState {
        info!(
            cursor = %self.cursor,
            interval_secs = self.poll_interval.as_secs(),
            "review monitor started"
        );

        while !shutdown.is_cancelled() {
            if self.run_cycle().await == LoopState::Fatal {
                error!(cursor = %self.cursor, "review monitor stopping on fatal error");
                break;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.clock.sleep(self.poll_interval) => {}
            }
        }

        info!(cursor = %self.cursor, state = %self.state, "review monitor stopped");
        self.state
    }
}
