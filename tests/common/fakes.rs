//! Scripted stand-ins for the status API, the messenger and the clock
//!
//! Each fake is cheap to clone and shares its state between clones, so a test can hand
//! one clone to the monitor and keep another for assertions.

use async_trait::async_trait;
use review_notifier::{Clock, Config, Cursor, Error, Messenger, Result, StatusApi};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Config with fixed test credentials and default operational parameters
pub fn test_config() -> Config {
    Config::new("practicum-test-token", "123456:telegram-test-token", "424242")
}

/// Status API that replays queued results, then answers with an empty list
#[derive(Clone, Default)]
pub struct ScriptedApi {
    responses: Arc<Mutex<VecDeque<Result<Value>>>>,
    cursors: Arc<Mutex<Vec<Cursor>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub fn push_err(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Cursors received, in call order
    pub fn cursors(&self) -> Vec<Cursor> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusApi for ScriptedApi {
    async fn fetch(&self, cursor: Cursor) -> Result<Value> {
        self.cursors.lock().unwrap().push(cursor);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"homeworks": []})))
    }
}

/// Messenger that records successful deliveries and can be told to fail
#[derive(Clone, Default)]
pub struct RecordingMessenger {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    attempts: Arc<AtomicUsize>,
    failures_left: Arc<AtomicUsize>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` deliveries fail
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Successful deliveries as (chat_id, text)
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts of successful deliveries
    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }

    /// Delivery attempts, failed ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Delivery("Bot API returned status 502: Bad Gateway".into()));
        }

        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Clock frozen at a fixed time whose sleeps return immediately
#[derive(Clone)]
pub struct ManualClock {
    now: Cursor,
    sleeps: Arc<Mutex<Vec<Duration>>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ManualClock {
    pub fn at(timestamp: i64) -> Self {
        Self {
            now: Cursor(timestamp),
            sleeps: Arc::new(Mutex::new(Vec::new())),
            cancel_after: None,
        }
    }

    /// Cancel `token` once `count` sleeps have been requested
    pub fn cancel_after(mut self, count: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((count, token));
        self
    }

    /// Requested sleep durations, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Cursor {
        self.now
    }

    async fn sleep(&self, duration: Duration) {
        let count = {
            let mut sleeps = self.sleeps.lock().unwrap();
            sleeps.push(duration);
            sleeps.len()
        };

        if let Some((limit, token)) = &self.cancel_after
            && count >= *limit
        {
            token.cancel();
        }
    }
}
