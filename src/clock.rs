//! Time source for the polling loop
//!
//! The loop reads wall-clock time once (to seed the cursor) and sleeps between cycles.
//! Both go through [`Clock`] so tests can run many cycles without waiting.

use crate::types::Cursor;
use async_trait::async_trait;
use std::time::Duration;

/// Wall-clock reading and sleeping
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time as a cursor (Unix seconds)
    fn now(&self) -> Cursor;

    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by the system clock and the tokio timer
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Cursor {
        Cursor(chrono::Utc::now().timestamp())
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
