//! Common test utilities for review-notifier integration tests

#[allow(dead_code)]
pub mod fakes;

pub use fakes::*;
