//! Review status vocabulary
//!
//! The remote API reports one of three status codes for a submission. Each maps to a
//! human-readable verdict that ends up in the notification text. The set of codes is
//! closed: anything else is a data-integrity problem, not something to skip.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review status codes understood by the notifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Reviewer accepted the work
    Approved,
    /// Reviewer picked the work up
    Reviewing,
    /// Reviewer returned the work with remarks
    Rejected,
}

impl ReviewStatus {
    /// All known statuses
    pub const ALL: [ReviewStatus; 3] = [
        ReviewStatus::Approved,
        ReviewStatus::Reviewing,
        ReviewStatus::Rejected,
    ];

    /// Wire code as sent by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Approved => "approved",
            ReviewStatus::Reviewing => "reviewing",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(ReviewStatus::Approved),
            "reviewing" => Ok(ReviewStatus::Reviewing),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(other.to_string()),
        }
    }
}

/// Mapping from status code to verdict text
///
/// Built once at startup as part of [`Config`](crate::config::Config) and only read
/// afterwards. The verdict texts may be overridden from configuration; the set of
/// status codes may not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusVocabulary {
    /// Verdict for `approved`
    #[serde(default = "default_approved")]
    pub approved: String,

    /// Verdict for `reviewing`
    #[serde(default = "default_reviewing")]
    pub reviewing: String,

    /// Verdict for `rejected`
    #[serde(default = "default_rejected")]
    pub rejected: String,
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self {
            approved: default_approved(),
            reviewing: default_reviewing(),
            rejected: default_rejected(),
        }
    }
}

impl StatusVocabulary {
    /// Verdict text for a known status
    pub fn verdict_for(&self, status: ReviewStatus) -> &str {
        match status {
            ReviewStatus::Approved => &self.approved,
            ReviewStatus::Reviewing => &self.reviewing,
            ReviewStatus::Rejected => &self.rejected,
        }
    }

    /// Verdict text for a raw status code, `None` if the code is not in the vocabulary
    pub fn verdict(&self, code: &str) -> Option<&str> {
        code.parse::<ReviewStatus>()
            .ok()
            .map(|status| self.verdict_for(status))
    }
}

fn default_approved() -> String {
    "Работа проверена: ревьюеру всё понравилось. Ура!".to_string()
}

fn default_reviewing() -> String {
    "Работа взята на проверку ревьюером.".to_string()
}

fn default_rejected() -> String {
    "Работа проверена: у ревьюера есть замечания.".to_string()
}
