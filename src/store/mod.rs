//! The remote document store quiz responses are written to and read from.
//!
//! Documents live at `quizResponses/{group}/{user}`. Writes are upserts, reads
//! return every document under one group.

mod firebase;
mod memory;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::models::QuizResponse;

pub use firebase::FirebaseStore;
pub use memory::MemoryStore;

/// Root collection all quiz documents are stored under.
pub const RESPONSES_ROOT: &str = "quizResponses";

/// Every response in a group, keyed by the stored user key.
pub type GroupResponses = HashMap<String, QuizResponse>;

pub trait ResponseStore: Send + Sync + 'static {
    /// Upsert one user's response. Last write wins.
    fn write(
        &self,
        group_code: &str,
        user_name: &str,
        response: &QuizResponse,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All responses stored for a group. A group nobody has written to is
    /// empty, not an error.
    fn read_group(
        &self,
        group_code: &str,
    ) -> impl Future<Output = Result<GroupResponses, StoreError>> + Send;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error! status: {status}, response: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response from server: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid database URL: {0}")]
    InvalidUrl(String),
}

/// Coarse reason for a failed request, used to pick the message shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Permission,
    NotFound,
    Generic,
}

impl StoreError {
    pub fn category(&self) -> FailureCategory {
        match self {
            StoreError::Status {
                status: 401 | 403, ..
            } => FailureCategory::Permission,
            StoreError::Status { status: 404, .. } => FailureCategory::NotFound,
            _ => FailureCategory::Generic,
        }
    }

    /// Message suitable for showing to the user after a failed save.
    pub fn hint(&self) -> String {
        match self.category() {
            FailureCategory::Permission => {
                "Permission denied. Please check your database rules.".to_string()
            }
            FailureCategory::NotFound => {
                "Database path not found. Please check your database configuration.".to_string()
            }
            FailureCategory::Generic => format!("Error saving responses: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> StoreError {
        StoreError::Status {
            status,
            body: "{\"error\":\"nope\"}".to_string(),
        }
    }

    #[test]
    fn test_category_from_status() {
        assert_eq!(status(401).category(), FailureCategory::Permission);
        assert_eq!(status(403).category(), FailureCategory::Permission);
        assert_eq!(status(404).category(), FailureCategory::NotFound);
        assert_eq!(status(500).category(), FailureCategory::Generic);
        assert_eq!(
            StoreError::Timeout(Duration::from_secs(1)).category(),
            FailureCategory::Generic
        );
    }

    #[test]
    fn test_hint_text() {
        assert!(status(403).hint().starts_with("Permission denied"));
        assert!(status(404).hint().starts_with("Database path not found"));

        let hint = status(500).hint();
        assert!(hint.starts_with("Error saving responses:"));
        assert!(hint.contains("500"));
    }
}
