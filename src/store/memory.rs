use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::models::QuizResponse;
use crate::session::sanitize_key;

use super::{GroupResponses, ResponseStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    groups: HashMap<String, GroupResponses>,
    failure: Option<u16>,
}

/// In-process store. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following request fail with `status`, or succeed again
    /// with `None`.
    pub async fn fail_with(&self, status: Option<u16>) {
        self.inner.lock().await.failure = status;
    }

    /// Number of documents stored across all groups.
    pub async fn len(&self) -> usize {
        self.inner
            .lock()
            .await
            .groups
            .values()
            .map(HashMap::len)
            .sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn injected(status: u16) -> StoreError {
    StoreError::Status {
        status,
        body: "injected failure".to_string(),
    }
}

impl ResponseStore for MemoryStore {
    async fn write(
        &self,
        group_code: &str,
        user_name: &str,
        response: &QuizResponse,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(status) = inner.failure {
            return Err(injected(status));
        }

        debug!(group_code, user_name, "storing response in memory");
        inner
            .groups
            .entry(sanitize_key(group_code))
            .or_default()
            .insert(sanitize_key(user_name), response.clone());
        Ok(())
    }

    async fn read_group(&self, group_code: &str) -> Result<GroupResponses, StoreError> {
        let inner = self.inner.lock().await;
        if let Some(status) = inner.failure {
            return Err(injected(status));
        }

        Ok(inner
            .groups
            .get(&sanitize_key(group_code))
            .cloned()
            .unwrap_or_default())
    }
}
