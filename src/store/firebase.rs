//! Realtime database REST client.

use std::collections::HashMap;

use reqwest::{Client, Response, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::QuizResponse;
use crate::session::sanitize_key;

use super::{GroupResponses, ResponseStore, RESPONSES_ROOT, StoreError};

#[derive(Debug, Clone)]
pub struct FirebaseStore {
    client: Client,
    base: Url,
}

impl FirebaseStore {
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        Self::with_client(database_url, Client::new())
    }

    pub fn with_client(database_url: &str, client: Client) -> Result<Self, StoreError> {
        let base = Url::parse(database_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", database_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(database_url.to_string()));
        }

        Ok(Self { client, base })
    }

    /// `{base}/quizResponses/{group}.json`, or `.../{group}/{user}.json` when a
    /// user is given. Segments are sanitized, then percent-encoded.
    pub fn document_url(&self, group_code: &str, user_name: Option<&str>) -> Result<Url, StoreError> {
        let group = sanitize_key(group_code);
        let tail = match user_name {
            Some(user) => vec![group, format!("{}.json", sanitize_key(user))],
            None => vec![format!("{}.json", group)],
        };

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(RESPONSES_ROOT)
            .extend(tail.iter());

        Ok(url)
    }
}

/// Read the body of a response, turning non-2xx statuses into errors.
async fn checked_body(response: Response) -> Result<String, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), %body, "request rejected");
        return Err(StoreError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

/// Decode a group read. Documents that do not hold a usable response are
/// skipped so one bad entry does not hide everyone else.
fn decode_group(body: &str) -> Result<GroupResponses, StoreError> {
    let raw: Option<HashMap<String, Value>> = serde_json::from_str(body)?;

    let group = raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<QuizResponse>(value) {
            Ok(response) if response.responses.iter().all(|a| a.is_valid()) => {
                Some((key, response))
            }
            Ok(_) => {
                warn!(%key, "skipping response with off-grid answers");
                None
            }
            Err(e) => {
                warn!(%key, error = %e, "skipping malformed response");
                None
            }
        })
        .collect();

    Ok(group)
}

impl ResponseStore for FirebaseStore {
    async fn write(
        &self,
        group_code: &str,
        user_name: &str,
        response: &QuizResponse,
    ) -> Result<(), StoreError> {
        let url = self.document_url(group_code, Some(user_name))?;
        debug!(%url, "saving quiz response");

        let reply = self.client.put(url).json(response).send().await?;
        let body = checked_body(reply).await?;

        // A successful save echoes the document back; anything else is suspect.
        let _ack: serde_json::Value = serde_json::from_str(&body)?;
        Ok(())
    }

    async fn read_group(&self, group_code: &str) -> Result<GroupResponses, StoreError> {
        let url = self.document_url(group_code, None)?;
        debug!(%url, "reading group responses");

        let reply = self.client.get(url).send().await?;
        let body = checked_body(reply).await?;

        decode_group(&body)
    }
}
