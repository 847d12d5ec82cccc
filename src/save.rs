use crate::error::SaveError;
use crate::turn::TurnRecord;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the remote `game_saves` table, upserted after every completed
/// turn. Never read back in this flow; the store's replace-on-matching-key
/// upsert makes last-write-wins the effective contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSave {
    pub session_id: Uuid,
    pub history: Vec<TurnRecord>,
    pub hp: u8,
    pub inventory: Vec<String>,
    pub location_name: String,
    pub last_updated: DateTime<Utc>,
}

/// Upsert-by-session-id persistence seam. Saves are fire-and-forget: a
/// failure is logged by the caller and never blocks or rolls back gameplay.
pub trait SaveStore: Send + Sync {
    fn upsert(&self, save: PersistedSave) -> BoxFuture<'static, Result<(), SaveError>>;
}

/// Document store client speaking the PostgREST upsert dialect.
pub struct RestSaveStore {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RestSaveStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/rest/v1/game_saves", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }
}

impl SaveStore for RestSaveStore {
    fn upsert(&self, save: PersistedSave) -> BoxFuture<'static, Result<(), SaveError>> {
        let request = self
            .http
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&save);

        Box::pin(async move {
            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(SaveError::Rejected(response.status().as_u16()));
            }
            Ok(())
        })
    }
}

/// Stand-in used when no document store is configured.
pub struct NoopSaveStore;

impl SaveStore for NoopSaveStore {
    fn upsert(&self, _save: PersistedSave) -> BoxFuture<'static, Result<(), SaveError>> {
        Box::pin(async { Ok(()) })
    }
}
