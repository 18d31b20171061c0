use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use super::types::{GradeLevel, RecipientRecord};

/// Errors surfaced by the roster endpoint. All of these are recoverable:
/// the workflow keeps an empty roster and the user may reselect the class.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("could not load recipients: {0}")]
    Network(#[from] reqwest::Error),
    #[error("roster endpoint returned HTTP {status}")]
    Status { status: u16 },
    #[error("roster response was not valid JSON: {source}")]
    Decode { source: reqwest::Error },
    #[error("roster record {index} is missing required fields")]
    InvalidRecord { index: usize },
}

/// Roster read interface, injected into the workflow controller so tests and
/// alternative hosts can substitute their own implementation.
#[async_trait]
pub trait RosterApi: Send + Sync {
    /// Fetch the current recipient list for a class.
    async fn fetch_roster(&self, class: GradeLevel) -> Result<Vec<RecipientRecord>, RosterError>;
}

/// HTTP client for `GET /materials-roster?class=<label>`.
#[derive(Debug, Clone)]
pub struct HttpRosterClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRosterClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }
}

#[async_trait]
impl RosterApi for HttpRosterClient {
    async fn fetch_roster(&self, class: GradeLevel) -> Result<Vec<RecipientRecord>, RosterError> {
        let url = format!("{}/materials-roster", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("class", class.label())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(class = %class, status = status.as_u16(), "Roster fetch rejected");
            return Err(RosterError::Status {
                status: status.as_u16(),
            });
        }

        let records: Vec<RecipientRecord> = response
            .json()
            .await
            .map_err(|source| RosterError::Decode { source })?;

        // Boundary validation: never hand unkeyed records to the workflow.
        for (index, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() || record.name.trim().is_empty() {
                return Err(RosterError::InvalidRecord { index });
            }
        }

        info!(class = %class, count = records.len(), "Fetched class roster");
        Ok(records)
    }
}
