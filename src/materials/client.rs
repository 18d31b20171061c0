use async_trait::async_trait;
use reqwest::multipart;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{CredentialError, TokenProvider};

use super::types::{SubmissionReceipt, SubmissionRequest};

/// Errors from the one-shot upload call. None of these are retried
/// automatically; the workflow stays at Review so the user can retry.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("upload failed, please try again: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upload rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("could not encode recipient list: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Materials write interface, injected into the workflow controller.
#[async_trait]
pub trait MaterialsApi: Send + Sync {
    /// Issue exactly one multipart upload call for the given snapshot.
    async fn submit(&self, request: &SubmissionRequest)
        -> Result<SubmissionReceipt, SubmissionError>;
}

/// HTTP client for `POST /materials-upload`.
///
/// A fresh bearer token is obtained from the injected provider immediately
/// before every call, so an expired token from a previous submission is never
/// reused.
pub struct HttpMaterialsClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpMaterialsClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            tokens,
        }
    }
}

impl std::fmt::Debug for HttpMaterialsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMaterialsClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MaterialsApi for HttpMaterialsClient {
    async fn submit(
        &self,
        request: &SubmissionRequest,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let token = self.tokens.bearer_token().await?;
        let idempotency_key = Uuid::new_v4().to_string();

        let material = multipart::Part::bytes(request.attachment.bytes.clone())
            .file_name(request.attachment.file_name.clone());
        let mut form = multipart::Form::new()
            .part("material", material)
            .text("subject", request.subject.clone())
            .text(
                "targetStudents",
                serde_json::to_string(&request.recipient_ids)?,
            );
        if !request.comment.is_empty() {
            form = form.text("comment", request.comment.clone());
        }

        let url = format!("{}/materials-upload", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .header("Idempotency-Key", &idempotency_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                file = %request.attachment.file_name,
                "Material upload rejected"
            );
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            subject = %request.subject,
            recipients = request.recipient_ids.len(),
            file = %request.attachment.file_name,
            idempotency_key = %idempotency_key,
            "Material uploaded"
        );
        Ok(SubmissionReceipt {
            idempotency_key,
            status: status.as_u16(),
        })
    }
}
