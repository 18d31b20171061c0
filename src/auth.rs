// Identity token provider - injected into the submission client so the
// workflow never reaches into ambient singletons for credentials.

use async_trait::async_trait;
use thiserror::Error;

/// A bearer credential could not be obtained. Hard precondition failure for
/// submission; never retried automatically.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no bearer credential available: {reason}")]
pub struct CredentialError {
    pub reason: String,
}

impl CredentialError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Supplies a short-lived bearer token on demand. Implementations must return
/// a fresh token per call; the workflow never caches tokens across
/// submissions.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String, CredentialError>;
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub const DEFAULT_VAR: &'static str = "ASSIGNFLOW_API_TOKEN";

    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn bearer_token(&self) -> Result<String, CredentialError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(CredentialError::new(format!(
                "environment variable {} is not set",
                self.var
            ))),
        }
    }
}

/// Wraps a token supplied up front (e.g. from configuration).
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, CredentialError> {
        if self.token.trim().is_empty() {
            return Err(CredentialError::new("configured token is empty"));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_token() {
        let provider = StaticTokenProvider::new("secret");
        assert_eq!(provider.bearer_token().await.unwrap(), "secret");
    }

    #[tokio::test]
    async fn static_provider_rejects_empty_token() {
        let provider = StaticTokenProvider::new("   ");
        assert!(provider.bearer_token().await.is_err());
    }

    #[tokio::test]
    async fn env_provider_reports_missing_variable() {
        let provider = EnvTokenProvider::new("ASSIGNFLOW_TEST_TOKEN_UNSET");
        let err = provider.bearer_token().await.unwrap_err();
        assert!(err.reason.contains("ASSIGNFLOW_TEST_TOKEN_UNSET"));
    }
}
