//! Credential providers for the completion endpoint
//!
//! Token acquisition and refresh live behind the `TokenProvider` trait; this
//! component only asks for a credential per request and applies it to the
//! outbound call. The static implementations cover api-key deployments and
//! externally-refreshed bearer tokens.

use async_trait::async_trait;

use crate::error::AppError;

/// A credential ready to be applied to one outbound request
#[derive(Debug, Clone)]
pub enum Credential {
    /// Sent as the `api-key` header
    ApiKey(String),
    /// Sent as `Authorization: Bearer <token>`
    Bearer(String),
}

/// Opaque source of completion-endpoint credentials
///
/// Refresh semantics are the provider's responsibility; the completion
/// client calls `credential()` once per upstream request and never caches
/// the result.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Produce a credential valid for one request
    ///
    /// # Errors
    /// Returns `AppError::Configuration` if no credential can be produced.
    async fn credential(&self) -> Result<Credential, AppError>;
}

/// Fixed api-key credential, read from configuration at startup
pub struct StaticApiKey {
    key: String,
}

impl StaticApiKey {
    /// Create a provider around a fixed api key
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticApiKey {
    async fn credential(&self) -> Result<Credential, AppError> {
        if self.key.is_empty() {
            return Err(AppError::Configuration("API key is empty".to_string()));
        }
        Ok(Credential::ApiKey(self.key.clone()))
    }
}

/// Fixed bearer token, for deployments where an external process refreshes
/// the token out of band
pub struct StaticBearerToken {
    token: String,
}

impl StaticBearerToken {
    /// Create a provider around a fixed bearer token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticBearerToken {
    async fn credential(&self) -> Result<Credential, AppError> {
        if self.token.is_empty() {
            return Err(AppError::Configuration("Bearer token is empty".to_string()));
        }
        Ok(Credential::Bearer(self.token.clone()))
    }
}

/// Build a token provider from environment variables
///
/// Prefers `AZURE_OPENAI_API_KEY`; falls back to
/// `AZURE_OPENAI_BEARER_TOKEN`.
///
/// # Errors
/// Returns `AppError::Configuration` when neither variable is set.
pub fn provider_from_env() -> Result<Box<dyn TokenProvider>, AppError> {
    if let Ok(key) = std::env::var("AZURE_OPENAI_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(Box::new(StaticApiKey::new(key)));
        }
    }
    if let Ok(token) = std::env::var("AZURE_OPENAI_BEARER_TOKEN") {
        if !token.trim().is_empty() {
            return Ok(Box::new(StaticBearerToken::new(token)));
        }
    }
    Err(AppError::Configuration(
        "AZURE_OPENAI_API_KEY or AZURE_OPENAI_BEARER_TOKEN is required".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_api_key_yields_api_key_credential() {
        let provider = StaticApiKey::new("secret");
        match provider.credential().await.unwrap() {
            Credential::ApiKey(key) => assert_eq!(key, "secret"),
            other => panic!("unexpected credential: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_api_key_is_a_configuration_error() {
        let provider = StaticApiKey::new("");
        assert!(matches!(
            provider.credential().await,
            Err(AppError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn static_bearer_yields_bearer_credential() {
        let provider = StaticBearerToken::new("tok");
        match provider.credential().await.unwrap() {
            Credential::Bearer(token) => assert_eq!(token, "tok"),
            other => panic!("unexpected credential: {:?}", other),
        }
    }
}
