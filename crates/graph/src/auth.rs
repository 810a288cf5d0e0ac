//! Bearer token acquisition.
//!
//! Implements the OAuth2 client-credentials grant against the Microsoft
//! identity platform and caches the access token until shortly before it
//! expires.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use domain::FetchError;
use reqwest::Client;
use serde::Deserialize;

/// Tokens are refreshed this long before they expire.
const EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Settings for the client-credentials grant.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// e.g. `https://login.microsoftonline.com`
    pub authority_host: String,
    /// e.g. `https://graph.microsoft.com/.default`
    pub scope: String,
    pub timeout: Duration,
}

impl AuthConfig {
    pub fn token_endpoint(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id.trim()
        )
    }
}

/// Error type for token acquisition.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Token endpoint returned HTTP {status}: {body}")]
    TokenError { status: u16, body: String },

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

impl From<AuthError> for FetchError {
    fn from(err: AuthError) -> Self {
        FetchError::Authentication(err.to_string())
    }
}

/// Supplies the bearer credential for Graph requests.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// A fixed, externally obtained token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

/// Cached OAuth2 access token.
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at > now + EXPIRY_BUFFER
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[allow(dead_code)]
    token_type: String,
}

/// Client-credentials authenticator with token caching.
pub struct ClientCredentialsAuthenticator {
    client: Client,
    config: AuthConfig,
    token_cache: RwLock<Option<CachedToken>>,
}

impl ClientCredentialsAuthenticator {
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            config,
            token_cache: RwLock::new(None),
        })
    }

    fn cached_token(&self) -> Option<String> {
        let cache = self.token_cache.read().ok()?;
        cache
            .as_ref()
            .filter(|token| token.is_fresh(Instant::now()))
            .map(|token| token.access_token.clone())
    }

    /// Request a new token. Returns (access_token, expires_at).
    async fn fetch_access_token(&self) -> Result<(String, Instant), AuthError> {
        tracing::debug!(
            tenant_id = %self.config.tenant_id,
            client_id = %self.config.client_id,
            "Requesting access token"
        );

        let response = self
            .client
            .post(self.config.token_endpoint())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", self.config.scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let token = parse_token_response(&body)?;
        let expires_at = Instant::now() + Duration::from_secs(token.expires_in);
        Ok((token.access_token, expires_at))
    }
}

fn parse_token_response(body: &str) -> Result<TokenResponse, AuthError> {
    serde_json::from_str(body).map_err(|e| AuthError::InvalidResponse(e.to_string()))
}

#[async_trait::async_trait]
impl TokenProvider for ClientCredentialsAuthenticator {
    async fn access_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let (access_token, expires_at) = self.fetch_access_token().await?;

        if let Ok(mut cache) = self.token_cache.write() {
            *cache = Some(CachedToken {
                access_token: access_token.clone(),
                expires_at,
            });
        }

        tracing::info!(tenant_id = %self.config.tenant_id, "Access token acquired");
        Ok(access_token)
    }
}
