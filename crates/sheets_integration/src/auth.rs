//! OAuth2 access tokens from a Google service-account key (JWT bearer grant).

use std::{
    fs,
    path::Path,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::SheetsError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECONDS: i64 = 3600;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service-account JSON key file this crate needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SheetsError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SheetsError::CredentialsIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SheetsError> {
        let key: Self = serde_json::from_str(raw)
            .map_err(|e| SheetsError::InvalidCredentials(e.to_string()))?;
        if key.client_email.trim().is_empty() {
            return Err(SheetsError::InvalidCredentials(
                "client_email is empty".into(),
            ));
        }
        Ok(key)
    }
}

#[derive(Debug, Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Signs the RS256 assertion exchanged at the key's `token_uri`.
pub fn sign_grant_assertion(
    key: &ServiceAccountKey,
    scopes: &[String],
    now: DateTime<Utc>,
) -> Result<String, SheetsError> {
    let claims = GrantClaims {
        iss: &key.client_email,
        scope: scopes.join(" "),
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_TTL_SECONDS,
    };
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&Header::new(Algorithm::RS256), &claims, &signing_key)?)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct ServiceAccountAuth {
    http: Client,
    key: ServiceAccountKey,
    scopes: Vec<String>,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(http: Client, key: ServiceAccountKey, scopes: Vec<String>) -> Self {
        Self {
            http,
            key,
            scopes,
            cached: Mutex::new(None),
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Returns a cached token until shortly before it expires.
    pub async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let assertion = sign_grant_assertion(&self.key, &self.scopes, Utc::now())?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|source| SheetsError::Transport {
                endpoint: "oauth token",
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| SheetsError::Transport {
                endpoint: "oauth token",
                source,
            })?;
        if !status.is_success() {
            return Err(SheetsError::UpstreamStatus {
                endpoint: "oauth token",
                status,
                body,
            });
        }
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|source| SheetsError::Decode {
                endpoint: "oauth token",
                source,
            })?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(0)).min(MAX_TOKEN_LIFETIME);
        debug!(
            client_email = %self.key.client_email,
            expires_in_secs = lifetime.as_secs(),
            "minted service account access token"
        );
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        });
        Ok(token.access_token)
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
