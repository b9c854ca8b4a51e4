//! # Google Service-Account Authentication
//!
//! Mints OAuth2 access tokens from service-account credentials: a signed
//! RS256 JWT assertion is exchanged at the token endpoint, and the
//! resulting token is cached until shortly before expiry.
//!
//! The pipeline only depends on the [`AccessTokenProvider`] trait, so tests
//! can supply a static token instead of real credentials.

use crate::errors::ReportError;
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::debug;

/// Supplies OAuth2 bearer tokens for the Google REST APIs.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync + Debug {
    /// Returns a token valid for at least the next request.
    async fn access_token(&self) -> Result<String, ReportError>;
}

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    /// The service account email, used as the JWT issuer.
    client_email: String,
    /// The private key in PEM format.
    private_key: String,
    /// Where to exchange the JWT for an access token.
    token_uri: String,
}

/// JWT claims for the OAuth2 assertion.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

/// Authenticator that exchanges a service-account JWT for an access token.
pub struct ServiceAccountAuth {
    credentials: ServiceAccountCredentials,
    scope: String,
    client: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("client_email", &self.credentials.client_email)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountAuth {
    /// Creates an authenticator from the JSON key file content.
    pub fn from_json(json: &str, scopes: &[&str]) -> Result<Self, ReportError> {
        let credentials: ServiceAccountCredentials =
            serde_json::from_str(json).map_err(|e| ReportError::Auth(e.to_string()))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(ReportError::ReqwestClientBuild)?;
        Ok(Self {
            credentials,
            scope: scopes.join(" "),
            client,
            cached: RwLock::new(None),
        })
    }

    /// Creates an authenticator from a JSON key file path.
    pub async fn from_file(path: &str, scopes: &[&str]) -> Result<Self, ReportError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ReportError::Auth(format!("Failed to read key file '{path}': {e}")))?;
        Self::from_json(&content, scopes)
    }

    /// Creates an authenticator from `GOOGLE_SERVICE_ACCOUNT_KEY` (a file
    /// path) or `GOOGLE_SERVICE_ACCOUNT_JSON` (the JSON content directly).
    pub async fn from_env(scopes: &[&str]) -> Result<Self, ReportError> {
        if let Ok(path) = std::env::var("GOOGLE_SERVICE_ACCOUNT_KEY") {
            return Self::from_file(&path, scopes).await;
        }
        if let Ok(json) = std::env::var("GOOGLE_SERVICE_ACCOUNT_JSON") {
            return Self::from_json(&json, scopes);
        }
        Err(ReportError::Auth(
            "Neither GOOGLE_SERVICE_ACCOUNT_KEY nor GOOGLE_SERVICE_ACCOUNT_JSON is set".to_string(),
        ))
    }

    async fn fetch_new_token(&self) -> Result<String, ReportError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ReportError::Auth(e.to_string()))?
            .as_secs();

        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| ReportError::Auth(format!("Invalid private key: {e}")))?;
        let jwt = encode(&header, &claims, &key).map_err(|e| ReportError::Auth(e.to_string()))?;

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await
            .map_err(|e| ReportError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ReportError::Auth(format!(
                "Token endpoint returned {status}: {detail}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ReportError::Auth(e.to_string()))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, ReportError> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > SystemTime::now() + Duration::from_secs(60) {
                    return Ok(token.token.clone());
                }
            }
        }

        debug!("Access token missing or near expiry, refreshing");
        let new_token = self.fetch_new_token().await?;

        {
            let mut cached = self.cached.write().await;
            *cached = Some(CachedToken {
                token: new_token.clone(),
                expires_at: SystemTime::now() + Duration::from_secs(55 * 60),
            });
        }

        Ok(new_token)
    }
}
