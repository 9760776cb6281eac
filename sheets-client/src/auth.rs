use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use keywordpulse_core::{CoreError, SheetsError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_MINUTES: i64 = 60;

/// The subset of a Google service account key file used for token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Decodes a base64 encoded key file. Raw JSON is accepted as well.
    pub fn from_encoded(encoded: &str) -> Result<Self, SheetsError> {
        let trimmed = encoded.trim();
        if trimmed.starts_with('{') {
            return Self::from_json(trimmed);
        }

        let bytes = BASE64
            .decode(trimmed)
            .map_err(|e| SheetsError::InvalidCredentials {
                reason: format!("service account is not valid base64: {}", e),
            })?;
        let json = String::from_utf8(bytes).map_err(|_| SheetsError::InvalidCredentials {
            reason: "service account is not valid UTF-8".to_string(),
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, SheetsError> {
        serde_json::from_str(json).map_err(|e| SheetsError::InvalidCredentials {
            reason: format!("service account JSON is malformed: {}", e),
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Signs the RS256 assertion used in the JWT bearer grant.
pub fn build_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, SheetsError> {
    let claims = Claims {
        iss: &key.client_email,
        scope: [SHEETS_SCOPE, DRIVE_SCOPE].join(" "),
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: (now + Duration::minutes(ASSERTION_LIFETIME_MINUTES)).timestamp(),
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
        SheetsError::SigningFailed {
            reason: format!("private key is not a valid RSA PEM: {}", e),
        }
    })?;

    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key).map_err(|e| {
        SheetsError::SigningFailed {
            reason: e.to_string(),
        }
    })
}

/// Exchanges a signed assertion for a bearer access token.
pub async fn fetch_access_token(http: &Client, key: &ServiceAccountKey) -> Result<String, CoreError> {
    let assertion = build_assertion(key, Utc::now())?;

    debug!("Requesting access token for {}", key.client_email);
    let response = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        error!("Token exchange failed with status {}: {}", status, message);
        return Err(SheetsError::TokenExchangeFailed {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    let token: TokenResponse = response.json().await.map_err(|e| {
        error!("Failed to parse token response: {}", e);
        SheetsError::InvalidResponse {
            details: "token response did not contain an access token".to_string(),
        }
    })?;

    Ok(token.access_token)
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
