pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ConfigError, SecurityConfig};

/// Claims carried by an account access token.
///
/// Two tokens authenticate the same principal only when their decoded claims
/// are equal, so `PartialEq` is part of the contract here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account email at the time the token was minted
    pub sub: String,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    pub jti: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("JWT validation error: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// HS256 keys plus the validation rules derived from configuration.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_hours: Option<u64>,
}

impl TokenSigner {
    pub fn new(secret: &[u8], expiry_hours: Option<u64>) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        if expiry_hours.is_none() {
            validation.validate_exp = false;
            validation.required_spec_claims.clear();
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expiry_hours,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, ConfigError> {
        if security.jwt_secret.expose().len() < 32 {
            tracing::warn!("JWT secret is shorter than 32 bytes; use a longer random secret");
        }
        Self::new(security.jwt_secret.expose().as_bytes(), security.jwt_expiry_hours)
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))
    }

    /// Mint a new access token for `email` with a fresh `jti`.
    pub fn issue(&self, email: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = match self.expiry_hours {
            Some(hours) => Some(
                i64::try_from(hours)
                    .ok()
                    .and_then(Duration::try_hours)
                    .and_then(|ttl| now.checked_add_signed(ttl))
                    .ok_or_else(|| {
                        JwtError::TokenGeneration(format!("expiry of {} hours is out of range", hours))
                    })?
                    .timestamp(),
            ),
            None => None,
        };
        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp,
            jti: Uuid::new_v4(),
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Check signature (and expiry when enforced) and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
