//! Session token issuing and verification (HS256 JWT).

use chrono::Utc;
use devlink_common::{AppError, AppResult, IdGenerator, config::AuthConfig};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
    id_gen: IdGenerator,
}

impl TokenService {
    /// Create a token service from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: config.token_ttl_secs,
            id_gen: IdGenerator::new(),
        }
    }

    /// Issue a token for `user_id`.
    pub fn issue(&self, user_id: &str) -> AppResult<String> {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl_secs)
            .map_err(|_| AppError::Config("auth.token_ttl_secs is too large".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp: iat + ttl,
            jti: self.id_gen.generate_token(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                AppError::Unauthorized("Invalid token".to_string())
            })
    }
}
