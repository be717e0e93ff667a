//! HS256 access tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kairos_core::{KairosError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Fails when `now + expires_in` falls outside the representable range.
    pub fn new(user_id: Uuid, email: &str, expires_in: Duration) -> Result<Self> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(expires_in)
            .ok_or_else(|| KairosError::Other(format!("Token lifetime {} is out of range", expires_in)))?;
        Ok(Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| KairosError::Unauthorized("Invalid token subject".into()))
    }
}

pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in: Duration,
}

impl JwtIssuer {
    pub fn new(secret: &[u8], expires_in: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expires_in,
        }
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String> {
        let claims = Claims::new(user_id, email, self.expires_in)?;
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| KairosError::Other(format!("Failed to sign token: {}", e)))
    }

    /// Signature, algorithm and expiry are all checked.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| KairosError::Unauthorized("Could not validate credentials".into()))
    }
}
