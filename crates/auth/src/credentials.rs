use chrono::Duration;
use uuid::Uuid;

use kairos_core::config::AuthConfig;
use kairos_core::Result;

use crate::hasher::Argon2Hasher;
use crate::jwt::{Claims, JwtIssuer};

/// Password hashing and token issuance consumed by [`crate::AuthService`].
pub trait CredentialService: Send + Sync {
    fn hash_password(&self, plain: &str) -> Result<String>;

    fn verify_password(&self, plain: &str, hash: &str) -> bool;

    fn issue_token(&self, user_id: Uuid, email: &str) -> Result<String>;

    /// Unauthorized for a bad signature, a wrong algorithm or an expired token.
    fn verify_token(&self, token: &str) -> Result<Claims>;
}

/// Argon2id hashes and HS256 tokens signed with `SECRET_KEY`.
pub struct Argon2JwtCredentials {
    hasher: Argon2Hasher,
    jwt: JwtIssuer,
}

impl Argon2JwtCredentials {
    pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            hasher: Argon2Hasher::new(),
            jwt: JwtIssuer::new(secret, token_ttl),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.secret_key.as_bytes(), Duration::minutes(config.token_ttl_minutes()))
    }
}

impl CredentialService for Argon2JwtCredentials {
    fn hash_password(&self, plain: &str) -> Result<String> {
        self.hasher.hash(plain)
    }

    fn verify_password(&self, plain: &str, hash: &str) -> bool {
        self.hasher.verify(plain, hash)
    }

    fn issue_token(&self, user_id: Uuid, email: &str) -> Result<String> {
        self.jwt.issue(user_id, email)
    }

    fn verify_token(&self, token: &str) -> Result<Claims> {
        self.jwt.verify(token)
    }
}
