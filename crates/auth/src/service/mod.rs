//! Registration, login and bearer authentication over the user store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kairos_core::config::AuthConfig;
use kairos_core::{normalize_email, KairosError, Result, User};
use kairos_store::Repository;

use crate::credentials::{Argon2JwtCredentials, CredentialService};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AccessToken {
    pub access_token: String,
    /// Always "bearer".
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(token: String) -> Self {
        Self {
            access_token: token,
            token_type: "bearer".into(),
        }
    }
}

pub struct AuthService {
    repo: Arc<Repository>,
    credentials: Arc<dyn CredentialService>,
    min_password_length: usize,
    /// Verified against when the email is unknown, so both failure paths cost one argon2 run.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        repo: Arc<Repository>,
        credentials: Arc<dyn CredentialService>,
        min_password_length: usize,
    ) -> Result<Self> {
        let dummy_hash = credentials.hash_password("kairos-unknown-account")?;
        Ok(Self {
            repo,
            credentials,
            min_password_length,
            dummy_hash,
        })
    }

    pub fn from_config(repo: Arc<Repository>, config: &AuthConfig) -> Result<Self> {
        let credentials = Arc::new(Argon2JwtCredentials::from_config(config));
        Self::new(repo, credentials, config.min_password_length)
    }

    pub fn register(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email)?;
        if password.chars().count() < self.min_password_length {
            return Err(KairosError::validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        if self.repo.users.find_by_email(&email).is_some() {
            return Err(KairosError::EmailTaken);
        }
        let hash = self.credentials.hash_password(password)?;
        // insert re-checks uniqueness under the write lock
        self.repo.users.insert(&email, hash)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AccessToken> {
        let user = normalize_email(email)
            .ok()
            .and_then(|email| self.repo.users.find_by_email(&email));

        let verified = match &user {
            Some(user) => self.credentials.verify_password(password, &user.password_hash),
            None => {
                self.credentials.verify_password(password, &self.dummy_hash);
                false
            }
        };

        match user {
            Some(user) if verified => {
                let token = self.credentials.issue_token(user.id, &user.email)?;
                info!("User '{}' logged in", user.id);
                Ok(AccessToken::bearer(token))
            }
            _ => {
                debug!("Rejected login attempt");
                Err(KairosError::InvalidCredentials)
            }
        }
    }

    /// Resolve a bearer token to a user that still exists.
    pub fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.credentials.verify_token(token)?;
        let user_id = claims.user_id()?;
        self.repo
            .users
            .get(user_id)
            .ok_or_else(|| KairosError::Unauthorized("Could not validate credentials".into()))
    }
}
