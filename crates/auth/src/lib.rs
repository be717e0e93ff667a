//! Credentials for Kairos users: argon2id password hashes, HS256 bearer
//! tokens and the register / login / authenticate flows built on them.

pub mod credentials;
pub mod hasher;
pub mod jwt;
pub mod service;

pub use credentials::{Argon2JwtCredentials, CredentialService};
pub use jwt::Claims;
pub use service::{AccessToken, AuthService};
