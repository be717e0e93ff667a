use thiserror::Error;

#[derive(Error, Debug)]
pub enum KairosError {
    #[error("{0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Login failure. Deliberately identical for unknown email and wrong password.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Email already registered")]
    EmailTaken,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("{0}")]
    Other(String),
}

impl KairosError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn task_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Task",
            id: id.to_string(),
        }
    }

    pub fn user_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "User",
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for KairosError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KairosError>;
