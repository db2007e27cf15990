use thiserror::Error;

#[derive(Error, Debug)]
pub enum HortError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Already checked out: {0}")]
    AlreadyCheckedOut(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HortError {
    /// Builds a `Validation` error naming every violated request field.
    pub fn invalid_fields(fields: &[&str]) -> Self {
        HortError::Validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

pub type HortResult<T> = Result<T, HortError>;
