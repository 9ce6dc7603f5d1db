use thiserror::Error;

/// Errors from guard rule set construction.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("duplicate guard rule id: {0}")]
    DuplicateRuleId(String),

    #[error("guard rule {id} is invalid: {reason}")]
    InvalidRule { id: String, reason: String },

    #[error("failed to canonicalize rules for hashing: {0}")]
    Canonicalize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
