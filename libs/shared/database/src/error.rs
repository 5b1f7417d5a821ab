use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The row violated a uniqueness or exclusion constraint.
    #[error("Constraint conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DatabaseError {
    /// Errors worth retrying later: timeouts, refused connections and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            DatabaseError::Transport(_) => true,
            DatabaseError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
