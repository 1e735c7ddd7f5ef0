//! User store error types.

use crate::domain::UserId;

/// Errors from the user store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the store file failed
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file is not a valid document
    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation needs an account the user does not have
    #[error("unknown user {0}")]
    UnknownUser(UserId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(StoreError::UnknownUser(42).to_string(), "unknown user 42");
    }
}
