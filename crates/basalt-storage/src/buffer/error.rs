//! Buffer pool errors.
//!
//! The cache operations themselves report failure through their return
//! values (`Option` for the allocation paths, `bool` for unpin, flush,
//! and delete); `BufferError` covers configuration and construction.

use thiserror::Error;

/// Result type for buffer pool operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur while setting up the buffer pool.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// What was wrong with the configuration.
        message: String,
    },
}

impl BufferError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = BufferError::config("pool_size must be > 0");
        assert!(err.to_string().contains("pool_size"));
    }
}
