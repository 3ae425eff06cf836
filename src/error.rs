//! Error types for the Whisker client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Setup and precondition-checked operations return [`Result<T>`] which
//! uses [`Error`]:
//!
//! ```ignore
//! use whisker_client::{Manager, Result, WhiskerConfig};
//!
//! fn example() -> Result<()> {
//!     let config = WhiskerConfig::from_file("whisker.json")?;
//!     let manager = Manager::new(config)?;
//!     manager.connect()?;
//!     Ok(())
//! }
//! ```
//!
//! Protocol commands never return errors: they return sentinel values
//! (`false`, `""`, `None`) and socket failures are reported through
//! [`Notification::SocketError`](crate::Notification::SocketError).
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Arguments | [`Error::InvalidArgument`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Socket connection or link handshake failed.
    ///
    /// Carries the worker's socket error text.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Timed out waiting for the server connection to complete.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The connection worker has stopped.
    ///
    /// Returned when the manager has been shut down.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Argument Errors
    // ========================================================================
    /// Invalid argument to a client operation.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionTimeout { .. } | Self::ConnectionClosed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
