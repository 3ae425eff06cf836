//! Connection configuration.
//!
//! # Example
//!
//! ```
//! use whisker_client::WhiskerConfig;
//!
//! let config = WhiskerConfig::new()
//!     .with_host("rig-3.lab")
//!     .with_port(3233)
//!     .with_timeout_ms(2000);
//!
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Whisker main-socket port.
pub const DEFAULT_PORT: u16 = 3233;

/// Default connect and reply timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default prefix of client-generated event names.
pub const DEFAULT_SYSEVENT_PREFIX: &str = "sys_";

// ============================================================================
// WhiskerConfig
// ============================================================================

/// Where and how to reach the Whisker server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WhiskerConfig {
    /// Server host name or address.
    pub host: String,

    /// Main-socket port.
    pub port: u16,

    /// Socket connect timeout and immediate-reply timeout, in ms.
    pub timeout_ms: u64,

    /// Prefix marking events generated by this client.
    pub sysevent_prefix: String,
}

impl Default for WhiskerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            sysevent_prefix: DEFAULT_SYSEVENT_PREFIX.to_string(),
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl WhiskerConfig {
    /// Creates a configuration with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not valid, or
    /// [`Error::Config`] if the values fail validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// As [`WhiskerConfig::from_json_str`], plus [`Error::Io`] if the file
    /// cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl WhiskerConfig {
    /// Sets the server host.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the main-socket port.
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect and reply timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the client event prefix.
    #[inline]
    #[must_use]
    pub fn with_sysevent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sysevent_prefix = prefix.into();
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl WhiskerConfig {
    /// Timeout as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("host must not be empty"));
        }
        if self.port == 0 {
            return Err(Error::config("port must be non-zero"));
        }
        if self.timeout_ms == 0 {
            return Err(Error::config("timeout_ms must be non-zero"));
        }
        if self.sysevent_prefix.is_empty() || self.sysevent_prefix.contains(char::is_whitespace)
        {
            return Err(Error::config(format!(
                "sysevent_prefix must be a non-empty word, got {:?}",
                self.sysevent_prefix
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
