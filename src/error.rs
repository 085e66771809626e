//! Custom error types for next-target-select.
//!
//! None of these errors are fatal to the overlay loops: every caller either
//! falls back to a default, logs and skips the current tick, or leaves the
//! dependent feature inert.

use std::io;
use thiserror::Error;

/// Main error type for next-target-select operations.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// A named scene object required by a feature is absent.
    #[error("scene object '{path}' not found")]
    MissingCollaborator { path: String },

    /// A key binding file does not exist yet.
    #[error("key binding file '{path}' does not exist")]
    BindingMissing { path: String },

    /// A key binding file exists but contains an unparsable symbol name.
    #[error("key binding file '{path}' is corrupt at line {line}: {reason}")]
    PersistenceCorrupt {
        path: String,
        line: usize,
        reason: String,
    },

    /// The symbol name is not a known input symbol.
    #[error("unknown input symbol '{0}'")]
    UnknownSymbol(String),

    /// The control channel name is neither keyboard nor joystick.
    #[error("unknown control channel '{0}'")]
    UnknownChannel(String),

    /// Invalid configuration, such as persisting an empty key chord.
    #[error("configuration error: {0}")]
    InvalidConfiguration(String),

    /// Error reading or parsing configuration file.
    #[error("failed to load config from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Error writing configuration file.
    #[error("failed to save config to '{path}': {reason}")]
    ConfigSave { path: String, reason: String },

    /// Error parsing duration string.
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// Platform-specific operation is not supported.
    #[error("operation not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    /// An OS pointer call reported failure.
    #[error("pointer error: {0}")]
    Pointer(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for next-target-select operations.
pub type Result<T> = std::result::Result<T, OverlayError>;

impl OverlayError {
    /// Create a new MissingCollaborator error.
    pub fn missing_collaborator(path: impl Into<String>) -> Self {
        Self::MissingCollaborator { path: path.into() }
    }

    /// Create a new BindingMissing error.
    pub fn binding_missing(path: impl Into<String>) -> Self {
        Self::BindingMissing { path: path.into() }
    }

    /// Create a new PersistenceCorrupt error.
    pub fn persistence_corrupt(
        path: impl Into<String>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::PersistenceCorrupt {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create a new InvalidConfiguration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create a new ConfigLoad error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigSave error.
    pub fn config_save(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigSave {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidDuration error.
    pub fn invalid_duration(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new UnsupportedPlatform error.
    pub fn unsupported_platform(message: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(message.into())
    }

    /// Create a new Pointer error.
    pub fn pointer(message: impl Into<String>) -> Self {
        Self::Pointer(message.into())
    }
}
