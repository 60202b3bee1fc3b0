//! Error types for lookout operations.
//!
//! This module defines [`LookoutError`], the error enum shared by every lookout
//! crate. Per-file scan failures are not represented here: the
//! engine skips those files and keeps going. Errors in this enum are the ones a
//! caller has to look at.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`LookoutError`].
pub type Result<T> = std::result::Result<T, LookoutError>;

/// Error type for all lookout operations.
#[derive(Debug, Error)]
pub enum LookoutError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Missing required configuration field
    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Workspace traversal failed at the root
    #[error("Failed to scan workspace {path}: {message}")]
    WorkspaceScan { path: PathBuf, message: String },

    // =========================================================================
    // Parsing Errors
    // =========================================================================
    /// JSON parsing error
    #[error("JSON parse error in {context}: {message}")]
    JsonParse {
        context: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // =========================================================================
    // Server Errors
    // =========================================================================
    /// Query API could not bind its listening socket
    #[error("Failed to bind query API on {addr}: {source}")]
    ServerBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Query API stopped with an error
    #[error("Query API error: {message}")]
    Server { message: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in lookout)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LookoutError {
    // =========================================================================
    // Constructor helpers for common error patterns
    // =========================================================================

    /// Create a ConfigInvalid error
    pub fn config_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a ConfigValidation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a JSON parse error
    pub fn json_parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            context: context.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigInvalid { .. } => {
                Some("Check YAML syntax in ~/.lookout/config.yaml or pass --config")
            }
            Self::ConfigValidation { .. } => {
                Some("Every agent needs a unique id and at least one workspace pattern")
            }
            Self::ServerBind { .. } => Some("Another process may own the port; try --port"),
            Self::DirectoryCreation { .. } => Some("Check permissions or pass --log-dir"),
            _ => None,
        }
    }
}
