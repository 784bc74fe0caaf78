//! Unified error handling for db-cleanup-core
//!
//! Every failure in a cleanup run ends up as a [`CleanupError`]. There is no
//! local recovery anywhere in the flow, so the helpers here exist for the
//! binary to pick exit hints, not to decide on retries.
//!
//! # Example
//!
//! ```rust
//! use db_cleanup_core::CleanupError;
//!
//! let err = CleanupError::Network {
//!     status: 503,
//!     reason: "Service Unavailable".to_string(),
//! };
//! assert!(err.is_server_error());
//! assert_eq!(
//!     err.to_string(),
//!     "Failed to fetch databases: 503 Service Unavailable"
//! );
//! ```

use std::time::Duration;
use thiserror::Error;

/// Core error type for a cleanup run
#[derive(Error, Debug)]
pub enum CleanupError {
    /// Missing required input or unusable CI context. Raised before any I/O.
    #[error("{0}")]
    Configuration(String),

    /// The provider config file could not be loaded
    #[error("Failed to load config from {path}: {message}")]
    ConfigFile { path: String, message: String },

    /// The list query returned a non-success status
    #[error("Failed to fetch databases: {status} {reason}")]
    Network { status: u16, reason: String },

    /// The list query never produced a response
    #[error("Failed to fetch databases: {0}")]
    NetworkTransport(#[source] reqwest::Error),

    /// The list query returned a body we could not read
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    /// The delete call failed, either by status or by an error body
    #[error("Failed to delete database: {status} {reason} - {detail}")]
    Deletion {
        status: u16,
        reason: String,
        detail: String,
    },

    /// The delete call never produced a response
    #[error("Failed to delete database: {0}")]
    DeletionTransport(#[source] reqwest::Error),

    /// A provider call exceeded the configured deadline
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CleanupError>;

impl CleanupError {
    /// Returns true if the run failed before touching the network
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CleanupError::Configuration(_) | CleanupError::ConfigFile { .. }
        )
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Returns true if a provider call hit the deadline
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CleanupError::Timeout { .. } => true,
            CleanupError::NetworkTransport(e) | CleanupError::DeletionTransport(e) => {
                e.is_timeout()
            }
            _ => false,
        }
    }

    /// Returns true if the failure happened while deleting
    #[must_use]
    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            CleanupError::Deletion { .. } | CleanupError::DeletionTransport(_)
        )
    }

    /// HTTP status carried by the error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CleanupError::Network { status, .. } | CleanupError::Deletion { status, .. } => {
                Some(*status)
            }
            CleanupError::NetworkTransport(e) | CleanupError::DeletionTransport(e) => {
                e.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }
}
