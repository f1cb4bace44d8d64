//! Error types for node provisioning

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Errors that can abort an authority or node operation.
///
/// Nothing is retried and nothing is rolled back: the first error stops the
/// operation and whatever was already written stays on disk.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The signing tool could not be started or exited non-zero
    #[error("{tool} {action} failed: {message}")]
    ExternalTool {
        tool: String,
        action: String,
        message: String,
    },

    /// A file the signing tool should have produced is not there
    #[error("Expected artifact not found: {}", .path.display())]
    MissingArtifact { path: PathBuf },

    /// Template unreadable or not shaped like a Nebula config
    #[error("Config template {}: {message}", .path.display())]
    ConfigTemplate { path: PathBuf, message: String },

    /// Copy, move, write or permission change failed
    #[error("{op} {}: {source}", .path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operator input that cannot be used as given
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },
}

impl ProvisionError {
    pub(crate) fn fs(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn template(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigTemplate {
            path: path.into(),
            message: message.into(),
        }
    }
}
