//! Error types for export archive operations.

use thiserror::Error;

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors from building or opening `.haven` archives.
///
/// Integrity problems found after an archive is open are not errors;
/// [`crate::ExportReader::verify`] reports them as issue strings.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Archive has no `manifest.json` entry.
    #[error("archive does not contain manifest.json")]
    MissingManifest,

    /// `manifest.json` exists but is not valid manifest JSON.
    #[error("malformed manifest.json: {source}")]
    MalformedManifest {
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Raw channel bytes given to the builder are not a valid channel
    /// export payload.
    #[error("malformed channel export: {source}")]
    MalformedChannel {
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// ZIP container could not be read or written.
    #[error("archive container error: {source}")]
    Container {
        /// Underlying ZIP error
        #[from]
        source: zip::result::ZipError,
    },

    /// I/O failure inside the container.
    #[error("archive i/o error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}
