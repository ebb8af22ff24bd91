// Document error module
// Typed failures of reading, parsing or re-encoding the source document

use hyper::StatusCode;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to produce the source document for one request
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{}' nests deeper than {limit} levels", .path.display())]
    TooDeep { path: PathBuf, limit: usize },

    #[error("failed to serialize '{}': {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("reading '{}' did not finish within {}ms", .path.display(), .after.as_millis())]
    Timeout { path: PathBuf, after: Duration },
}

impl DocumentError {
    /// Every kind surfaces to the client as a plain 500
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Short label for the error log
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Parse { .. } => "parse",
            Self::TooDeep { .. } => "depth",
            Self::Encode { .. } => "encode",
            Self::Timeout { .. } => "timeout",
        }
    }
}
