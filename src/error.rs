//! Request-level error taxonomy
//!
//! Every failure a handler can hit maps onto one of these variants; the router
//! turns them into HTTP responses at the dispatch boundary so nothing escapes
//! to the connection task.

use std::path::PathBuf;

use hyper::StatusCode;

/// Failure raised while serving one request
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// Route, file or content identifier does not exist
    #[error("not found")]
    NotFound,

    /// Request crossed a security boundary (mount escape, extension not allowed)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Path parameters could not be extracted or decoded
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A read failed after the file was known to exist
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ServeError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest(reason.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status this error is surfaced as
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
