//! Diagnostic error types for the lectern client.
//!
//! Every failure mode of a backend call collapses into [`ApiError`]: each
//! variant carries exactly one human-readable message, so callers render the
//! error and move on without inspecting its shape.

use miette::Diagnostic;
use thiserror::Error;

/// Normalized error for all backend calls.
#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    /// The server answered with an error status. The message is the server's
    /// structured `detail` field when present, else a transport-level summary.
    #[error("{message}")]
    #[diagnostic(
        code(lectern::api::backend),
        help("The server rejected the request; the message above is its own explanation.")
    )]
    Backend { message: String },

    /// No response was received at all (refused connection, timeout, DNS).
    #[error("could not reach the research server — is it running?")]
    #[diagnostic(
        code(lectern::api::connectivity),
        help(
            "Check that the backend is up and that the server origin is right. \
             Override it with --server or the LECTERN_SERVER environment variable."
        )
    )]
    Connectivity,

    /// Anything else: a malformed response body, an unreadable upload file,
    /// a request that failed before it hit the wire.
    #[error("{message}")]
    #[diagnostic(code(lectern::api::unexpected))]
    Unexpected { message: String },
}

impl ApiError {
    /// Normalize a transport-layer failure.
    ///
    /// Connection and timeout failures become [`ApiError::Connectivity`];
    /// everything else keeps its raw message.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ApiError::Connectivity
        } else {
            ApiError::Unexpected {
                message: err.to_string(),
            }
        }
    }

    /// The single message string this error renders as.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Convenience alias for functions returning lectern results.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_only_its_message() {
        let err = ApiError::Backend {
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn connectivity_message_names_the_server() {
        let err = ApiError::Connectivity;
        assert!(err.to_string().contains("research server"));
    }

    #[test]
    fn message_accessor_matches_display() {
        let err = ApiError::Unexpected {
            message: "boom".into(),
        };
        assert_eq!(err.message(), format!("{err}"));
    }
}
