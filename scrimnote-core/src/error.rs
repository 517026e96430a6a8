//! Error type for scrimnote-core operations.

use thiserror::Error;

/// Result type alias for scrimnote-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the engine can report to its host.
///
/// All variants are local and non-fatal: the host shows a notice and keeps
/// running with its previous state.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not complete (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-2xx status or `success: false`.
    #[error("{operation} failed: {message}")]
    Rejected {
        /// Short name of the API call, e.g. `"create comment"`.
        operation: &'static str,
        /// Server-provided message, or the HTTP status when none was sent.
        message: String,
    },
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The configured API base URL could not be parsed or joined.
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    /// A comment was submitted with blank content.
    #[error("comment content is empty")]
    EmptyContent,
    /// No comment with this id in the current list.
    #[error("comment {0} not found")]
    NotFound(u64),
    /// The caller's identity may not perform this action on the comment.
    #[error("not permitted to {0} this comment")]
    Forbidden(&'static str),
    /// The video widget has not signalled ready yet.
    #[error("video player is not ready")]
    WidgetNotReady,
    /// I/O failure talking to the player.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for failures of a network round trip.
    ///
    /// These are the ones a user may simply retry by repeating the action.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Rejected { .. })
    }
}
