//! Error types for the page bridge
//!
//! Only lifecycle and configuration surface errors. Element helpers no-op
//! on missing targets instead.

use thiserror::Error;

/// Result type for page operations
pub type Result<T> = std::result::Result<T, PageError>;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Document error: {0}")]
    Dom(#[from] dom::DomError),

    #[error("Page bridge already started")]
    AlreadyStarted,

    #[error("Page bridge not started")]
    NotStarted,

    #[error("Document has no root node")]
    NoDocumentRoot,

    #[error("Ready signal closed before the document became ready")]
    ReadySignalClosed,

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
