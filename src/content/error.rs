//! Errors raised by document ingestion and extraction.

use thiserror::Error;

/// Fatal extraction errors. Each one is the only result of the call.
///
/// A page the container cannot resolve is not an error: it is rendered as an
/// inline marker and the remaining pages still extract.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("PDF too large: {declared} bytes (max {limit} bytes)")]
    OversizeDeclared { declared: u64, limit: u64 },

    #[error("PDF too large: exceeds {limit} bytes")]
    OversizeActual { limit: u64 },

    #[error("failed to read PDF: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse PDF: {0}")]
    ContainerParse(String),

    #[error("PDF support not available: {0}")]
    Unsupported(String),

    #[error("extraction cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ExtractError>;
