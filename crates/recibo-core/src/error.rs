//! Error types for the recibo-core library.

use thiserror::Error;

/// Main error type for the recibo library.
#[derive(Error, Debug)]
pub enum ReciboError {
    /// Receipt extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors related to receipt field extraction.
///
/// Field misses and parse problems are NOT errors: a rule whose matchers
/// all fail leaves the field absent, and an unparseable value falls back to
/// its default plus a warning on the receipt. Only the conditions below
/// terminate a document's extraction, and the pipeline converts every one
/// of them into an error receipt rather than letting it escape a batch.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// OCR produced empty or whitespace-only text.
    #[error("no text recovered from source")]
    EmptyInput,

    /// A rule pattern in an injected rule set failed to compile.
    #[error("invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// Unexpected internal fault during a single document's processing.
    #[error("pipeline fault: {0}")]
    PipelineFault(String),
}

/// Result type for the recibo library.
pub type Result<T> = std::result::Result<T, ReciboError>;
