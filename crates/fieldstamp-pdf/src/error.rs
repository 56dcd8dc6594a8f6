//! Error types for PDF stamping

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF error: {0}")]
    Lopdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("page {0} not found")]
    PageNotFound(u32),

    #[error("malformed page structure: {0}")]
    MalformedPage(&'static str),
}
