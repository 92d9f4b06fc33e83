use std::io;

use thiserror::Error;

/// Stage-level failures of the audit pipeline.
///
/// Each variant maps to one user-visible condition; nothing here is retried.
/// Non-fatal conditions (a missing or unparseable stated total, a failed
/// reviewer call) are reported through [`crate::AuditWarning`] or
/// [`crate::StatedTotal`] instead so the results computed before them stay
/// available.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("upload is not a PDF (content type '{0}')")]
    InvalidFileType(String),

    #[error("failed to parse PDF: {0}")]
    PdfParse(#[from] lopdf::Error),

    #[error("no usable tables could be extracted from the PDF")]
    NoTablesFound,

    #[error("no amount-like columns were found in the extracted data")]
    NoAmountColumns,

    #[error("reviewer call failed: {0}")]
    Reviewer(String),

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
}

impl From<reqwest::Error> for AuditError {
    fn from(error: reqwest::Error) -> Self {
        Self::Reviewer(error.to_string())
    }
}
