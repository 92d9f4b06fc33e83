//! Budget document intake and reconciliation.
//!
//! Accepts PDF budget/quote documents, extracts their tables and text,
//! reconciles the sum of amount-like columns against the total the prose
//! states, and forwards the transcript to an external reviewer for
//! qualitative commentary. Exposed as a library plus an HTTP server and a
//! CLI binary.

mod amount;
mod combine;
mod error;
mod header;
mod model;
mod pdf_text;
mod reconcile;
mod report;
mod reviewer;
pub mod routes;
mod table_extract;
mod warning;

pub use amount::normalize_amounts;
pub use combine::combine_tables;
pub use error::AuditError;
pub use header::{UNNAMED_COLUMN, dedupe_column_names, normalize_header};
pub use model::{
    AmountColumn, AuditOutcome, CombinedTable, ExtractedDocument, PageText, RawTable,
    Reconciliation, StatedTotal,
};
pub use reconcile::{TOTAL_TOLERANCE, reconcile};
pub use report::{AuditResponse, render_html, render_text, verdict_line};
pub use reviewer::{CohereReviewer, DEFAULT_MODEL, ReviewerConfig};
pub use table_extract::extract_document;
pub use warning::{AuditWarning, WarningCode};

/// MIME type accepted by the upload surfaces.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Reject anything that is not declared as a PDF before touching the bytes.
pub fn ensure_pdf_content_type(content_type: &str) -> Result<(), AuditError> {
    if content_type == PDF_CONTENT_TYPE {
        Ok(())
    } else {
        Err(AuditError::InvalidFileType(content_type.to_string()))
    }
}

/// Run the full extraction-and-reconciliation pipeline over one upload.
///
/// One-shot and synchronous: extraction, combination, amount normalization,
/// and reconciliation run in sequence, and each stage's output survives a
/// later stage's failure. A document without amount-like columns still
/// returns its combined table; `reconciliation` is `None` and the condition
/// is visible through the verdict. The reviewer is not called here — the
/// transcript in the returned outcome is handed to it separately by the
/// boundary that owns the client handle.
pub fn audit_pdf_bytes(bytes: &[u8]) -> Result<AuditOutcome, AuditError> {
    let document = extract_document(bytes)?;
    let mut warnings = document.warnings;
    let mut table = combine_tables(&document.tables, &mut warnings);

    let (amount_columns, reconciliation) = match normalize_amounts(&mut table) {
        Ok(columns) => {
            let reconciliation = reconcile(&columns, &document.transcript);
            match &reconciliation.stated {
                StatedTotal::Missing => warnings.push(AuditWarning::new(
                    WarningCode::StatedTotalMissing,
                    "total amount provided in the document could not be identified from text",
                )),
                StatedTotal::Unparseable { raw } => warnings.push(AuditWarning::new(
                    WarningCode::StatedTotalUnparseable,
                    format!("extracted total amount '{raw}' is not numeric"),
                )),
                StatedTotal::Found { .. } => {}
            }
            (columns, Some(reconciliation))
        }
        Err(AuditError::NoAmountColumns) => (Vec::new(), None),
        Err(other) => return Err(other),
    };

    Ok(AuditOutcome {
        table,
        amount_columns,
        reconciliation,
        transcript: document.transcript,
        warnings,
    })
}
