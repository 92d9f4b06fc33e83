use serde::Serialize;

use crate::warning::AuditWarning;

/// Text extracted from a single PDF page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// A table accepted from a single page, prior to merging.
///
/// Headers have already passed through the column deduplicator, so they are
/// non-empty and unique within the table. Invariant: at least one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub page: u32,
    pub table_id: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// All accepted tables merged under one normalized header.
///
/// Header names are trimmed and lower-cased, unique, and ordered by first
/// appearance across the source tables. Rows are padded with empty cells for
/// columns a source table did not have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub table_count: usize,
    pub row_count: usize,
}

/// A column selected for summation, with per-cell coercion results.
///
/// `values` is row-aligned with the combined table; a `None` marks a cell
/// that failed numeric coercion and is excluded from sums.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountColumn {
    pub name: String,
    pub index: usize,
    pub values: Vec<Option<f64>>,
}

/// The total the document's prose claims, as found in the transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum StatedTotal {
    /// A numeric stated total was found; `matched` compares it against the
    /// calculated total with an absolute tolerance of 0.01.
    Found { value: f64, matched: bool },
    /// The pattern matched but the captured run did not parse as a number.
    Unparseable { raw: String },
    /// No "Total Amount" pattern occurs in the transcript.
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub calculated_total: f64,
    pub stated: StatedTotal,
}

/// Tables and transcript produced by the extraction stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub tables: Vec<RawTable>,
    pub transcript: String,
    pub warnings: Vec<AuditWarning>,
}

/// Everything the pipeline produced for one upload.
///
/// `reconciliation` is `None` when no amount-like columns qualified; the
/// table itself is still present for display in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditOutcome {
    pub table: CombinedTable,
    pub amount_columns: Vec<AmountColumn>,
    pub reconciliation: Option<Reconciliation>,
    pub transcript: String,
    pub warnings: Vec<AuditWarning>,
}

impl AuditOutcome {
    /// Names of the columns selected for summation, in table order.
    #[must_use]
    pub fn amount_column_names(&self) -> Vec<String> {
        self.amount_columns
            .iter()
            .map(|column| column.name.clone())
            .collect()
    }
}
