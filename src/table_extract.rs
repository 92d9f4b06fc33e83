use tracing::{debug, warn};

use crate::error::AuditError;
use crate::header::dedupe_column_names;
use crate::model::{ExtractedDocument, PageText, RawTable};
use crate::pdf_text::{build_transcript, read_pages};
use crate::warning::{AuditWarning, WarningCode};

/// Minimum cells a line must split into to count as a table row.
const MIN_CELLS: usize = 2;

/// Extract tables and the plain-text transcript from raw PDF bytes.
///
/// Fails with [`AuditError::PdfParse`] when the bytes are not a parseable
/// PDF and with [`AuditError::NoTablesFound`] when every page was processed
/// without a single acceptable table. Skipped tables are warnings, not
/// errors; extraction always continues to the end of the document.
pub fn extract_document(bytes: &[u8]) -> Result<ExtractedDocument, AuditError> {
    let pages = read_pages(bytes)?;
    let transcript = build_transcript(&pages);

    let mut warnings = Vec::new();
    let mut tables = Vec::new();
    for page in &pages {
        tables.extend(tables_in_page(page, &mut warnings));
    }

    if tables.is_empty() {
        return Err(AuditError::NoTablesFound);
    }

    debug!(
        tables = tables.len(),
        pages = pages.len(),
        "document extraction completed"
    );

    Ok(ExtractedDocument {
        tables,
        transcript,
        warnings,
    })
}

/// Split a line into cells on tabs or runs of two or more spaces.
///
/// Single spaces stay inside a cell so multi-word labels like
/// "Total Amount" survive intact.
pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut whitespace_run = 0_usize;

    for ch in trimmed.chars() {
        if ch == '\t' {
            if !current.trim().is_empty() {
                cells.push(current.trim().to_string());
                current.clear();
            }
            whitespace_run = 0;
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run >= 2 {
                if !current.trim().is_empty() {
                    cells.push(current.trim().to_string());
                    current.clear();
                }
                continue;
            }
            current.push(' ');
            continue;
        }

        whitespace_run = 0;
        current.push(ch);
    }

    if !current.trim().is_empty() {
        cells.push(current.trim().to_string());
    }

    cells
}

/// Detect candidate tables on one page and keep the acceptable ones.
///
/// Consecutive multi-cell lines form a candidate. A candidate is accepted
/// only when it has more than one row and a non-empty first row; anything
/// shorter is skipped with a warning. Accepted headers are routed through
/// the deduplicator, which also replaces blank labels.
fn tables_in_page(page: &PageText, warnings: &mut Vec<AuditWarning>) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current_rows: Vec<Vec<String>> = Vec::new();
    let mut candidate_no = 0_usize;

    let flush = |rows: &mut Vec<Vec<String>>,
                 tables: &mut Vec<RawTable>,
                 warnings: &mut Vec<AuditWarning>,
                 candidate_no: &mut usize| {
        if rows.is_empty() {
            return;
        }
        *candidate_no += 1;

        if rows.len() < 2 {
            rows.clear();
            warn!(
                page = page.page_number,
                table = *candidate_no,
                "skipping an empty or irregular table"
            );
            warnings.push(
                AuditWarning::new(
                    WarningCode::SkippedIrregularTable,
                    "skipping an empty or irregular table",
                )
                .with_page(page.page_number)
                .with_table_id(*candidate_no),
            );
            return;
        }

        let raw_header = rows
            .remove(0)
            .into_iter()
            .map(Some)
            .collect::<Vec<Option<String>>>();
        let original: Vec<String> = raw_header.iter().flatten().cloned().collect();
        let headers = dedupe_column_names(&raw_header);
        if headers != original {
            warn!(
                page = page.page_number,
                table = *candidate_no,
                "duplicate column names found; making column names unique"
            );
            warnings.push(
                AuditWarning::new(
                    WarningCode::DuplicateHeader,
                    "duplicate column names found; column names made unique",
                )
                .with_page(page.page_number)
                .with_table_id(*candidate_no),
            );
        }

        let width = headers.len();
        let data_rows = std::mem::take(rows)
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        tables.push(RawTable {
            page: page.page_number,
            table_id: *candidate_no,
            headers,
            rows: data_rows,
        });
    };

    for line in page.text.lines() {
        let cells = split_line_into_cells(line);
        if cells.len() >= MIN_CELLS {
            current_rows.push(cells);
        } else {
            flush(&mut current_rows, &mut tables, warnings, &mut candidate_no);
        }
    }
    flush(&mut current_rows, &mut tables, warnings, &mut candidate_no);

    tables
}
