use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::AuditError;
use crate::model::{AmountColumn, CombinedTable};

/// A column qualifies for summation when its normalized name contains one of
/// these substrings. No word-boundary requirement: "subtotal" qualifies.
const AMOUNT_MARKERS: [&str; 3] = ["amount", "price", "total"];

static CURRENCY_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\$,]").expect("currency pattern compiles"));

/// Select amount-like columns and coerce their cells to numbers.
///
/// Qualifying cells are rewritten in place with `$` and `,` stripped, so the
/// displayed table shows the cleaned values; running the normalization again
/// over an already-cleaned table is a no-op. A cell that does not parse as a
/// number becomes a missing marker in the returned column, never zero and
/// never an error. Fails with [`AuditError::NoAmountColumns`] when nothing
/// qualifies.
pub fn normalize_amounts(table: &mut CombinedTable) -> Result<Vec<AmountColumn>, AuditError> {
    let qualifying: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, name)| AMOUNT_MARKERS.iter().any(|marker| name.contains(marker)))
        .map(|(index, _)| index)
        .collect();

    if qualifying.is_empty() {
        return Err(AuditError::NoAmountColumns);
    }

    let mut columns = Vec::with_capacity(qualifying.len());
    for &index in &qualifying {
        let mut values = Vec::with_capacity(table.rows.len());
        for row in &mut table.rows {
            let stripped = CURRENCY_CHARS.replace_all(&row[index], "").into_owned();
            values.push(coerce_numeric(&stripped));
            row[index] = stripped;
        }

        columns.push(AmountColumn {
            name: table.headers[index].clone(),
            index,
            values,
        });
    }

    debug!(
        columns = columns.len(),
        "amount columns selected for reconciliation"
    );

    Ok(columns)
}

fn coerce_numeric(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}
