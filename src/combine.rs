use std::collections::HashMap;

use tracing::warn;

use crate::header::{dedupe_column_names, normalize_header};
use crate::model::{CombinedTable, RawTable};
use crate::warning::{AuditWarning, WarningCode};

/// Merge every accepted table into one table under a normalized header.
///
/// Headers are trimmed and lower-cased before alignment, so case variants of
/// the same label land in one column across tables. Within a single table a
/// pair of headers that collide only after normalization is re-deduplicated
/// with a warning; no cell may overwrite another in its own row. Column order
/// is first-seen across the input tables; rows are padded with empty cells
/// for columns their source table did not have.
#[must_use]
pub fn combine_tables(tables: &[RawTable], warnings: &mut Vec<AuditWarning>) -> CombinedTable {
    let mut headers: Vec<String> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();
    let mut per_table: Vec<Vec<String>> = Vec::new();

    for table in tables {
        let normalized: Vec<Option<String>> = table
            .headers
            .iter()
            .map(|header| Some(normalize_header(header)))
            .collect();
        let unique = dedupe_column_names(&normalized);
        if unique.iter().ne(normalized.iter().flatten()) {
            warn!(
                page = table.page,
                table = table.table_id,
                "headers collide after normalization; making column names unique"
            );
            warnings.push(
                AuditWarning::new(
                    WarningCode::DuplicateHeader,
                    "column names collide after normalization; column names made unique",
                )
                .with_page(table.page)
                .with_table_id(table.table_id),
            );
        }

        for name in &unique {
            if !index_of.contains_key(name) {
                index_of.insert(name.clone(), headers.len());
                headers.push(name.clone());
            }
        }
        per_table.push(unique);
    }

    let mut rows = Vec::new();
    for (table, unique) in tables.iter().zip(&per_table) {
        let mapping: Vec<usize> = unique.iter().map(|name| index_of[name]).collect();

        for row in &table.rows {
            let mut aligned = vec![String::new(); headers.len()];
            for (cell, &target) in row.iter().zip(&mapping) {
                aligned[target] = cell.clone();
            }
            rows.push(aligned);
        }
    }

    CombinedTable {
        headers,
        row_count: rows.len(),
        table_count: tables.len(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::combine_tables;
    use crate::model::RawTable;
    use crate::warning::WarningCode;

    fn table(page: u32, headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            page,
            table_id: 1,
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn aligns_case_variant_headers_into_one_column() {
        let tables = vec![
            table(1, &["Item", "Amount"], &[&["Wood", "$1,000"]]),
            table(2, &["item", "amount"], &[&["Nails", "$50.00"]]),
        ];

        let mut warnings = Vec::new();
        let combined = combine_tables(&tables, &mut warnings);
        assert_eq!(combined.headers, vec!["item", "amount"]);
        assert_eq!(combined.row_count, 2);
        assert_eq!(combined.rows[1], vec!["Nails", "$50.00"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn keeps_both_columns_when_headers_collide_after_normalization() {
        let tables = vec![table(
            1,
            &["Amount", "AMOUNT"],
            &[&["100", "200"], &["300", "400"]],
        )];

        let mut warnings = Vec::new();
        let combined = combine_tables(&tables, &mut warnings);
        assert_eq!(combined.headers, vec!["amount", "amount.1"]);
        assert_eq!(combined.rows[0], vec!["100", "200"]);
        assert_eq!(combined.rows[1], vec!["300", "400"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::DuplicateHeader);
        assert_eq!(warnings[0].page, Some(1));
    }

    #[test]
    fn pads_rows_for_columns_missing_from_a_source_table() {
        let tables = vec![
            table(1, &["Item", "Amount"], &[&["Wood", "10"]]),
            table(2, &["Item", "Notes"], &[&["Nails", "rusty"]]),
        ];

        let combined = combine_tables(&tables, &mut Vec::new());
        assert_eq!(combined.headers, vec!["item", "amount", "notes"]);
        assert_eq!(combined.rows[0], vec!["Wood", "10", ""]);
        assert_eq!(combined.rows[1], vec!["Nails", "", "rusty"]);
    }

    #[test]
    fn counts_tables_and_rows() {
        let tables = vec![table(1, &["A", "B"], &[&["1", "2"], &["3", "4"]])];
        let combined = combine_tables(&tables, &mut Vec::new());
        assert_eq!(combined.table_count, 1);
        assert_eq!(combined.row_count, 2);
    }
}
