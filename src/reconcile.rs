use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::model::{AmountColumn, Reconciliation, StatedTotal};

/// Absolute tolerance for comparing the calculated and stated totals.
pub const TOTAL_TOLERANCE: f64 = 0.01;

/// First occurrence of "Total Amount" followed by a run of digits, commas,
/// and periods. Only the first match in document order is consulted; later
/// totals in the prose are ignored.
static STATED_TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Total Amount.*?([\d,\.]+)").expect("stated total pattern compiles"));

/// Compare the flat sum of every amount column against the total the
/// document's prose states.
///
/// The calculated total is a double-sum across all qualifying columns and
/// all rows; missing cells contribute nothing. The stated total comes from a
/// single pattern match over the transcript, and its absence or
/// unparseability is an outcome, not an error.
#[must_use]
pub fn reconcile(amount_columns: &[AmountColumn], transcript: &str) -> Reconciliation {
    let calculated_total: f64 = amount_columns
        .iter()
        .flat_map(|column| column.values.iter().flatten())
        .sum();

    let stated = match STATED_TOTAL.captures(transcript) {
        None => StatedTotal::Missing,
        Some(captures) => {
            let raw = captures[1].to_string();
            match raw.replace(',', "").parse::<f64>() {
                Ok(value) => StatedTotal::Found {
                    value,
                    matched: (calculated_total - value).abs() < TOTAL_TOLERANCE,
                },
                Err(_) => StatedTotal::Unparseable { raw },
            }
        }
    };

    info!(calculated_total, stated = ?stated, "reconciliation completed");

    Reconciliation {
        calculated_total,
        stated,
    }
}

#[cfg(test)]
mod tests {
    use super::reconcile;
    use crate::model::{AmountColumn, StatedTotal};

    fn column(name: &str, values: Vec<Option<f64>>) -> AmountColumn {
        AmountColumn {
            name: name.to_string(),
            index: 0,
            values,
        }
    }

    #[test]
    fn sums_across_columns_and_skips_missing_cells() {
        let columns = vec![
            column("amount", vec![Some(1000.0), Some(50.0), None]),
            column("subtotal", vec![Some(0.5)]),
        ];

        let result = reconcile(&columns, "");
        assert!((result.calculated_total - 1050.5).abs() < f64::EPSILON);
    }

    #[test]
    fn matches_stated_total_within_tolerance() {
        let columns = vec![column("amount", vec![Some(1000.0), Some(50.0)])];
        let result = reconcile(&columns, "Summary.\nTotal Amount: 1,050.00\n");

        assert_eq!(
            result.stated,
            StatedTotal::Found {
                value: 1050.0,
                matched: true
            }
        );
    }

    #[test]
    fn reports_mismatch_when_totals_diverge() {
        let columns = vec![column("amount", vec![Some(1000.0), Some(50.0)])];
        let result = reconcile(&columns, "Total Amount: 1,200.00");

        match result.stated {
            StatedTotal::Found { value, matched } => {
                assert!((value - 1200.0).abs() < f64::EPSILON);
                assert!(!matched);
            }
            other => panic!("expected a found stated total, got {other:?}"),
        }
    }

    #[test]
    fn first_match_wins_over_later_totals() {
        let columns = vec![column("amount", vec![Some(100.0)])];
        let transcript = "Total Amount: 100.00\nGrand Total Amount: 999.00";
        let result = reconcile(&columns, transcript);

        assert_eq!(
            result.stated,
            StatedTotal::Found {
                value: 100.0,
                matched: true
            }
        );
    }

    #[test]
    fn case_insensitive_pattern_with_intervening_text() {
        let columns = vec![column("amount", vec![Some(7.0)])];
        let result = reconcile(&columns, "the TOTAL AMOUNT due is 7");

        assert_eq!(
            result.stated,
            StatedTotal::Found {
                value: 7.0,
                matched: true
            }
        );
    }

    #[test]
    fn missing_pattern_is_an_outcome_not_an_error() {
        let columns = vec![column("amount", vec![Some(5.0)])];
        let result = reconcile(&columns, "No totals are mentioned here.");

        assert_eq!(result.stated, StatedTotal::Missing);
        assert!((result.calculated_total - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_capture_is_reported_as_unparseable() {
        let columns = vec![column("amount", vec![Some(5.0)])];
        let result = reconcile(&columns, "Total Amount: ...");

        assert_eq!(
            result.stated,
            StatedTotal::Unparseable {
                raw: "...".to_string()
            }
        );
    }
}
