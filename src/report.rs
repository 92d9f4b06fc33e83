use std::fmt::Write as _;

use serde::Serialize;

use crate::model::{AuditOutcome, Reconciliation, StatedTotal};

/// Machine-readable mirror of the reconciliation result plus the reviewer
/// commentary, serialized in camelCase for the JSON API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stated_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
    pub verdict: String,
    pub columns: Vec<String>,
    pub amount_columns: Vec<String>,
    pub table: crate::model::CombinedTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_comment: Option<String>,
    pub warnings: Vec<String>,
}

impl AuditResponse {
    #[must_use]
    pub fn from_outcome(outcome: &AuditOutcome, reviewer_comment: Option<String>) -> Self {
        let (calculated_total, stated_total, matched) = match &outcome.reconciliation {
            None => (None, None, None),
            Some(reconciliation) => {
                let (stated, matched) = match reconciliation.stated {
                    StatedTotal::Found { value, matched } => (Some(value), Some(matched)),
                    _ => (None, None),
                };
                (Some(reconciliation.calculated_total), stated, matched)
            }
        };

        Self {
            calculated_total,
            stated_total,
            matched,
            verdict: verdict_line(outcome.reconciliation.as_ref()),
            columns: outcome.table.headers.clone(),
            amount_columns: outcome.amount_column_names(),
            table: outcome.table.clone(),
            reviewer_comment,
            warnings: outcome
                .warnings
                .iter()
                .map(std::string::ToString::to_string)
                .collect(),
        }
    }
}

/// One-line match/mismatch/unknown verdict for the reconciliation stage.
#[must_use]
pub fn verdict_line(reconciliation: Option<&Reconciliation>) -> String {
    let Some(reconciliation) = reconciliation else {
        return "Could not find amount columns in the extracted data.".to_string();
    };

    match &reconciliation.stated {
        StatedTotal::Found { value, matched } => {
            if *matched {
                "The total amount matches the sum of individual items.".to_string()
            } else {
                format!(
                    "Discrepancy found! Calculated total is {:.2}, but the document states {:.2} (difference {:.2}).",
                    reconciliation.calculated_total,
                    value,
                    (reconciliation.calculated_total - value).abs()
                )
            }
        }
        StatedTotal::Unparseable { raw } => format!(
            "Unable to convert the extracted total amount '{raw}' to a numeric value."
        ),
        StatedTotal::Missing => {
            "Total amount provided in the document could not be identified from text.".to_string()
        }
    }
}

/// Plain-text report for the CLI surface.
#[must_use]
pub fn render_text(outcome: &AuditOutcome, reviewer_comment: Option<&str>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Extracted Financial Data");
    let _ = writeln!(out, "{}", outcome.table.headers.join(" | "));
    for row in &outcome.table.rows {
        let _ = writeln!(out, "{}", row.join(" | "));
    }

    let _ = writeln!(out, "\nColumn names: {}", outcome.table.headers.join(", "));
    if !outcome.amount_columns.is_empty() {
        let _ = writeln!(
            out,
            "Amount columns: {}",
            outcome.amount_column_names().join(", ")
        );
    }

    if let Some(reconciliation) = &outcome.reconciliation {
        let _ = writeln!(
            out,
            "\nCalculated Total Amount: {:.2}",
            reconciliation.calculated_total
        );
    }
    let _ = writeln!(out, "{}", verdict_line(outcome.reconciliation.as_ref()));

    if !outcome.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for warning in &outcome.warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }

    if let Some(comment) = reviewer_comment {
        let _ = writeln!(out, "\nReviewer Analysis\n{comment}");
    }

    out
}

/// HTML report for the upload-form surface.
///
/// Sections appear in the order the original flow displays them: combined
/// table, column names, calculated total, verdict, reviewer commentary.
#[must_use]
pub fn render_html(outcome: &AuditOutcome, reviewer_comment: Option<&str>) -> String {
    let mut body = String::new();

    let _ = writeln!(body, "<h2>Extracted Financial Data</h2>");
    let _ = writeln!(body, "<table border=\"1\"><thead><tr>");
    for header in &outcome.table.headers {
        let _ = writeln!(body, "<th>{}</th>", escape_html(header));
    }
    let _ = writeln!(body, "</tr></thead><tbody>");
    for row in &outcome.table.rows {
        let _ = writeln!(body, "<tr>");
        for cell in row {
            let _ = writeln!(body, "<td>{}</td>", escape_html(cell));
        }
        let _ = writeln!(body, "</tr>");
    }
    let _ = writeln!(body, "</tbody></table>");

    let _ = writeln!(
        body,
        "<p>Column names: {}</p>",
        escape_html(&outcome.table.headers.join(", "))
    );

    if let Some(reconciliation) = &outcome.reconciliation {
        let _ = writeln!(body, "<h2>Calculated Total Amount</h2>");
        let _ = writeln!(body, "<p>{:.2}</p>", reconciliation.calculated_total);
    }
    let _ = writeln!(
        body,
        "<p class=\"verdict\">{}</p>",
        escape_html(&verdict_line(outcome.reconciliation.as_ref()))
    );

    if !outcome.warnings.is_empty() {
        let _ = writeln!(body, "<h2>Warnings</h2><ul>");
        for warning in &outcome.warnings {
            let _ = writeln!(body, "<li>{}</li>", escape_html(&warning.to_string()));
        }
        let _ = writeln!(body, "</ul>");
    }

    if let Some(comment) = reviewer_comment {
        let _ = writeln!(body, "<h2>Reviewer Analysis</h2>");
        let _ = writeln!(body, "<pre>{}</pre>", escape_html(comment));
    }

    format!(
        "<!doctype html><html><head><title>Budget Audit</title></head><body>\
         <h1>Budget Audit Report</h1>{body}<p><a href=\"/\">Audit another document</a></p>\
         </body></html>"
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
