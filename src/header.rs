/// Placeholder used for blank or missing column labels.
pub const UNNAMED_COLUMN: &str = "Unnamed";

/// Make a sequence of raw column labels unique.
///
/// Blank or missing labels become [`UNNAMED_COLUMN`], every label is trimmed,
/// and the Nth repeat of a label is suffixed as `"{label}.{N}"`. The first
/// occurrence of each label is emitted unsuffixed, so input length and the
/// relative order of first occurrences are preserved.
#[must_use]
pub fn dedupe_column_names(raw: &[Option<String>]) -> Vec<String> {
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut names = Vec::with_capacity(raw.len());

    for label in raw {
        let cleaned = label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(UNNAMED_COLUMN)
            .to_string();

        match counts.get_mut(&cleaned) {
            Some(count) => {
                *count += 1;
                names.push(format!("{cleaned}.{count}"));
            }
            None => {
                counts.insert(cleaned.clone(), 0);
                names.push(cleaned);
            }
        }
    }

    names
}

/// Normalize a header label for the combined table: trim and lower-case.
#[must_use]
pub fn normalize_header(label: &str) -> String {
    label.trim().to_lowercase()
}
