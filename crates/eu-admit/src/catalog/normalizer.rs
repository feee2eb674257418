use chrono::{DateTime, NaiveDate};

pub(crate) fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim, collapse whitespace, drop blanks, and de-duplicate while keeping first occurrence order.
pub(crate) fn normalize_values<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut normalized: Vec<String> = Vec::new();
    for value in values {
        let label = normalize_label(&value);
        if !label.is_empty() && !normalized.contains(&label) {
            normalized.push(label);
        }
    }
    normalized
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    normalize_values(raw.split(';').map(str::to_string))
}

/// Canonical language list: the plural list when it has entries, otherwise the legacy singular
/// value.
pub(crate) fn canonical_languages(
    languages: Option<Vec<String>>,
    legacy: Option<String>,
) -> Vec<String> {
    let languages = normalize_values(languages.unwrap_or_default());
    if !languages.is_empty() {
        return languages;
    }
    normalize_values(legacy)
}

/// Lowercased search term, or `None` when the term is blank.
pub(crate) fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}
