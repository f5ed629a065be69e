// Key-term extraction for facility agreements
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{ExtractedFields, FieldName, NOT_DETECTED};

lazy_static! {
    /// One case-insensitive search pattern per field, in enumeration order.
    /// Group 1 holds the value.
    static ref FIELD_PATTERNS: Vec<(FieldName, Regex)> = vec![
        (
            // Facility Amount: EUR 150,000,000
            FieldName::FacilityAmount,
            Regex::new(r"(?i)Facility Amount:\s*([A-Z]{3}\s[0-9,.]+)").unwrap(),
        ),
        (
            // Interest Margin: 2.50% per annum
            FieldName::Margin,
            Regex::new(r"(?i)Interest Margin:\s*([0-9.]+\s*%\s*per annum)").unwrap(),
        ),
        (
            // Maturity Date: 31 March 2028
            FieldName::MaturityDate,
            Regex::new(r"(?i)Maturity Date:\s*([0-9]{1,2}\s+\w+\s+[0-9]{4})").unwrap(),
        ),
        (
            FieldName::Borrower,
            Regex::new(r"(?i)Borrower:\s*(.+)").unwrap(),
        ),
        (
            FieldName::Purpose,
            Regex::new(r"(?i)Purpose:\s*(.+)").unwrap(),
        ),
    ];
}

/// Returns the trimmed first capture group of the leftmost match, if any
pub fn find_first(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Extracts every known field from `text`.
///
/// A field whose label is missing, or whose value does not have the expected
/// shape, is recorded as [`NOT_DETECTED`].
pub fn extract_key_terms(text: &str) -> ExtractedFields {
    FIELD_PATTERNS
        .iter()
        .map(|(field, pattern)| {
            let value = find_first(pattern, text).unwrap_or_else(|| NOT_DETECTED.to_string());
            (*field, value)
        })
        .collect()
}
