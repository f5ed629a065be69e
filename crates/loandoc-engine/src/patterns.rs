//! Trigger phrases and keyword detection for the ESG rule battery

/// Language defining how the loan proceeds are applied
pub const USE_OF_PROCEEDS_KEYWORDS: &[&str] = &[
    "use of proceeds",
    "proceeds of the facility",
    "shall be applied towards",
];

/// Green project / sustainability objective language
pub const SUSTAINABILITY_OBJECTIVE_KEYWORDS: &[&str] = &[
    "green project",
    "sustainability objective",
    "environmental objective",
    "renewable energy",
    "energy efficiency",
    "climate",
];

/// Sustainability-linked KPI language
pub const KPI_KEYWORDS: &[&str] = &[
    "key performance indicator",
    "kpi",
    "sustainability performance target",
    "performance target",
];

/// Ongoing reporting obligations
pub const REPORTING_KEYWORDS: &[&str] = &[
    "reporting",
    "annual report",
    "sustainability report",
    "periodic report",
];

/// External review, second party opinion or verification
pub const EXTERNAL_REVIEW_KEYWORDS: &[&str] = &[
    "second party opinion",
    "external review",
    "external verifier",
    "assurance provider",
];

/// Check whether any keyword occurs anywhere in `text`, ignoring case.
///
/// Matching is a plain substring search with no word boundaries, so "kpi"
/// also matches inside a longer token.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    contains_any_lowered(&text.to_lowercase(), keywords)
}

/// Same as [`contains_any`] for text the caller has already lowercased
pub fn contains_any_lowered(text_lower: &str, keywords: &[&str]) -> bool {
    keywords
        .iter()
        .any(|keyword| text_lower.contains(&keyword.to_lowercase()))
}
