use std::collections::BTreeMap;
use std::fmt;

/// Placeholder stored for a field the extractor could not find
pub const NOT_DETECTED: &str = "Not detected";

/// Named key terms pulled out of a facility agreement.
///
/// Declaration order is the enumeration order used for extraction output
/// and for the change list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    FacilityAmount,
    Margin,
    MaturityDate,
    Borrower,
    Purpose,
}

impl FieldName {
    pub const ALL: [FieldName; 5] = [
        FieldName::FacilityAmount,
        FieldName::Margin,
        FieldName::MaturityDate,
        FieldName::Borrower,
        FieldName::Purpose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::FacilityAmount => "facility_amount",
            FieldName::Margin => "margin",
            FieldName::MaturityDate => "maturity_date",
            FieldName::Borrower => "borrower",
            FieldName::Purpose => "purpose",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key terms extracted from one document version.
///
/// Serializes as a flat JSON object keyed by field name, in enumeration
/// order. Values are never blank: anything that trims to nothing is stored
/// as [`NOT_DETECTED`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ExtractedFields(BTreeMap<FieldName, String>);

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by callers that assemble fields by hand
    pub fn with_field(mut self, field: FieldName, value: impl Into<String>) -> Self {
        self.0.insert(field, normalize(value.into()));
        self
    }

    /// Value for `field`; a field missing from the map reads as [`NOT_DETECTED`]
    pub fn get(&self, field: FieldName) -> &str {
        self.0.get(&field).map(String::as_str).unwrap_or(NOT_DETECTED)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_detected(&self, field: FieldName) -> bool {
        self.get(field) != NOT_DETECTED
    }

    pub fn detected_count(&self) -> usize {
        self.0.values().filter(|v| v.as_str() != NOT_DETECTED).count()
    }

    /// Field names present in this mapping, in enumeration order
    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(FieldName, String)> for ExtractedFields {
    fn from_iter<I: IntoIterator<Item = (FieldName, String)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field, normalize(value)))
                .collect(),
        )
    }
}

impl<'de> serde::Deserialize<'de> for ExtractedFields {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <BTreeMap<FieldName, String> as serde::Deserialize>::deserialize(deserializer)
            .map(|map| map.into_iter().collect())
    }
}

fn normalize(value: String) -> String {
    if value.trim().is_empty() {
        NOT_DETECTED.to_string()
    } else {
        value
    }
}

/// One field whose value differs between the baseline and the revised document
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldChange {
    pub field: FieldName,
    pub from_value: String,
    pub to_value: String,
    pub impact: String, // Static per-field explanation
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EsgCheckResult {
    pub rule_name: String,
    pub passed: bool,
    pub comment: String,
}

/// Combined output of comparing two versions of a facility agreement
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisResult {
    pub key_terms_v1: ExtractedFields,
    pub key_terms_v2: ExtractedFields,
    pub changes: Vec<FieldChange>,
    pub esg_checks: Vec<EsgCheckResult>, // Evaluated against v2 only
}

impl AnalysisResult {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn passed_check_count(&self) -> usize {
        self.esg_checks.iter().filter(|c| c.passed).count()
    }
}
