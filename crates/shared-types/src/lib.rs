pub mod types;

pub use types::{
    AnalysisResult, EsgCheckResult, ExtractedFields, FieldChange, FieldName, NOT_DETECTED,
};
