//! Loan document analysis engine
//!
//! Extracts key terms from two versions of a facility agreement, diffs them,
//! and runs the ESG keyword battery against the revised version. Everything
//! here works on already-decoded text and is pure: the same inputs always
//! give the same [`AnalysisResult`].

pub mod compare;
pub mod extractors;
pub mod patterns;
pub mod rules;

use shared_types::{AnalysisResult, EsgCheckResult, ExtractedFields, FieldChange};
use tracing::debug;

/// LoanAnalysisEngine entry point
pub struct LoanAnalysisEngine;

impl LoanAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_key_terms(&self, text: &str) -> ExtractedFields {
        extractors::extract_key_terms(text)
    }

    pub fn compare_terms(
        &self,
        baseline: &ExtractedFields,
        revised: &ExtractedFields,
    ) -> Vec<FieldChange> {
        compare::compare_terms(baseline, revised)
    }

    pub fn run_esg_checks(&self, text: &str) -> Vec<EsgCheckResult> {
        rules::run_esg_checks(text)
    }

    /// Compare a baseline document (`text_v1`) against its revision (`text_v2`).
    ///
    /// ESG checks run on the revised text only.
    pub fn analyze(&self, text_v1: &str, text_v2: &str) -> AnalysisResult {
        let key_terms_v1 = self.extract_key_terms(text_v1);
        let key_terms_v2 = self.extract_key_terms(text_v2);
        let changes = self.compare_terms(&key_terms_v1, &key_terms_v2);
        let esg_checks = self.run_esg_checks(text_v2);

        let result = AnalysisResult {
            key_terms_v1,
            key_terms_v2,
            changes,
            esg_checks,
        };

        debug!(
            v1_detected = result.key_terms_v1.detected_count(),
            v2_detected = result.key_terms_v2.detected_count(),
            changes = result.changes.len(),
            checks_passed = result.passed_check_count(),
            "Analysis complete"
        );

        result
    }
}

impl Default for LoanAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper around [`LoanAnalysisEngine::analyze`]
pub fn analyze(text_v1: &str, text_v2: &str) -> AnalysisResult {
    LoanAnalysisEngine::new().analyze(text_v1, text_v2)
}
