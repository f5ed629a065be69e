// Green / sustainability-linked lending checks based on keyword presence
use crate::patterns::{
    contains_any_lowered, EXTERNAL_REVIEW_KEYWORDS, KPI_KEYWORDS, REPORTING_KEYWORDS,
    SUSTAINABILITY_OBJECTIVE_KEYWORDS, USE_OF_PROCEEDS_KEYWORDS,
};
use shared_types::EsgCheckResult;
use tracing::trace;

/// A single presence rule: passes when any trigger phrase appears in the text
#[derive(Debug, Clone, Copy)]
pub struct EsgRule {
    pub name: &'static str,
    pub comment: &'static str,
    pub triggers: &'static [&'static str],
}

impl EsgRule {
    pub fn evaluate(&self, text: &str) -> EsgCheckResult {
        self.evaluate_lowered(&text.to_lowercase())
    }

    /// Evaluate against text that is already lowercased
    pub fn evaluate_lowered(&self, text_lower: &str) -> EsgCheckResult {
        let passed = contains_any_lowered(text_lower, self.triggers);
        trace!(rule = self.name, passed, "ESG rule evaluated");
        EsgCheckResult {
            rule_name: self.name.to_string(),
            passed,
            comment: self.comment.to_string(),
        }
    }
}

/// The rule battery, in output order
pub const ESG_RULES: &[EsgRule] = &[
    EsgRule {
        name: "Use of proceeds clearly defined",
        comment: "Green loans should clearly define how proceeds will be used.",
        triggers: USE_OF_PROCEEDS_KEYWORDS,
    },
    EsgRule {
        name: "Environmental / sustainability objectives described",
        comment: "Looks for language around green or sustainability objectives.",
        triggers: SUSTAINABILITY_OBJECTIVE_KEYWORDS,
    },
    EsgRule {
        name: "KPIs or performance targets included",
        comment: "Searches for sustainability-linked KPIs or performance targets.",
        triggers: KPI_KEYWORDS,
    },
    EsgRule {
        name: "Ongoing reporting obligations present",
        comment: "Checks if the borrower is required to report on performance.",
        triggers: REPORTING_KEYWORDS,
    },
    EsgRule {
        name: "External review / verification mentioned",
        comment: "Looks for external ESG review or verification requirements.",
        triggers: EXTERNAL_REVIEW_KEYWORDS,
    },
];

/// Runs every rule in [`ESG_RULES`] against `text`, one result per rule.
///
/// The text is lowercased once and shared by all rules.
pub fn run_esg_checks(text: &str) -> Vec<EsgCheckResult> {
    let text_lower = text.to_lowercase();
    ESG_RULES
        .iter()
        .map(|rule| rule.evaluate_lowered(&text_lower))
        .collect()
}
