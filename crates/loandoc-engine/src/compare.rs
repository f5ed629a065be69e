//! Field-level comparison between two versions of a facility agreement

use shared_types::{ExtractedFields, FieldChange, FieldName};

/// Impact used for any field without an entry in [`IMPACT_TABLE`]
pub const GENERIC_IMPACT: &str = "Change detected";

/// Per-field impact messages attached to detected changes
pub const IMPACT_TABLE: &[(FieldName, &str)] = &[
    (
        FieldName::Margin,
        "Economic impact: margin changed (cost of debt).",
    ),
    (
        FieldName::FacilityAmount,
        "Economic impact: facility size changed.",
    ),
    (
        FieldName::MaturityDate,
        "Term/risk impact: maturity changed.",
    ),
    (FieldName::Borrower, "Counterparty details changed."),
    (FieldName::Purpose, "Use of proceeds changed."),
];

pub fn impact_for(field: FieldName) -> &'static str {
    IMPACT_TABLE
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, impact)| *impact)
        .unwrap_or(GENERIC_IMPACT)
}

/// Lists the fields whose values differ between `baseline` and `revised`.
///
/// Iterates the baseline's fields in enumeration order. A field missing from
/// `revised` compares as "Not detected". Equal values, including two
/// sentinels, never produce a change.
pub fn compare_terms(baseline: &ExtractedFields, revised: &ExtractedFields) -> Vec<FieldChange> {
    baseline
        .iter()
        .filter_map(|(field, from_value)| {
            let to_value = revised.get(field);
            if from_value == to_value {
                return None;
            }
            Some(FieldChange {
                field,
                from_value: from_value.to_string(),
                to_value: to_value.to_string(),
                impact: impact_for(field).to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::NOT_DETECTED;

    fn baseline() -> ExtractedFields {
        ExtractedFields::new()
            .with_field(FieldName::FacilityAmount, "EUR 150,000,000")
            .with_field(FieldName::Margin, "2.50% per annum")
            .with_field(FieldName::MaturityDate, "31 March 2028")
            .with_field(FieldName::Borrower, "GreenTech Energy Ltd.")
            .with_field(FieldName::Purpose, NOT_DETECTED)
    }

    #[test]
    fn test_margin_change_reports_cost_of_debt() {
        let revised = baseline().with_field(FieldName::Margin, "3.00% per annum");
        let changes = compare_terms(&baseline(), &revised);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, FieldName::Margin);
        assert_eq!(changes[0].from_value, "2.50% per annum");
        assert_eq!(changes[0].to_value, "3.00% per annum");
        assert!(changes[0].impact.contains("cost of debt"));
    }

    #[test]
    fn test_identical_fields_produce_no_changes() {
        assert!(compare_terms(&baseline(), &baseline()).is_empty());
    }

    #[test]
    fn test_two_sentinels_are_not_a_change() {
        let revised = baseline().with_field(FieldName::Margin, "3.00% per annum");
        let changes = compare_terms(&baseline(), &revised);
        assert_eq!(changes.len(), 1);
        assert!(changes.iter().all(|c| c.field != FieldName::Purpose));
    }

    #[test]
    fn test_changes_follow_enumeration_order() {
        let revised = ExtractedFields::new()
            .with_field(FieldName::FacilityAmount, "EUR 200,000,000")
            .with_field(FieldName::Margin, "2.50% per annum")
            .with_field(FieldName::MaturityDate, "31 March 2030")
            .with_field(FieldName::Borrower, "GreenTech Energy Holdings Ltd.")
            .with_field(FieldName::Purpose, "General corporate purposes");
        let changes = compare_terms(&baseline(), &revised);

        let fields: Vec<_> = changes.iter().map(|c| c.field).collect();
        assert_eq!(
            fields,
            vec![
                FieldName::FacilityAmount,
                FieldName::MaturityDate,
                FieldName::Borrower,
                FieldName::Purpose,
            ]
        );
        assert_eq!(changes[0].impact, "Economic impact: facility size changed.");
        assert_eq!(changes[1].impact, "Term/risk impact: maturity changed.");
        assert_eq!(changes[2].impact, "Counterparty details changed.");
        assert_eq!(changes[3].impact, "Use of proceeds changed.");
        assert_eq!(changes[3].from_value, NOT_DETECTED);
    }

    #[test]
    fn test_field_missing_from_revised_reads_as_not_detected() {
        let revised = ExtractedFields::new().with_field(FieldName::Margin, "2.50% per annum");
        let changes = compare_terms(&baseline(), &revised);

        // Purpose is the sentinel on both sides, so it does not show up
        assert_eq!(changes.len(), 3);
        assert!(changes.iter().all(|c| c.to_value == NOT_DETECTED));
    }

    #[test]
    fn test_only_baseline_fields_are_compared() {
        let base = ExtractedFields::new().with_field(FieldName::Margin, "2.50% per annum");
        let revised = baseline();
        let changes = compare_terms(&base, &revised);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_every_field_has_an_impact_entry() {
        for field in FieldName::ALL {
            assert_ne!(impact_for(field), GENERIC_IMPACT, "{} has no impact", field);
        }
    }
}
