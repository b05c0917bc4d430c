//! Deterministic clause overrides. Literal evidence from the policy text always wins
//! over the generator's classification.

use super::domain::{ClauseField, ClauseRiskAssessment, RiskLevel};
use super::features::FeatureSet;

/// One forced change, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedOverride {
    pub field: ClauseField,
    pub from: RiskLevel,
    pub to: RiskLevel,
}

fn waiting_period_risk(years: u32) -> Option<RiskLevel> {
    match years {
        0 => None,
        1 => Some(RiskLevel::Low),
        2 => Some(RiskLevel::Moderate),
        _ => Some(RiskLevel::High),
    }
}

fn co_payment_risk(percentage: u32) -> Option<RiskLevel> {
    match percentage {
        0 => None,
        1..=9 => Some(RiskLevel::Low),
        10..=19 => Some(RiskLevel::Moderate),
        _ => Some(RiskLevel::High),
    }
}

/// `tenths` is the cap in tenths of a percent of the sum insured.
fn room_rent_risk(tenths: u32) -> Option<RiskLevel> {
    match tenths {
        0 => None,
        1..=10 => Some(RiskLevel::High),
        11..=20 => Some(RiskLevel::Moderate),
        _ => Some(RiskLevel::Low),
    }
}

/// Apply every threshold rule, then fill keyword-only evidence with a Moderate
/// placeholder. Returns the new assessment and the list of changes.
pub fn apply_clause_overrides(
    assessment: ClauseRiskAssessment,
    features: &FeatureSet,
) -> (ClauseRiskAssessment, Vec<AppliedOverride>) {
    let mut forced: Vec<(ClauseField, RiskLevel)> = Vec::new();
    let current = |field: ClauseField| assessment.get(field);

    if let Some(level) = waiting_period_risk(features.waiting_period_years) {
        forced.push((ClauseField::WaitingPeriod, level));
    }
    if let Some(level) = co_payment_risk(features.co_payment_percentage) {
        forced.push((ClauseField::CoPayment, level));
    }
    if let Some(level) = room_rent_risk(features.room_rent_tenths) {
        forced.push((ClauseField::RoomRentSublimit, level));
    }
    if features.consumables_exclusion {
        forced.push((
            ClauseField::DiseaseSpecificCaps,
            current(ClauseField::DiseaseSpecificCaps).at_least(RiskLevel::Moderate),
        ));
    }
    if features.restoration_benefit {
        forced.push((ClauseField::RestorationBenefit, RiskLevel::Low));
    }
    if features.free_look_period && features.grievance_redressal && features.ombudsman_reference {
        forced.push((ClauseField::TransparencyOfTerms, RiskLevel::Low));
    }
    if features.procedural_conditions {
        forced.push((
            ClauseField::ClaimProcedureComplexity,
            current(ClauseField::ClaimProcedureComplexity).at_least(RiskLevel::Moderate),
        ));
    }

    let placeholders = [
        (
            ClauseField::WaitingPeriod,
            features.has_waiting_period && features.waiting_period_years == 0,
        ),
        (ClauseField::PreExistingDisease, features.mentions_pre_existing),
        (
            ClauseField::RoomRentSublimit,
            features.room_rent_cap && features.room_rent_tenths == 0,
        ),
        (
            ClauseField::CoPayment,
            features.co_payment && features.co_payment_percentage == 0,
        ),
        (ClauseField::DiseaseSpecificCaps, features.disease_caps),
        (ClauseField::SublimitsAndCaps, features.disease_caps),
    ];

    let mut applied = Vec::new();
    let mut result = assessment;
    for (field, level) in forced {
        record(&mut result, &mut applied, field, level);
    }
    for (field, evidence) in placeholders {
        if evidence && result.get(field) == RiskLevel::NotFound {
            record(&mut result, &mut applied, field, RiskLevel::Moderate);
        }
    }

    (result, applied)
}

fn record(
    assessment: &mut ClauseRiskAssessment,
    applied: &mut Vec<AppliedOverride>,
    field: ClauseField,
    to: RiskLevel,
) {
    let from = assessment.get(field);
    if from != to {
        *assessment = assessment.with(field, to);
        applied.push(AppliedOverride { field, from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::prepurchase::features::extract_features;

    fn low_everywhere() -> ClauseRiskAssessment {
        ClauseField::ALL
            .into_iter()
            .fold(ClauseRiskAssessment::default(), |acc, field| {
                acc.with(field, RiskLevel::Low)
            })
    }

    #[test]
    fn numeric_evidence_beats_generator() {
        let features = extract_features("Waiting period of 36 months. A 20% co-payment applies.");
        assert_eq!(features.waiting_period_years, 3);
        assert_eq!(features.co_payment_percentage, 20);

        let (result, applied) = apply_clause_overrides(low_everywhere(), &features);
        assert_eq!(result.waiting_period, RiskLevel::High);
        assert_eq!(result.co_payment, RiskLevel::High);
        assert!(applied
            .iter()
            .any(|o| o.field == ClauseField::CoPayment && o.from == RiskLevel::Low));
    }

    #[test]
    fn overrides_apply_in_both_directions() {
        let generator_view = ClauseRiskAssessment::default()
            .with(ClauseField::WaitingPeriod, RiskLevel::High)
            .with(ClauseField::CoPayment, RiskLevel::High);
        let features = FeatureSet {
            waiting_period_years: 1,
            co_payment_percentage: 5,
            ..FeatureSet::default()
        };
        let (result, _) = apply_clause_overrides(generator_view, &features);
        assert_eq!(result.waiting_period, RiskLevel::Low);
        assert_eq!(result.co_payment, RiskLevel::Low);
    }

    #[test]
    fn room_rent_bands() {
        for (tenths, expected) in [
            (5, RiskLevel::High),
            (10, RiskLevel::High),
            (15, RiskLevel::Moderate),
            (20, RiskLevel::Moderate),
            (25, RiskLevel::Low),
            (50, RiskLevel::Low),
        ] {
            let features = FeatureSet {
                room_rent_tenths: tenths,
                ..FeatureSet::default()
            };
            let (result, _) = apply_clause_overrides(ClauseRiskAssessment::default(), &features);
            assert_eq!(result.room_rent_sublimit, expected, "tenths {tenths}");
        }
    }

    #[test]
    fn half_percent_room_rent_cap_is_high_risk() {
        let features = extract_features("Room rent is capped at 0.5% of the sum insured per day.");
        let start =
            ClauseRiskAssessment::default().with(ClauseField::RoomRentSublimit, RiskLevel::Low);
        let (result, applied) = apply_clause_overrides(start, &features);
        assert_eq!(result.room_rent_sublimit, RiskLevel::High);
        assert!(applied
            .iter()
            .any(|o| o.field == ClauseField::RoomRentSublimit && o.from == RiskLevel::Low));
    }

    #[test]
    fn room_rent_wording_leaves_disease_caps_unknown() {
        let features = extract_features("Room rent is limited to 2% of sum insured.");
        let (result, _) = apply_clause_overrides(ClauseRiskAssessment::default(), &features);
        assert_eq!(result.room_rent_sublimit, RiskLevel::Moderate);
        assert_eq!(result.disease_specific_caps, RiskLevel::NotFound);
        assert_eq!(result.sublimits_and_caps, RiskLevel::NotFound);
    }

    #[test]
    fn keyword_only_evidence_becomes_moderate_placeholder() {
        let features = FeatureSet {
            has_waiting_period: true,
            co_payment: true,
            ..FeatureSet::default()
        };
        let start = ClauseRiskAssessment::default().with(ClauseField::CoPayment, RiskLevel::Low);
        let (result, _) = apply_clause_overrides(start, &features);
        assert_eq!(result.waiting_period, RiskLevel::Moderate);
        // Already classified, so the placeholder does not apply.
        assert_eq!(result.co_payment, RiskLevel::Low);
    }

    #[test]
    fn consumer_protections_clear_transparency() {
        let features = FeatureSet {
            free_look_period: true,
            grievance_redressal: true,
            ombudsman_reference: true,
            restoration_benefit: true,
            ..FeatureSet::default()
        };
        let start = ClauseRiskAssessment::default()
            .with(ClauseField::TransparencyOfTerms, RiskLevel::High)
            .with(ClauseField::RestorationBenefit, RiskLevel::High);
        let (result, applied) = apply_clause_overrides(start, &features);
        assert_eq!(result.transparency_of_terms, RiskLevel::Low);
        assert_eq!(result.restoration_benefit, RiskLevel::Low);
        assert_eq!(applied.len(), 2);
    }

    #[test]
    fn no_evidence_leaves_assessment_untouched() {
        let (result, applied) = apply_clause_overrides(low_everywhere(), &FeatureSet::default());
        assert_eq!(result, low_everywhere());
        assert!(applied.is_empty());
    }
}
