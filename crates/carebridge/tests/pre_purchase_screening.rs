mod common;

use std::sync::Arc;

use carebridge::config::ScoringConfig;
use carebridge::workflows::comparison::{PolicyComparisonEngine, RecommendedPolicy};
use carebridge::workflows::grading::Level;
use carebridge::workflows::prepurchase::features::extract_features;
use carebridge::workflows::prepurchase::overrides::apply_clause_overrides;
use carebridge::workflows::prepurchase::scoring::compute_policy_score;
use carebridge::workflows::prepurchase::{
    detection_confidence, ClauseField, ClauseRiskAssessment, RiskLevel,
};
use common::{policy_wording, prepurchase_engine, RoutedGenerator, ALL_MODERATE, PREPURCHASE_PROMPT};

const LEVELS: [RiskLevel; 4] = [
    RiskLevel::High,
    RiskLevel::Moderate,
    RiskLevel::Low,
    RiskLevel::NotFound,
];

#[test]
fn stated_waiting_period_and_co_payment_force_high_risk() {
    let features =
        extract_features("A waiting period of 36 months applies. There is a 20% co-payment.");
    assert_eq!(features.waiting_period_years, 3);
    assert_eq!(features.co_payment_percentage, 20);

    let (assessment, applied) = apply_clause_overrides(ClauseRiskAssessment::default(), &features);
    assert_eq!(assessment.waiting_period, RiskLevel::High);
    assert_eq!(assessment.co_payment, RiskLevel::High);
    assert!(applied
        .iter()
        .any(|change| change.field == ClauseField::CoPayment && change.to == RiskLevel::High));
}

#[test]
fn policy_score_stays_bounded_for_every_grade_mix() {
    let config = ScoringConfig::default();
    // Every field at the same level, plus a rotating single-field variation.
    for base in LEVELS {
        for odd in LEVELS {
            for field in ClauseField::ALL {
                let assessment = ClauseField::ALL
                    .into_iter()
                    .fold(ClauseRiskAssessment::default(), |acc, each| {
                        acc.with(each, base)
                    })
                    .with(field, odd);
                for compliance in [0, 3, 7] {
                    let score = compute_policy_score(&assessment, compliance, &config);
                    let breakdown = score.breakdown;
                    assert!(breakdown.adjusted_score <= 100);
                    assert!((0.0..=1.0).contains(&breakdown.risk_index));
                }
            }
        }
    }
}

#[test]
fn confidence_follows_the_number_of_detected_clauses() {
    for detected in 0..=10 {
        let assessment = ClauseField::ALL
            .into_iter()
            .take(detected)
            .fold(ClauseRiskAssessment::default(), |acc, field| {
                acc.with(field, RiskLevel::Low)
            });
        let expected = match detected {
            8..=10 => Level::High,
            5..=7 => Level::Medium,
            _ => Level::Low,
        };
        assert_eq!(detection_confidence(assessment.detected()), expected);
    }
}

#[tokio::test]
async fn full_screening_applies_overrides_on_top_of_generator_grades() {
    let generator = Arc::new(RoutedGenerator::new().route(PREPURCHASE_PROMPT, &[ALL_MODERATE]));
    let engine = prepurchase_engine(generator.clone());

    let report = engine.run(&policy_wording()).await;

    assert_eq!(generator.calls_matching(PREPURCHASE_PROMPT), 1);
    assert_eq!(report.clause_risk.waiting_period, RiskLevel::High);
    assert_eq!(report.clause_risk.co_payment, RiskLevel::High);
    assert_eq!(report.clause_risk.room_rent_sublimit, RiskLevel::Moderate);
    assert_eq!(report.confidence, Level::High);
    assert_eq!(report.irdai_compliance.compliance_score, 3);
    assert_eq!(report.red_flags.len(), 2);
    assert!(report.score_breakdown.adjusted_score <= 100);
    assert_eq!(report.checklist_for_buyer.len(), 6);
}

#[tokio::test]
async fn comparison_prefers_the_more_transparent_policy() {
    let generator = Arc::new(
        RoutedGenerator::new().route(PREPURCHASE_PROMPT, &[ALL_MODERATE, ALL_MODERATE]),
    );
    let comparison = PolicyComparisonEngine::new(prepurchase_engine(generator.clone()));

    let disclosed = "Room rent is limited to 5% of the sum insured per day. Grievance cell \
                     available, Insurance Ombudsman escalation, registered with IRDAI. Free \
                     look period of 15 days. Portability allowed. Claim settlement within 30 \
                     days. All exclusions are listed in Annexure II.";
    let report = comparison.compare(&policy_wording(), disclosed).await;

    assert_eq!(generator.calls_matching(PREPURCHASE_PROMPT), 2);
    assert_eq!(report.recommended_policy, RecommendedPolicy::B);
    assert!(report.policy_b_score > report.policy_a_score + 3);
    assert!(report
        .key_differences
        .contains(&"Co-payment: Policy A is High Risk, Policy B is Moderate Risk".to_string()));
    assert!(report
        .b_advantages
        .contains(&"Better IRDAI compliance (7/7 vs 3/7)".to_string()));
    assert!(report.recommendation.starts_with("Policy B scores"));
}
