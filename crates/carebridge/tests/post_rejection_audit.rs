mod common;

use std::sync::Arc;

use carebridge::workflows::audit::calibration::calibrate;
use carebridge::workflows::audit::classifier::classify_rejection;
use carebridge::workflows::audit::contradiction::apply_contradictions;
use carebridge::workflows::audit::{
    Alignment, AuditRequest, ClauseCategory, ClauseMatchResult, DocumentationAnalysisResult,
};
use carebridge::workflows::grading::{Level, Rating};
use common::{audit_engine, policy_wording, RoutedGenerator, CLAUSE_PROMPT, DOCUMENTATION_PROMPT};

fn request(rejection: &str, medical: Option<&str>) -> AuditRequest {
    AuditRequest {
        policy_text: policy_wording(),
        rejection_text: rejection.to_string(),
        user_explanation: Some("My claim for a knee surgery was rejected.".to_string()),
        medical_documents_text: medical.map(str::to_string),
    }
}

#[test]
fn pre_existing_rejection_contradicted_by_medical_history_is_weakened() {
    let rejection = "claim rejected due to pre-existing condition";
    let category = classify_rejection(rejection).expect("keyword category");
    assert_eq!(category, ClauseCategory::PreExistingDisease);

    let clause = apply_contradictions(
        &ClauseMatchResult::from_rule(category),
        &policy_wording(),
        "Discharge notes record no prior history of the condition.",
    );

    assert_eq!(clause.rejection_alignment, Alignment::Weak);
    assert_eq!(clause.clause_category, ClauseCategory::PreExistingDisease);
    assert!(clause.is_weakened());
}

#[test]
fn calibration_is_low_whenever_both_analyzers_are_low() {
    for alignment in [
        Alignment::Strong,
        Alignment::Partial,
        Alignment::Weak,
        Alignment::NotDetected,
    ] {
        for category in ClauseCategory::ALL {
            let clause = ClauseMatchResult {
                clause_category: category,
                rejection_alignment: alignment,
                confidence: Level::Low,
                clause_clarity: Level::High,
                ..ClauseMatchResult::from_rule(category)
            };
            let documentation = DocumentationAnalysisResult {
                confidence: Level::Low,
                ..DocumentationAnalysisResult::default()
            };
            assert_eq!(calibrate(&clause, &documentation), Level::Low);
        }
    }
}

#[tokio::test]
async fn keyword_path_audit_skips_the_clause_generator() {
    let generator = Arc::new(RoutedGenerator::new().route(
        DOCUMENTATION_PROMPT,
        &[r#"{"missing_documents": ["Previous consultation records"],
              "documentation_gap_severity": "Medium", "rejection_nature": "Substantive",
              "medical_ambiguity_detected": false, "explanation": "History disputed.",
              "confidence": "High"}"#],
    ));
    let engine = audit_engine(generator.clone());

    let report = engine
        .run(&request(
            "Your claim is rejected due to pre-existing condition as per Section 2.",
            Some("Discharge notes record no prior history of the condition."),
        ))
        .await;

    assert_eq!(generator.calls_matching(CLAUSE_PROMPT), 0);
    assert_eq!(generator.calls_matching(DOCUMENTATION_PROMPT), 1);
    assert_eq!(report.clause_alignment, Alignment::Weak);
    assert_eq!(report.confidence, Level::Medium);
    assert_eq!(report.reapplication_steps[0], "Provide: Previous consultation records");
    // 50 + 25 + 8 - 12
    assert_eq!(report.appeal_strength.percentage, 71);
    assert_eq!(report.appeal_strength.label, Rating::Strong);
    assert!(report.regulatory_considerations.contains("moratorium"));
}

#[tokio::test]
async fn unusable_generator_output_returns_the_low_confidence_report() {
    let generator = Arc::new(
        RoutedGenerator::new()
            .route(CLAUSE_PROMPT, &["Sorry, I cannot help.", "{\"unrelated\": 1}"])
            .route(DOCUMENTATION_PROMPT, &["", ""]),
    );
    let engine = audit_engine(generator.clone());

    let report = engine
        .run(&request(
            "We regret to inform you that the claim stands declined after review.",
            None,
        ))
        .await;

    assert_eq!(generator.calls_matching(CLAUSE_PROMPT), 2);
    assert_eq!(generator.calls_matching(DOCUMENTATION_PROMPT), 2);
    assert_eq!(report.appeal_strength.percentage, 50);
    assert_eq!(report.appeal_strength.label, Rating::Moderate);
    assert_eq!(report.confidence, Level::Low);
}

#[tokio::test]
async fn missing_document_wording_forces_a_procedural_reading() {
    let generator = Arc::new(RoutedGenerator::new().route(
        DOCUMENTATION_PROMPT,
        &[r#"{"missing_documents": [], "documentation_gap_severity": "Low",
              "rejection_nature": "Substantive", "medical_ambiguity_detected": false,
              "explanation": "Looks complete.", "confidence": "Low"}"#],
    ));
    let engine = audit_engine(generator.clone());

    let report = engine
        .run(&request(
            "The claim is on hold because the documents were not submitted within the \
             stipulated time.",
            None,
        ))
        .await;

    // "document" is a rejection keyword, so the clause generator is never asked.
    assert_eq!(generator.calls_matching(CLAUSE_PROMPT), 0);
    assert!(report
        .weak_points
        .contains(&"Significant documentation gaps detected.".to_string()));
    assert_eq!(report.confidence, Level::Medium);
    // 50 - 10 + 20 + 15
    assert_eq!(report.appeal_strength.percentage, 75);
}

#[tokio::test]
async fn empty_rejection_letter_never_reaches_the_generator() {
    let generator = Arc::new(RoutedGenerator::new());
    let engine = audit_engine(generator.clone());

    let report = engine.run(&request("", None)).await;

    assert_eq!(generator.total_calls(), 0);
    assert_eq!(report.policy_clause_detected, "Not analysed");
    assert_eq!(report.appeal_strength.percentage, 50);
}
