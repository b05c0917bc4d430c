use super::domain::{
    Alignment, AppealStrength, ClauseMatchResult, DocumentationAnalysisResult, FinalReport,
};
use crate::workflows::grading::{Level, Rating};

pub const NO_REGULATORY_REFERENCES: &str = "No specific regulatory references detected.";

const LOW_CONFIDENCE_NOTE: &str =
    " Interpretation confidence is low; verify the cited clause with the insurer before relying \
     on this score.";

const INFORMATIONAL_NOTICE: &str = "This report provides an informational interpretation only. \
     It does not predict claim outcomes or provide legal advice.";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn conservative_strength(reasoning: &str) -> AppealStrength {
    AppealStrength {
        percentage: 50,
        label: Rating::Moderate,
        reasoning: reasoning.to_string(),
    }
}

/// Assemble the full audit report. `clause.confidence` is expected to already hold the
/// calibrated value.
pub fn build_final_report(
    clause: &ClauseMatchResult,
    documentation: &DocumentationAnalysisResult,
    appeal: AppealStrength,
    regulatory_context: &str,
) -> FinalReport {
    let mut alignment = clause.rejection_alignment;
    if clause.is_unclear() && alignment == Alignment::Strong {
        alignment = Alignment::Partial;
    }

    let mut confidence = clause.confidence;
    if clause
        .explanation
        .to_lowercase()
        .contains("unable to confidently")
    {
        confidence = Level::Low;
    }

    // A note only: the score itself is whatever the appeal scorer produced.
    let mut appeal = appeal;
    if confidence == Level::Low {
        appeal.reasoning.push_str(LOW_CONFIDENCE_NOTE);
    }

    let mut weak_points = Vec::new();
    let mut strong_points = Vec::new();

    match alignment {
        Alignment::Strong => weak_points.push("Rejection strongly aligns with policy wording."),
        Alignment::Partial => weak_points.push("Rejection partially aligns with policy wording."),
        Alignment::Weak | Alignment::NotDetected => {
            strong_points.push("Rejection appears weakly aligned with policy wording.")
        }
    }

    match documentation.documentation_gap_severity {
        Level::High => weak_points.push("Significant documentation gaps detected."),
        Level::Medium => weak_points.push("Moderate documentation gaps detected."),
        Level::Low => strong_points.push("Minimal documentation gaps detected."),
    }

    if documentation.medical_ambiguity_detected {
        weak_points.push("Medical documentation contains ambiguous language.");
    } else {
        strong_points.push("No significant medical ambiguity detected.");
    }

    let mut reapplication_steps: Vec<String> = documentation
        .missing_documents
        .iter()
        .map(|document| format!("Provide: {document}"))
        .collect();
    reapplication_steps.push("Request written clarification of applied clause.".to_string());
    reapplication_steps.push("Ensure all forms are fully completed and signed.".to_string());

    let regulatory_considerations = if regulatory_context.trim().is_empty() {
        NO_REGULATORY_REFERENCES.to_string()
    } else {
        regulatory_context.to_string()
    };

    FinalReport {
        case_summary: "The claim was rejected based on the insurer’s interpretation of policy \
                       provisions and submitted documentation."
            .to_string(),
        why_rejected: clause.explanation.clone(),
        policy_clause_detected: clause.clause_detected.clone(),
        clause_alignment: alignment,
        weak_points: strings(&weak_points),
        strong_points: strings(&strong_points),
        reapplication_steps,
        reapplication_possible: true,
        regulatory_considerations,
        appeal_strength: appeal,
        confidence,
        system_notice: INFORMATIONAL_NOTICE.to_string(),
    }
}

/// Terminal report when both analyzers reported Low confidence.
pub fn low_confidence_report(regulatory_context: &str) -> FinalReport {
    FinalReport {
        case_summary: "The system could not confidently interpret the claim rejection based on \
                       the provided documents."
            .to_string(),
        why_rejected: "Insufficient clarity detected in insurer communication or policy text."
            .to_string(),
        policy_clause_detected: "Unclear from provided documents".to_string(),
        clause_alignment: Alignment::Partial,
        weak_points: strings(&[
            "Low confidence in automated interpretation.",
            "Policy wording and rejection reasoning may require manual review.",
        ]),
        strong_points: Vec::new(),
        reapplication_steps: strings(&[
            "Request insurer to specify the exact policy clause applied.",
            "Request detailed written clarification of rejection reasoning.",
            "Consult an insurance advisor for manual review.",
        ]),
        reapplication_possible: true,
        regulatory_considerations: regulatory_context.to_string(),
        appeal_strength: conservative_strength(
            "Low confidence in automated interpretation; score defaulted conservatively.",
        ),
        confidence: Level::Low,
        system_notice: "Automated interpretation paused due to low confidence. Manual \
                        clarification is recommended."
            .to_string(),
    }
}

/// Terminal report for inputs too thin to analyse. Built before any external call.
pub fn early_fallback_report() -> FinalReport {
    FinalReport {
        case_summary: "The provided documents are too incomplete for an automated \
                       interpretation of the claim rejection."
            .to_string(),
        why_rejected: "The rejection letter is missing or the policy text is too short to \
                       identify the clause applied."
            .to_string(),
        policy_clause_detected: "Not analysed".to_string(),
        clause_alignment: Alignment::NotDetected,
        weak_points: strings(&["Insufficient input for automated interpretation."]),
        strong_points: Vec::new(),
        reapplication_steps: strings(&[
            "Provide the complete rejection letter from the insurer.",
            "Provide the full policy wording, including exclusions and waiting periods.",
            "Request insurer to specify the exact policy clause applied.",
        ]),
        reapplication_possible: true,
        regulatory_considerations: NO_REGULATORY_REFERENCES.to_string(),
        appeal_strength: conservative_strength(
            "Input too incomplete for automated interpretation; score defaulted conservatively.",
        ),
        confidence: Level::Low,
        system_notice: "Automated interpretation skipped due to insufficient input. Provide the \
                        full rejection letter and policy wording."
            .to_string(),
    }
}
