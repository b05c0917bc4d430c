use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::session::{ChatTurn, Role};
use crate::sanitize::truncate_chars;
use crate::workflows::audit::FinalReport;
use crate::workflows::grading::Level;
use crate::workflows::prepurchase::{PrePurchaseReport, RiskLevel};

const REGULATORY_CONTEXT_LIMIT: usize = 500;
const MAX_STEPS_IN_CONTEXT: usize = 5;

/// A finished report a user can ask questions about. The variant is inferred from the
/// report's own fields when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReport {
    Audit(FinalReport),
    PrePurchase(PrePurchaseReport),
}

impl ChatReport {
    pub fn confidence(&self) -> Level {
        match self {
            ChatReport::Audit(report) => report.confidence,
            ChatReport::PrePurchase(report) => report.confidence,
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            ChatReport::Audit(_) => AUDIT_INSTRUCTION,
            ChatReport::PrePurchase(_) => PREPURCHASE_INSTRUCTION,
        }
    }

    pub fn context_block(&self) -> String {
        match self {
            ChatReport::Audit(report) => audit_context(report),
            ChatReport::PrePurchase(report) => prepurchase_context(report),
        }
    }
}

const PREPURCHASE_INSTRUCTION: &str = "You are an expert Indian health insurance advisor helping a policyholder evaluate a policy before purchase.
Answer clearly and specifically using the report data above.
Be direct about risks — do not soften warnings about High Risk clauses.
For \"Not Found\" clauses, explain that the data was not detectable and advise the user to ask the insurer directly.
Reference specific clause names (e.g., 'room_rent_sublimit', 'waiting_period') in plain English.
If asked about a specific clause, explain what it means for the policyholder in practical terms.
Do not make up clause values — only reference what is in the report data.
Write 3–5 sentences in plain English. No bullet points. No JSON.";

const AUDIT_INSTRUCTION: &str = "You are an expert Indian insurance claim advisor helping a policyholder understand their post-rejection audit report.
Answer clearly and specifically using the report data above.
If asked about appeal strength, always cite the percentage and explain the reasoning.
If asked about next steps, give the steps in order with time limits (IRDAI: 15 days, Ombudsman: 1 year from final reply).
If the clause alignment is Weak or Not Detected, explain this is an argument in the policyholder's favour.
Mention the IRDAI 8-year moratorium rule if the question relates to pre-existing disease rejection.
Do not make up regulatory references not in the context above.
Write 3–5 sentences in plain English. No bullet points. No JSON.";

fn joined_or(items: &[String], separator: &str, empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(separator)
    }
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| format!("  {}. {item}", index + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Missing documents survive in the report only as "Provide: ..." steps.
pub fn missing_documents(report: &FinalReport) -> Vec<String> {
    report
        .reapplication_steps
        .iter()
        .filter_map(|step| step.strip_prefix("Provide: "))
        .map(str::to_string)
        .collect()
}

fn clause_keys_at(report: &PrePurchaseReport, level: RiskLevel) -> Vec<String> {
    report
        .clause_risk
        .fields_at(level)
        .into_iter()
        .map(|field| field.key().to_string())
        .collect()
}

fn prepurchase_context(report: &PrePurchaseReport) -> String {
    let score = &report.score_breakdown;
    let irdai = &report.irdai_compliance;
    let broker = &report.broker_risk_analysis;

    let clauses = report
        .clause_risk
        .iter()
        .map(|(field, level)| format!("  - {}: {level}", field.key()))
        .collect::<Vec<_>>()
        .join("\n");
    let present_flags = irdai
        .compliance_flags
        .iter()
        .filter(|(key, flag)| !key.starts_with('_') && flag.is_present())
        .map(|(key, _)| key.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut block = String::from("REPORT TYPE: Pre-Purchase Policy Analysis\n\n");
    let _ = writeln!(
        block,
        "POLICY SCORE: {}/100 — Rating: {} — Risk Index: {}\n",
        score.adjusted_score, score.rating, score.risk_index
    );
    let _ = writeln!(block, "CLAUSE RISK ASSESSMENT (10 clauses):\n{clauses}\n");
    let _ = writeln!(
        block,
        "HIGH RISK CLAUSES: {}",
        joined_or(&clause_keys_at(report, RiskLevel::High), ", ", "None detected")
    );
    let _ = writeln!(
        block,
        "MODERATE RISK CLAUSES: {}\n",
        joined_or(&clause_keys_at(report, RiskLevel::Moderate), ", ", "None")
    );
    let _ = writeln!(
        block,
        "IRDAI COMPLIANCE: {} — Score: {}/7",
        irdai.compliance_rating.as_str(),
        irdai.compliance_score
    );
    let _ = writeln!(block, "COMPLIANCE FLAGS: {present_flags}\n");
    let _ = writeln!(block, "STRUCTURAL RISK: {}", broker.structural_risk_level.as_str());
    let _ = writeln!(block, "TRANSPARENCY SCORE: {}/100", broker.transparency_score);
    let _ = writeln!(
        block,
        "RISK DENSITY: {} (0=safe, 1=maximum risk)",
        broker.risk_density_index
    );
    let _ = writeln!(block, "DATA SUFFICIENT: {}", broker.data_sufficient);
    let _ = writeln!(block, "RECOMMENDATION: {}\n", broker.recommendation);
    let _ = writeln!(block, "RED FLAGS: {}", joined_or(&report.red_flags, "; ", "None"));
    let _ = writeln!(
        block,
        "POSITIVE FLAGS: {}\n",
        joined_or(&report.positive_flags, "; ", "None")
    );
    let _ = write!(block, "BUYER CHECKLIST:\n{}", numbered(&report.checklist_for_buyer));
    block
}

fn audit_context(report: &FinalReport) -> String {
    let appeal = &report.appeal_strength;
    let steps: Vec<String> = report
        .reapplication_steps
        .iter()
        .take(MAX_STEPS_IN_CONTEXT)
        .cloned()
        .collect();
    let regulatory = truncate_chars(&report.regulatory_considerations, REGULATORY_CONTEXT_LIMIT);
    let regulatory = if regulatory.trim().is_empty() {
        "No specific regulatory references retrieved."
    } else {
        regulatory
    };

    let mut block = String::from("REPORT TYPE: Post-Rejection Claim Audit\n\n");
    let _ = writeln!(block, "REJECTION REASON: {}", report.why_rejected);
    let _ = writeln!(block, "POLICY CLAUSE APPLIED: {}", report.policy_clause_detected);
    let _ = writeln!(
        block,
        "CLAUSE ALIGNMENT WITH REJECTION: {}",
        report.clause_alignment.as_str()
    );
    let _ = writeln!(block, "SYSTEM CONFIDENCE: {}\n", report.confidence);
    let _ = writeln!(block, "APPEAL STRENGTH: {} — {}%", appeal.label, appeal.percentage);
    let _ = writeln!(block, "APPEAL REASONING: {}\n", appeal.reasoning);
    let _ = writeln!(
        block,
        "STRONG POINTS FOR POLICYHOLDER: {}",
        joined_or(&report.strong_points, "; ", "None identified")
    );
    let _ = writeln!(
        block,
        "WEAK POINTS / CHALLENGES: {}\n",
        joined_or(&report.weak_points, "; ", "None identified")
    );
    let _ = writeln!(
        block,
        "MISSING DOCUMENTS: {}\n",
        joined_or(&missing_documents(report), ", ", "None identified")
    );
    let _ = writeln!(block, "NEXT STEPS (in order):\n{}\n", numbered(&steps));
    let _ = write!(block, "REGULATORY CONTEXT:\n{regulatory}");
    block
}

/// Prior turns as `User:` / `Assistant:` lines; blank turns are skipped.
pub fn format_history(history: &[ChatTurn]) -> String {
    let lines: Vec<String> = history
        .iter()
        .filter_map(|turn| {
            let content = turn.content.trim();
            if content.is_empty() {
                return None;
            }
            Some(match turn.role {
                Role::User => format!("User: {content}"),
                Role::Assistant => format!("Assistant: {content}"),
            })
        })
        .collect();
    if lines.is_empty() {
        "No prior conversation.".to_string()
    } else {
        lines.join("\n")
    }
}
