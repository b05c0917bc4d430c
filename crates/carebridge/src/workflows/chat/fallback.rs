//! Deterministic answers used when the generator has nothing useful to say, plus the
//! regulatory source tags attached to every answer.

use super::report::ChatReport;
use crate::workflows::audit::{Alignment, FinalReport};
use crate::workflows::prepurchase::{PrePurchaseReport, RiskLevel};

pub const MAX_SOURCES: usize = 3;

const SOURCE_KEYWORDS: [(&str, &str); 10] = [
    ("moratorium", "IRDAI 8-Year Moratorium Rule"),
    ("irdai", "IRDAI Policyholders' Protection Regulations 2017"),
    ("ombudsman", "Insurance Ombudsman Rules 2017"),
    ("free look", "IRDAI Free Look Period Mandate"),
    ("waiting period", "IRDAI Waiting Period Regulations"),
    ("pre-existing", "IRDAI Pre-existing Disease Definition"),
    ("consumer protect", "Consumer Protection Act 2019"),
    ("igms", "IRDAI IGMS Grievance Portal"),
    ("copay", "IRDAI Co-payment Regulation"),
    ("restoration", "IRDAI Sum Insured Restoration Guidelines"),
];

/// Regulatory references mentioned in an answer, in table order.
pub fn extract_sources(answer: &str) -> Vec<String> {
    let text = answer.to_lowercase();
    SOURCE_KEYWORDS
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .map(|(_, label)| label.to_string())
        .take(MAX_SOURCES)
        .collect()
}

fn mentions(question: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| question.contains(keyword))
}

fn join_or(items: &[String], separator: &str, empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(separator)
    }
}

pub fn fallback_answer(question: &str, report: &ChatReport) -> String {
    let question = question.to_lowercase();
    match report {
        ChatReport::PrePurchase(report) => prepurchase_answer(&question, report),
        ChatReport::Audit(report) => audit_answer(&question, report),
    }
}

fn clause_names_at(report: &PrePurchaseReport, level: RiskLevel) -> Vec<String> {
    report
        .clause_risk
        .fields_at(level)
        .into_iter()
        .map(|field| field.key().replace('_', " "))
        .collect()
}

fn prepurchase_answer(q: &str, report: &PrePurchaseReport) -> String {
    let score = report.score_breakdown.adjusted_score;
    let rating = report.overall_policy_rating;
    let comply = report.irdai_compliance.compliance_rating.as_str();
    let broker = report.broker_risk_analysis.structural_risk_level.as_str();
    let high = clause_names_at(report, RiskLevel::High);
    let moderate = clause_names_at(report, RiskLevel::Moderate);

    if mentions(q, &["risk", "biggest", "danger", "concern", "worst"]) {
        if high.is_empty() {
            let moderate: Vec<String> = moderate.into_iter().take(3).collect();
            return format!(
                "No clauses were rated High Risk. Moderate risk areas include: {}. Overall \
                 score: {score}/100 ({rating}).",
                join_or(&moderate, ", ", "none detected")
            );
        }
        let worst: Vec<String> = high.into_iter().take(4).collect();
        return format!(
            "The highest-risk clauses are: {}. These directly reduce your effective coverage. \
             Overall policy score: {score}/100 ({rating}). IRDAI Compliance: {comply}.",
            worst.join(", ")
        );
    }

    if mentions(q, &["waiting", "wait"]) {
        return match report.clause_risk.waiting_period {
            RiskLevel::High => {
                "This policy has a long waiting period (3+ years). You cannot claim for \
                 pre-existing conditions during this period."
            }
            RiskLevel::Moderate => {
                "The waiting period is Moderate Risk (1–3 years). Confirm the exact duration \
                 before signing."
            }
            RiskLevel::Low => {
                "The waiting period appears short — a positive indicator. Verify the exact clause."
            }
            RiskLevel::NotFound => {
                "Waiting period was not detectable. Ask the insurer: how many months until \
                 pre-existing conditions are covered?"
            }
        }
        .to_string();
    }

    if mentions(q, &["compliance", "irdai", "regulatory"]) {
        return format!(
            "IRDAI compliance is rated {comply}. This reflects key consumer protections: \
             free-look period, grievance redressal, and claim timelines. Structural risk: {broker}."
        );
    }

    if mentions(q, &["buy", "should i", "recommend", "decision"]) {
        let advice = if score >= 80 {
            "This policy scores well and appears consumer-friendly."
        } else if score >= 55 {
            "Moderate score. Clarify the flagged High Risk clauses before signing."
        } else {
            "Low score. Consider comparing alternatives or negotiating clause amendments."
        };
        return format!(
            "Policy Score: {score}/100 ({rating}). Structural Risk: {broker}. {advice}"
        );
    }

    if mentions(q, &["negotiate", "before buying", "which clause", "ask"]) {
        if high.is_empty() {
            return "No High Risk clauses detected. Still ask the insurer to clarify exclusions \
                    and confirm there are no hidden sub-limits."
                .to_string();
        }
        let worst: Vec<String> = high.into_iter().take(3).collect();
        return format!(
            "Before buying, get written clarification on: {}. Also ask for the insurer's claim \
             settlement ratio and exact waiting period duration.",
            worst.join(", ")
        );
    }

    if mentions(q, &["not found", "missing", "detected"]) {
        let missing = clause_names_at(report, RiskLevel::NotFound);
        if missing.is_empty() {
            return "All 10 clauses were detected in the policy text.".to_string();
        }
        return format!(
            "These clauses were not detectable: {}. This may mean the text provided was a \
             summary — upload the full policy or ask the insurer directly.",
            missing.join(", ")
        );
    }

    if !report.checklist_for_buyer.is_empty() {
        let first: Vec<String> = report.checklist_for_buyer.iter().take(3).cloned().collect();
        return format!(
            "Key pre-purchase questions: {}. Score: {score}/100 ({rating}).",
            first.join(" | ")
        );
    }

    format!(
        "Policy Score: {score}/100 ({rating}). High Risk clauses: {}. IRDAI Compliance: \
         {comply}. Structural Risk: {broker}.",
        join_or(&high, ", ", "none")
    )
}

fn audit_answer(q: &str, report: &FinalReport) -> String {
    let appeal = &report.appeal_strength;
    let pct = appeal.percentage;
    let label = appeal.label;
    let why = &report.why_rejected;
    let clause = &report.policy_clause_detected;
    let alignment = report.clause_alignment;

    if mentions(q, &["strong", "chance", "appeal case", "how strong"]) {
        let extra = if pct >= 70 {
            "Strong position — challenge formally."
        } else if pct >= 40 {
            "Worth pursuing — address the evidence gaps first."
        } else {
            "Difficult case — focus on the moratorium rule if policy is 8+ years old."
        };
        return format!("Appeal rated {label} at {pct}%. {} {extra}", appeal.reasoning);
    }

    if mentions(q, &["overturn", "evidence", "what could", "reverse"]) {
        let weak: Vec<String> = report.weak_points.iter().take(2).cloned().collect();
        return format!(
            "To overturn: address {}. Get a physician's letter confirming exact diagnosis \
             date, gather records showing when the condition first manifested, and \
             cross-reference the rejection clause against IRDAI's standardised exclusion \
             definitions. If the policy is 8+ years old, invoke the IRDAI moratorium — \
             pre-existing exclusions cannot apply.",
            join_or(&weak, "; ", "documentation gaps")
        );
    }

    if mentions(q, &["moratorium", "8 year", "8-year"]) {
        return "The IRDAI 8-year moratorium: after 8 continuous years on any health policy, \
                the insurer cannot reject citing pre-existing disease — even if not disclosed \
                at inception. If your policy (or ported predecessor) is 8+ years old, this is \
                your strongest legal argument."
            .to_string();
    }

    if mentions(q, &["next step", "what should", "what do i", "how do i"]) {
        if report.reapplication_steps.is_empty() {
            return "1. File written complaint with insurer GRO. 2. Escalate to IRDAI IGMS \
                    (igms.irda.gov.in) if no response in 15 days. 3. Approach Insurance \
                    Ombudsman (cioins.co.in) within 1 year of final reply."
                .to_string();
        }
        let steps = report
            .reapplication_steps
            .iter()
            .take(3)
            .enumerate()
            .map(|(index, step)| format!("{}. {step}", index + 1))
            .collect::<Vec<_>>()
            .join(" ");
        return format!(
            "{steps} File with IRDAI IGMS if no response in 15 days. Approach Ombudsman within \
             1 year."
        );
    }

    if mentions(q, &["ombudsman", "escalat", "complain", "igms"]) {
        return "File with IRDAI IGMS first. If unresolved in 30 days, approach the Insurance \
                Ombudsman. Eligibility: claims up to ₹50 lakhs, within 1 year of the insurer's \
                final reply. Free and binding."
            .to_string();
    }

    if mentions(q, &["document", "need", "bring", "submit"]) {
        return "For appeal: (1) full policy document, (2) original rejection letter, (3) all \
                medical records submitted with claim, (4) hospital discharge summary and bills, \
                (5) doctor's certificate with exact diagnosis date, (6) prior insurer \
                correspondence."
            .to_string();
    }

    if mentions(q, &["clause", "exclusion", "why", "what clause"]) {
        let verdict = if matches!(alignment, Alignment::Weak | Alignment::NotDetected) {
            "This is potentially challengeable — the insurer application appears weak."
        } else {
            "The insurer has a policy basis, but you can still contest the interpretation."
        };
        return format!(
            "Clause applied: \"{clause}\". Rejection basis: \"{why}\". Alignment: {}. {verdict}",
            alignment.as_str()
        );
    }

    let strong: Vec<String> = report.strong_points.iter().take(2).cloned().collect();
    let weak: Vec<String> = report.weak_points.iter().take(2).cloned().collect();
    format!(
        "Rejection: \"{why}\". Clause: \"{clause}\" ({} alignment). Appeal: {label} ({pct}%). \
         Strong: {}. Challenges: {}.",
        alignment.as_str(),
        join_or(&strong, "; ", "none identified"),
        join_or(&weak, "; ", "none identified")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::audit::report::low_confidence_report;

    #[test]
    fn sources_follow_table_order_and_cap_at_three() {
        let sources = extract_sources(
            "Under the IRDAI moratorium you may approach the Ombudsman or use IGMS after the \
             waiting period.",
        );
        assert_eq!(
            sources,
            vec![
                "IRDAI 8-Year Moratorium Rule",
                "IRDAI Policyholders' Protection Regulations 2017",
                "Insurance Ombudsman Rules 2017",
            ]
        );
        assert!(extract_sources("Nothing regulatory here.").is_empty());
    }

    #[test]
    fn audit_fallback_answers_appeal_questions_with_the_percentage() {
        let report = ChatReport::Audit(low_confidence_report("ctx"));
        let answer = fallback_answer("How strong is my appeal?", &report);
        assert!(answer.starts_with("Appeal rated Moderate at 50%."));
        assert!(answer.ends_with("Worth pursuing — address the evidence gaps first."));
    }

    #[test]
    fn audit_fallback_numbers_the_next_steps() {
        let report = ChatReport::Audit(low_confidence_report("ctx"));
        let answer = fallback_answer("What should I do now?", &report);
        assert!(answer.starts_with("1. Request insurer to specify the exact policy clause applied."));
        assert!(answer.contains(" 3. Consult an insurance advisor for manual review."));
    }

    #[test]
    fn audit_fallback_defaults_to_a_summary() {
        let report = ChatReport::Audit(low_confidence_report("ctx"));
        let answer = fallback_answer("Hello", &report);
        assert!(answer.contains("(Partial alignment)"));
        assert!(answer.contains("Strong: none identified."));
    }
}
