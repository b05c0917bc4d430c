use std::fmt;

use serde::{Deserialize, Serialize};

use crate::workflows::grading::{Level, Rating};

/// Policy clause category a rejection relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseCategory {
    #[serde(rename = "Pre-existing disease")]
    PreExistingDisease,
    #[serde(rename = "Waiting period")]
    WaitingPeriod,
    #[serde(rename = "Policy exclusion")]
    PolicyExclusion,
    #[serde(rename = "Room rent limit")]
    RoomRentLimit,
    #[serde(rename = "Co-payment")]
    CoPayment,
    #[serde(rename = "Insufficient documentation")]
    InsufficientDocumentation,
    #[serde(rename = "Authorization requirement")]
    AuthorizationRequirement,
    #[serde(rename = "Not Detected")]
    NotDetected,
    #[serde(rename = "Other / unclear")]
    OtherUnclear,
}

impl ClauseCategory {
    pub const ALL: [ClauseCategory; 9] = [
        ClauseCategory::PreExistingDisease,
        ClauseCategory::WaitingPeriod,
        ClauseCategory::PolicyExclusion,
        ClauseCategory::RoomRentLimit,
        ClauseCategory::CoPayment,
        ClauseCategory::InsufficientDocumentation,
        ClauseCategory::AuthorizationRequirement,
        ClauseCategory::NotDetected,
        ClauseCategory::OtherUnclear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseCategory::PreExistingDisease => "Pre-existing disease",
            ClauseCategory::WaitingPeriod => "Waiting period",
            ClauseCategory::PolicyExclusion => "Policy exclusion",
            ClauseCategory::RoomRentLimit => "Room rent limit",
            ClauseCategory::CoPayment => "Co-payment",
            ClauseCategory::InsufficientDocumentation => "Insufficient documentation",
            ClauseCategory::AuthorizationRequirement => "Authorization requirement",
            ClauseCategory::NotDetected => "Not Detected",
            ClauseCategory::OtherUnclear => "Other / unclear",
        }
    }

    /// Exact wire label, compared case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How well the stated rejection reason is supported by the policy wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Strong,
    Partial,
    Weak,
    #[serde(rename = "Not Detected")]
    NotDetected,
}

impl Alignment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strong" => Some(Self::Strong),
            "partial" => Some(Self::Partial),
            "weak" => Some(Self::Weak),
            "not detected" => Some(Self::NotDetected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Partial => "Partial",
            Self::Weak => "Weak",
            Self::NotDetected => "Not Detected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionNature {
    Procedural,
    Substantive,
    Mixed,
    #[serde(rename = "Not Detected")]
    NotDetected,
}

impl RejectionNature {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "procedural" => Some(Self::Procedural),
            "substantive" => Some(Self::Substantive),
            "mixed" => Some(Self::Mixed),
            "not detected" => Some(Self::NotDetected),
            _ => None,
        }
    }
}

/// Which path produced a clause match. Internal to calibration and logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchOrigin {
    Rule,
    #[default]
    Generator,
    Fallback,
}

/// Invariant: `clause_detected == "Unclear"` never carries `Alignment::Strong`. The
/// constructors and [`ClauseMatchResult::weakened`] keep it; the report builder guards
/// it again before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseMatchResult {
    pub clause_category: ClauseCategory,
    pub clause_detected: String,
    pub clause_clarity: Level,
    pub rejection_alignment: Alignment,
    pub explanation: String,
    pub confidence: Level,
    #[serde(skip)]
    pub origin: MatchOrigin,
}

pub const UNCLEAR_CLAUSE: &str = "Unclear";
pub const ORIGINAL_ASSESSMENT: &str = "Original assessment:";

impl ClauseMatchResult {
    /// Keyword fast-path result for a classified rejection.
    pub fn from_rule(category: ClauseCategory) -> Self {
        Self {
            clause_category: category,
            clause_detected: "Detected via rule-based keyword match".to_string(),
            clause_clarity: Level::Medium,
            rejection_alignment: Alignment::Partial,
            explanation: format!(
                "Rejection wording matches the standard '{category}' policy category."
            ),
            confidence: Level::Medium,
            origin: MatchOrigin::Rule,
        }
    }

    pub fn fallback() -> Self {
        Self {
            clause_category: ClauseCategory::OtherUnclear,
            clause_detected: UNCLEAR_CLAUSE.to_string(),
            clause_clarity: Level::Low,
            rejection_alignment: Alignment::Partial,
            explanation: "Unable to confidently interpret rejection clause.".to_string(),
            confidence: Level::Low,
            origin: MatchOrigin::Fallback,
        }
    }

    /// Copy weakened by contrary evidence; the prior explanation is kept after `note`.
    pub fn weakened(&self, note: &str) -> Self {
        Self {
            rejection_alignment: Alignment::Weak,
            confidence: Level::Medium,
            explanation: format!("{note} {ORIGINAL_ASSESSMENT} {}", self.explanation),
            ..self.clone()
        }
    }

    /// True once contrary evidence has weakened this match.
    pub fn is_weakened(&self) -> bool {
        self.rejection_alignment == Alignment::Weak
            && self
                .explanation
                .to_lowercase()
                .contains(&ORIGINAL_ASSESSMENT.to_lowercase())
    }

    pub fn is_unclear(&self) -> bool {
        self.clause_detected.trim().eq_ignore_ascii_case(UNCLEAR_CLAUSE)
    }

    pub fn with_confidence(&self, confidence: Level) -> Self {
        Self {
            confidence,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationAnalysisResult {
    pub missing_documents: Vec<String>,
    pub documentation_gap_severity: Level,
    pub rejection_nature: RejectionNature,
    pub medical_ambiguity_detected: bool,
    pub explanation: String,
    pub confidence: Level,
}

impl Default for DocumentationAnalysisResult {
    /// Neutral outcome used when analysis fails; never asserts a substantive rejection.
    fn default() -> Self {
        Self {
            missing_documents: Vec::new(),
            documentation_gap_severity: Level::Low,
            rejection_nature: RejectionNature::NotDetected,
            medical_ambiguity_detected: false,
            explanation: "Unable to confidently interpret documentation.".to_string(),
            confidence: Level::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealStrength {
    pub percentage: u8,
    pub label: Rating,
    pub reasoning: String,
}

/// Post-rejection audit report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    pub case_summary: String,
    pub why_rejected: String,
    pub policy_clause_detected: String,
    pub clause_alignment: Alignment,
    pub weak_points: Vec<String>,
    pub strong_points: Vec<String>,
    pub reapplication_steps: Vec<String>,
    pub reapplication_possible: bool,
    pub regulatory_considerations: String,
    pub appeal_strength: AppealStrength,
    pub confidence: Level,
    pub system_notice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRequest {
    pub policy_text: String,
    pub rejection_text: String,
    #[serde(default)]
    pub user_explanation: Option<String>,
    #[serde(default)]
    pub medical_documents_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_round_trip_their_wire_labels() {
        for category in ClauseCategory::ALL {
            let json = serde_json::to_value(category).expect("serializes");
            assert_eq!(json, category.as_str());
            assert_eq!(ClauseCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(
            ClauseCategory::parse("other / UNCLEAR"),
            Some(ClauseCategory::OtherUnclear)
        );
        assert_eq!(ClauseCategory::parse("Maternity"), None);
    }

    #[test]
    fn weakening_keeps_the_original_explanation() {
        let rule = ClauseMatchResult::from_rule(ClauseCategory::PreExistingDisease);
        let weakened = rule.weakened("Evidence disagrees.");
        assert_eq!(weakened.rejection_alignment, Alignment::Weak);
        assert_eq!(weakened.confidence, Level::Medium);
        assert!(weakened.explanation.starts_with("Evidence disagrees. Original assessment:"));
        assert!(weakened.explanation.contains(&rule.explanation));
        assert_eq!(rule.rejection_alignment, Alignment::Partial);
    }

    #[test]
    fn clause_match_wire_format_has_no_origin() {
        let json = serde_json::to_value(ClauseMatchResult::from_rule(
            ClauseCategory::WaitingPeriod,
        ))
        .expect("serializes");
        let object = json.as_object().expect("object");
        assert!(!object.contains_key("origin"));
        assert_eq!(object.len(), 6);
        assert_eq!(json["clause_category"], "Waiting period");
    }

    #[test]
    fn fallback_is_unclear_and_never_strong() {
        let fallback = ClauseMatchResult::fallback();
        assert!(fallback.is_unclear());
        assert_ne!(fallback.rejection_alignment, Alignment::Strong);
        assert_eq!(fallback.origin, MatchOrigin::Fallback);
    }

    #[test]
    fn request_accepts_missing_optional_fields() {
        let request: AuditRequest =
            serde_json::from_str(r#"{"policy_text": "p", "rejection_text": "r"}"#)
                .expect("parses");
        assert!(request.user_explanation.is_none());
        assert!(request.medical_documents_text.is_none());
    }

    #[test]
    fn report_enums_use_wire_strings() {
        assert_eq!(
            serde_json::to_value(Alignment::NotDetected).expect("serializes"),
            "Not Detected"
        );
        assert_eq!(
            serde_json::to_value(RejectionNature::NotDetected).expect("serializes"),
            "Not Detected"
        );
        assert_eq!(Alignment::parse("not detected"), Some(Alignment::NotDetected));
        assert_eq!(RejectionNature::parse("MIXED"), Some(RejectionNature::Mixed));
    }
}
