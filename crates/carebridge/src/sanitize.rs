//! Caller input normalization and the input-quality gate signal.

use tracing::warn;

use crate::workflows::audit::domain::AuditRequest;
use crate::workflows::grading::Level;

pub const POLICY_LIMIT: usize = 6000;
pub const REJECTION_LIMIT: usize = 1500;
pub const MEDICAL_LIMIT: usize = 2000;
pub const USER_EXPLANATION_LIMIT: usize = 500;

/// Audit inputs after cleaning, plus the quality grade that drives the early gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedAudit {
    pub policy_text: String,
    pub rejection_text: String,
    pub medical_text: String,
    pub user_explanation: String,
    pub input_quality: Level,
}

/// Collapse all whitespace runs to one space, trim, and cut to `max_chars` characters.
pub fn clean(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, max_chars).to_string()
}

/// Longest prefix of at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

pub fn sanitize_audit(request: &AuditRequest) -> SanitizedAudit {
    let policy_text = clean(&request.policy_text, POLICY_LIMIT);
    let rejection_text = clean(&request.rejection_text, REJECTION_LIMIT);
    let medical_text = clean(
        request.medical_documents_text.as_deref().unwrap_or_default(),
        MEDICAL_LIMIT,
    );
    let user_explanation = clean(
        request.user_explanation.as_deref().unwrap_or_default(),
        USER_EXPLANATION_LIMIT,
    );

    let input_quality = grade_input(&policy_text, &rejection_text);

    SanitizedAudit {
        policy_text,
        rejection_text,
        medical_text,
        user_explanation,
        input_quality,
    }
}

pub fn sanitize_policy(policy_text: &str) -> String {
    clean(policy_text, POLICY_LIMIT)
}

fn grade_input(policy_text: &str, rejection_text: &str) -> Level {
    let policy_chars = policy_text.chars().count();
    let rejection_chars = rejection_text.chars().count();

    if rejection_chars == 0 {
        warn!("input quality low: rejection text is empty");
        Level::Low
    } else if policy_chars < 50 {
        warn!(policy_chars, "input quality low: policy text too short");
        Level::Low
    } else if policy_chars < 200 || rejection_chars < 30 {
        warn!(policy_chars, rejection_chars, "input quality medium");
        Level::Medium
    } else {
        Level::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(policy: &str, rejection: &str) -> AuditRequest {
        AuditRequest {
            policy_text: policy.to_string(),
            rejection_text: rejection.to_string(),
            user_explanation: None,
            medical_documents_text: None,
        }
    }

    #[test]
    fn collapses_whitespace_and_truncates() {
        assert_eq!(clean("  a \n\t b   c ", 10), "a b c");
        assert_eq!(clean("abcdef", 3), "abc");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn empty_rejection_is_low_quality() {
        let sanitized = sanitize_audit(&request(&"policy ".repeat(100), "   "));
        assert_eq!(sanitized.input_quality, Level::Low);
        assert!(sanitized.rejection_text.is_empty());
    }

    #[test]
    fn short_policy_is_low_quality() {
        let sanitized = sanitize_audit(&request(
            "tiny policy",
            "Claim rejected due to waiting period clause.",
        ));
        assert_eq!(sanitized.input_quality, Level::Low);
    }

    #[test]
    fn medium_and_high_quality_bands() {
        let medium =
            sanitize_audit(&request(&"p".repeat(120), "Claim rejected due to waiting period."));
        assert_eq!(medium.input_quality, Level::Medium);

        let short_rejection = sanitize_audit(&request(&"p".repeat(400), "Rejected."));
        assert_eq!(short_rejection.input_quality, Level::Medium);

        let high = sanitize_audit(&request(&"p".repeat(400), "Claim rejected due to waiting period."));
        assert_eq!(high.input_quality, Level::High);
    }

    #[test]
    fn enforces_field_limits() {
        let mut req = request(&"x".repeat(POLICY_LIMIT + 50), &"y".repeat(REJECTION_LIMIT + 50));
        req.user_explanation = Some("z".repeat(USER_EXPLANATION_LIMIT * 2));
        let sanitized = sanitize_audit(&req);
        assert_eq!(sanitized.policy_text.len(), POLICY_LIMIT);
        assert_eq!(sanitized.rejection_text.len(), REJECTION_LIMIT);
        assert_eq!(sanitized.user_explanation.len(), USER_EXPLANATION_LIMIT);
        assert!(sanitized.medical_text.is_empty());
    }
}
