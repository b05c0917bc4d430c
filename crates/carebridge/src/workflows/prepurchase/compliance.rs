use std::collections::BTreeMap;

use super::domain::{ComplianceFlag, ComplianceRating, IrdaiCompliance};
use crate::config::ComplianceThresholds;

/// Key under which absent protections are listed in the flag map.
pub const VIOLATIONS_KEY: &str = "_violations";

struct Signal {
    key: &'static str,
    keywords: &'static [&'static str],
    violation: &'static str,
}

/// IRDAI consumer-protection markers, checked as case-insensitive substrings.
const SIGNALS: [Signal; 7] = [
    Signal {
        key: "grievance_redressal_mentioned",
        keywords: &["grievance"],
        violation: "No grievance redressal mechanism described.",
    },
    Signal {
        key: "ombudsman_mentioned",
        keywords: &["ombudsman"],
        violation: "Insurance Ombudsman escalation route not mentioned.",
    },
    Signal {
        key: "irdai_reference",
        keywords: &["irdai"],
        violation: "No reference to IRDAI regulation or registration.",
    },
    Signal {
        key: "free_look_period",
        keywords: &["free look", "free-look"],
        violation: "Free look cancellation period not disclosed.",
    },
    Signal {
        key: "portability_clause",
        keywords: &["portability"],
        violation: "Portability rights not disclosed.",
    },
    Signal {
        key: "claim_settlement_timeline",
        keywords: &["settlement", "claim processed within"],
        violation: "Claim settlement timeline not specified.",
    },
    Signal {
        key: "exclusion_transparency",
        keywords: &["exclusion"],
        violation: "Exclusions are not explicitly listed.",
    },
];

/// Maximum compliance score, one point per signal.
pub const SIGNAL_COUNT: u8 = SIGNALS.len() as u8;

pub fn evaluate_irdai_compliance(
    policy_text: &str,
    thresholds: &ComplianceThresholds,
) -> IrdaiCompliance {
    let text = policy_text.to_lowercase();

    let mut flags = BTreeMap::new();
    let mut violations = Vec::new();
    for signal in &SIGNALS {
        let present = signal.keywords.iter().any(|keyword| text.contains(keyword));
        if !present {
            violations.push(signal.violation.to_string());
        }
        flags.insert(signal.key.to_string(), ComplianceFlag::Present(present));
    }

    let score = SIGNAL_COUNT - violations.len() as u8;
    if !violations.is_empty() {
        flags.insert(VIOLATIONS_KEY.to_string(), ComplianceFlag::Violations(violations));
    }

    let rating = if score >= thresholds.high {
        ComplianceRating::High
    } else if score >= thresholds.moderate {
        ComplianceRating::Moderate
    } else {
        ComplianceRating::Low
    };

    IrdaiCompliance {
        compliance_flags: flags,
        compliance_score: score,
        compliance_rating: rating,
    }
}
