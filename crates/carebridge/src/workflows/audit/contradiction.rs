//! Evidence checks that weaken a clause match the medical or policy text contradicts.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{error, info};

use super::domain::{ClauseCategory, ClauseMatchResult};

const NOT_PRE_EXISTING: [&str; 8] = [
    r"no (prior|previous|past|antecedent) (history|diagnosis|illness|condition|record)",
    r"no (known|documented) (history|condition|disease)",
    r"(first|initial|new|acute|sudden) (onset|occurrence|episode|presentation|diagnosis)",
    r"(patient|claimant).{0,30}(denies|denied).{0,30}(history|prior|previous)",
    r"no evidence.{0,30}(before|prior to).{0,30}(policy|inception|commencement)",
    r"(not|never).{0,20}(diagnosed|treated|hospitalized).{0,30}(before|previously|prior)",
    r"de.?novo",
    r"(healthy|no illness).{0,30}(before|prior to).{0,20}policy",
];

const WAITING_SERVED: [&str; 7] = [
    r"(treatment|hospitali[sz]ation|admission).{0,40}after.{0,20}\d+.{0,10}(year|month)",
    r"waiting period.{0,30}(complete[d]?|elapsed|satisfied|over|expired)",
    r"policy.{0,30}(active|in force).{0,30}(more than|over|beyond|exceeding).{0,20}\d+",
    r"\d+\s*(year|yr)s?.{0,20}(policy|cover|inception)",
    r"(beyond|after|past|post).{0,20}waiting.{0,20}period",
    r"continuous.{0,20}cover.{0,30}\d+.{0,10}year",
    r"(inception|commencement).{0,40}\d+\s*(year|yr)",
];

const WAITING_COMPLETED_PHRASES: [&str; 2] = ["after 2 years", "after policy completion"];

fn compile(label: &str, patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(error) => {
                error!(family = label, %error, "skipping invalid evidence pattern");
                None
            }
        })
        .collect()
}

fn not_pre_existing() -> &'static [Regex] {
    static FAMILY: OnceLock<Vec<Regex>> = OnceLock::new();
    FAMILY.get_or_init(|| compile("not_pre_existing", &NOT_PRE_EXISTING))
}

fn waiting_served() -> &'static [Regex] {
    static FAMILY: OnceLock<Vec<Regex>> = OnceLock::new();
    FAMILY.get_or_init(|| compile("waiting_served", &WAITING_SERVED))
}

fn any_match(family: &[Regex], text: &str) -> bool {
    family.iter().any(|pattern| pattern.is_match(text))
}

/// Weaken pre-existing-disease or waiting-period matches that the supplied documents
/// contradict. Only runs when medical text is present.
pub fn apply_contradictions(
    result: &ClauseMatchResult,
    policy_text: &str,
    medical_text: &str,
) -> ClauseMatchResult {
    if medical_text.trim().is_empty() {
        return result.clone();
    }

    let medical = medical_text.to_lowercase();
    match result.clause_category {
        ClauseCategory::PreExistingDisease if any_match(not_pre_existing(), &medical) => {
            info!("medical evidence contradicts pre-existing disease rejection");
            result.weakened(
                "Medical documentation suggests the condition may not have been \
                 pre-existing before policy inception.",
            )
        }
        ClauseCategory::WaitingPeriod => {
            let combined = format!("{medical} {}", policy_text.to_lowercase());
            if any_match(waiting_served(), &combined) {
                info!("documents suggest the waiting period was already served");
                result.weakened(
                    "Medical or policy documentation suggests the waiting period may have \
                     already been satisfied at the time of the claim.",
                )
            } else {
                result.clone()
            }
        }
        _ => result.clone(),
    }
}

/// Narrow follow-up check for waiting-period rejections: the policy states a waiting
/// period and the medical notes place treatment after it.
pub fn apply_waiting_period_override(
    result: &ClauseMatchResult,
    policy_text: &str,
    medical_text: &str,
) -> ClauseMatchResult {
    if result.clause_category != ClauseCategory::WaitingPeriod || result.is_weakened() {
        return result.clone();
    }

    let policy = policy_text.to_lowercase();
    let medical = medical_text.to_lowercase();
    let completed = WAITING_COMPLETED_PHRASES
        .iter()
        .any(|phrase| medical.contains(phrase));

    if policy.contains("waiting period") && completed {
        info!("medical notes place treatment after the waiting period");
        result.weakened("Medical documentation suggests waiting period may have been completed.")
    } else {
        result.clone()
    }
}
