//! Deterministic policy facts pulled out with keyword and regex matches.
//!
//! Numeric features default to 0 when no literal value is found. 0 means "unknown", not
//! "no risk"; the override pass only acts on non-zero numbers. The room rent cap is kept
//! in tenths of a percent so fractional caps such as 0.5% survive.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureSet {
    pub has_waiting_period: bool,
    pub mentions_pre_existing: bool,
    pub room_rent_cap: bool,
    pub co_payment: bool,
    pub disease_caps: bool,
    pub consumables_exclusion: bool,
    pub restoration_benefit: bool,
    pub procedural_conditions: bool,
    pub free_look_period: bool,
    pub grievance_redressal: bool,
    pub ombudsman_reference: bool,
    pub irdai_reference: bool,
    pub waiting_period_years: u32,
    pub co_payment_percentage: u32,
    pub room_rent_tenths: u32,
}

struct FeaturePatterns {
    waiting_period: Regex,
    pre_existing: Regex,
    room_rent: Regex,
    co_payment: Regex,
    disease_caps: Regex,
    consumables_exclusion: Regex,
    restoration: Regex,
    procedural: Regex,
    free_look: Regex,
    grievance: Regex,
    ombudsman: Regex,
    irdai: Regex,
    waiting_duration_after: Regex,
    waiting_duration_before: Regex,
    co_pay_percent_before: Regex,
    co_pay_percent_after: Regex,
    room_rent_percent: Regex,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("feature pattern is valid")
}

fn patterns() -> &'static FeaturePatterns {
    static PATTERNS: OnceLock<FeaturePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| FeaturePatterns {
        waiting_period: compile(r"waiting[\s-]+period"),
        pre_existing: compile(r"pre[\s-]?existing"),
        room_rent: compile(r"room\s+rent"),
        co_payment: compile(r"co[\s-]?pay|cost[\s-]sharing"),
        disease_caps: compile(
            r"(disease|illness|ailment|treatment|procedure|surger(y|ies)|cataract)[^.]{0,40}(sub[\s-]?limit|\blimit(ed|s)?\b|\bcapped\b|maximum payable)|(sub[\s-]?limit|\blimit(ed|s)?\b|\bcapped\b|maximum payable)[^.]{0,40}(disease|illness|ailment|treatment|procedure|surger(y|ies)|cataract)",
        ),
        consumables_exclusion: compile(
            r"consumables?[^.]{0,40}(excluded|not (covered|payable))|excluded[^.]{0,30}consumables|non[\s-]medical (expenses|items)[^.]{0,30}excluded",
        ),
        restoration: compile(r"restor(e|ed|ation)|reinstat(e|ed|ement)|recharge of sum insured"),
        procedural: compile(
            r"intimat(e|ed|ion)[^.]{0,30}within|inform[^.]{0,30}within|pre[\s-]?authori[sz]ation|submit[^.]{0,40}within\s+\d+",
        ),
        free_look: compile(r"free[\s-]look"),
        grievance: compile(r"grievance"),
        ombudsman: compile(r"ombudsman"),
        irdai: compile(r"\birdai?\b"),
        waiting_duration_after: compile(
            r"waiting[\s-]+period[^.\d]{0,40}?(\d{1,3})\s*(years?|yrs?|months?)",
        ),
        waiting_duration_before: compile(
            r"(\d{1,3})\s*(years?|yrs?|months?)\s*(of\s+)?(initial\s+|specific\s+)?waiting[\s-]+period",
        ),
        co_pay_percent_before: compile(r"(\d{1,2})\s*(%|percent|per\s+cent)\s*(of\s+)?co[\s-]?pay"),
        co_pay_percent_after: compile(
            r"co[\s-]?pay(ment)?[^.%\d]{0,40}?(\d{1,2})\s*(%|percent|per\s+cent)",
        ),
        room_rent_percent: compile(
            r"room\s+rent[^.%\d]{0,60}?(\d{1,2}(?:\.\d+)?)\s*(%|percent|per\s+cent)",
        ),
    })
}

/// Extract presence flags and quantized numbers from raw policy text.
pub fn extract_features(policy_text: &str) -> FeatureSet {
    let p = patterns();
    FeatureSet {
        has_waiting_period: p.waiting_period.is_match(policy_text),
        mentions_pre_existing: p.pre_existing.is_match(policy_text),
        room_rent_cap: p.room_rent.is_match(policy_text),
        co_payment: p.co_payment.is_match(policy_text),
        disease_caps: p.disease_caps.is_match(policy_text),
        consumables_exclusion: p.consumables_exclusion.is_match(policy_text),
        restoration_benefit: p.restoration.is_match(policy_text),
        procedural_conditions: p.procedural.is_match(policy_text),
        free_look_period: p.free_look.is_match(policy_text),
        grievance_redressal: p.grievance.is_match(policy_text),
        ombudsman_reference: p.ombudsman.is_match(policy_text),
        irdai_reference: p.irdai.is_match(policy_text),
        waiting_period_years: waiting_period_years(policy_text),
        co_payment_percentage: largest_capture(
            policy_text,
            &[(&p.co_pay_percent_before, 1), (&p.co_pay_percent_after, 2)],
        ),
        room_rent_tenths: room_rent_tenths(policy_text),
    }
}

/// Longest waiting period stated anywhere, in whole years. Months round up.
fn waiting_period_years(text: &str) -> u32 {
    let p = patterns();
    [&p.waiting_duration_after, &p.waiting_duration_before]
        .into_iter()
        .flat_map(|pattern| pattern.captures_iter(text))
        .filter_map(|captures| {
            let amount: u32 = captures.get(1)?.as_str().parse().ok()?;
            let unit = captures.get(2)?.as_str().to_ascii_lowercase();
            Some(if unit.starts_with('m') {
                amount.div_ceil(12)
            } else {
                amount
            })
        })
        .max()
        .unwrap_or(0)
}

/// Tightest room rent cap stated, in tenths of a percent.
fn room_rent_tenths(text: &str) -> u32 {
    patterns()
        .room_rent_percent
        .captures_iter(text)
        .filter_map(|captures| captures.get(1)?.as_str().parse::<f64>().ok())
        .filter(|percent| *percent > 0.0)
        .map(|percent| ((percent * 10.0).round() as u32).max(1))
        .min()
        .unwrap_or(0)
}

fn largest_capture(text: &str, patterns: &[(&Regex, usize)]) -> u32 {
    patterns
        .iter()
        .flat_map(|(pattern, group)| {
            pattern
                .captures_iter(text)
                .filter_map(move |captures| captures.get(*group)?.as_str().parse::<u32>().ok())
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_months_to_years() {
        let features =
            extract_features("Subject to a waiting period of 36 months for listed illnesses.");
        assert!(features.has_waiting_period);
        assert_eq!(features.waiting_period_years, 3);

        let features = extract_features("A 24 month waiting period applies.");
        assert_eq!(features.waiting_period_years, 2);
    }

    #[test]
    fn takes_longest_waiting_period() {
        let text = "Waiting period of 2 years for cataract. Pre-existing diseases: 4 years waiting period.";
        assert_eq!(extract_features(text).waiting_period_years, 4);
    }

    #[test]
    fn reads_co_payment_in_either_order() {
        assert_eq!(extract_features("A 20% co-payment applies to all claims.").co_payment_percentage, 20);
        assert_eq!(extract_features("Co-payment of 10 percent for senior citizens.").co_payment_percentage, 10);
    }

    #[test]
    fn reads_room_rent_cap() {
        let features = extract_features("Room rent is limited to 1% of sum insured per day.");
        assert!(features.room_rent_cap);
        assert_eq!(features.room_rent_tenths, 10);
    }

    #[test]
    fn keeps_fractional_room_rent_caps() {
        let features = extract_features("Room rent is capped at 0.5% of the sum insured per day.");
        assert_eq!(features.room_rent_tenths, 5);
        assert_eq!(
            extract_features("Room rent up to 1.5 percent of sum insured.").room_rent_tenths,
            15
        );
    }

    #[test]
    fn caps_need_disease_or_treatment_context() {
        let features = extract_features("Room rent is limited to 2% of sum insured.");
        assert!(!features.disease_caps);

        let features = extract_features("Cataract treatment is capped at Rs 40,000 per eye.");
        assert!(features.disease_caps);
        let features = extract_features("A sub-limit of 50,000 applies to listed illnesses.");
        assert!(features.disease_caps);
    }

    #[test]
    fn presence_without_numbers_keeps_zero() {
        let features =
            extract_features("Co-pay applies as per schedule. Room rent as per actuals.");
        assert!(features.co_payment);
        assert_eq!(features.co_payment_percentage, 0);
        assert_eq!(features.room_rent_tenths, 0);
    }

    #[test]
    fn detects_consumer_protection_markers() {
        let features = extract_features(
            "Free look period of 15 days. Grievance cell contact. Insurance Ombudsman. Regulated by IRDAI.",
        );
        assert!(features.free_look_period);
        assert!(features.grievance_redressal);
        assert!(features.ombudsman_reference);
        assert!(features.irdai_reference);
    }

    #[test]
    fn detects_restoration_and_consumables() {
        let features = extract_features(
            "Sum insured is restored after exhaustion. Consumables are excluded from cover.",
        );
        assert!(features.restoration_benefit);
        assert!(features.consumables_exclusion);
    }
}
