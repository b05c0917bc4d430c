use super::domain::ClauseCategory;

/// Ordered keyword table. The first category with any matching keyword wins, so the
/// order is part of the contract: specific clause types come before the generic
/// documentation and exclusion buckets.
const CATEGORY_KEYWORDS: [(ClauseCategory, &[&str]); 7] = [
    (
        ClauseCategory::PreExistingDisease,
        &["pre-existing", "pre existing", "preexisting"],
    ),
    (ClauseCategory::WaitingPeriod, &["waiting period"]),
    (ClauseCategory::RoomRentLimit, &["room rent", "room limit"]),
    (ClauseCategory::CoPayment, &["co-pay", "copay", "co pay"]),
    (
        ClauseCategory::AuthorizationRequirement,
        &["authorization", "authorisation"],
    ),
    (
        ClauseCategory::InsufficientDocumentation,
        &["document", "insufficient"],
    ),
    (
        ClauseCategory::PolicyExclusion,
        &["cosmetic", "excluded", "exclusion", "not covered"],
    ),
];

/// Keyword classification of a rejection letter. `None` means the caller should ask the
/// generator.
pub fn classify_rejection(rejection_text: &str) -> Option<ClauseCategory> {
    let text = rejection_text.to_lowercase();
    if text.trim().is_empty() {
        return None;
    }

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(category, _)| *category)
}
