use super::domain::{Alignment, ClauseMatchResult, DocumentationAnalysisResult, MatchOrigin};
use crate::workflows::grading::Level;

/// Merge the two analyzer confidences. Rules are checked in order and the first match
/// decides:
///
/// 1. both Low -> Low
/// 2. keyword fast path with High clarity -> High
/// 3. both High -> High
/// 4. weakened by contrary evidence -> Medium
/// 5. no clause detected -> Medium when the clause confidence is High, otherwise Low
/// 6. either Low -> Medium
/// 7. Medium
pub fn calibrate(
    clause: &ClauseMatchResult,
    documentation: &DocumentationAnalysisResult,
) -> Level {
    let clause_confidence = clause.confidence;
    let doc_confidence = documentation.confidence;

    if clause_confidence == Level::Low && doc_confidence == Level::Low {
        return Level::Low;
    }
    if clause.origin == MatchOrigin::Rule && clause.clause_clarity == Level::High {
        return Level::High;
    }
    if clause_confidence == Level::High && doc_confidence == Level::High {
        return Level::High;
    }
    if clause.is_weakened() {
        return Level::Medium;
    }
    if clause.rejection_alignment == Alignment::NotDetected {
        return if clause_confidence == Level::High {
            Level::Medium
        } else {
            Level::Low
        };
    }
    Level::Medium
}
