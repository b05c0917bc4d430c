use super::domain::{ClauseField, ClauseRiskAssessment, PolicyScoreBreakdown, RiskLevel};
use crate::config::ScoringConfig;
use crate::workflows::grading::{clamp_score, round_to, Rating};

/// Output of the per-clause scorer, before the structural adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyScore {
    pub breakdown: PolicyScoreBreakdown,
    pub red_flags: Vec<String>,
    pub positive_flags: Vec<String>,
}

pub fn rating_for(score: u8, config: &ScoringConfig) -> Rating {
    Rating::from_score(f32::from(score), config.rating.strong, config.rating.moderate)
}

pub fn risk_index(score: u8) -> f32 {
    round_to((100.0 - f32::from(score)) / 100.0, 2)
}

/// Pure policy scorer over the clause grades and the IRDAI compliance score.
pub fn compute_policy_score(
    clause_risk: &ClauseRiskAssessment,
    compliance_score: u8,
    config: &ScoringConfig,
) -> PolicyScore {
    let mut score = config.base_score;
    let mut red_flags = Vec::new();
    let mut positive_flags = Vec::new();

    for (field, level) in clause_risk.iter() {
        score += config.risk_weights.weight_for(level);
        if level == RiskLevel::High {
            red_flags.push(format!("{field} marked as High Risk."));
        }
    }

    for boost in &config.positive_boost {
        if clause_risk.get(boost.field) == RiskLevel::Low {
            score += boost.boost;
            positive_flags.push(format!("{} is favorable.", boost.field));
        }
    }

    if config.compliance_scale > 0.0 {
        let share = (f32::from(compliance_score) / config.compliance_scale).min(1.0);
        score += share * config.compliance_max_boost;
    }

    let high_share = clause_risk.count(RiskLevel::High) as f32 / ClauseField::ALL.len() as f32;
    if high_share >= config.systemic_high_risk_share {
        score -= config.systemic_penalty;
    }

    // Whole points only; fractional boosts are truncated.
    let adjusted = clamp_score(score).trunc() as u8;

    PolicyScore {
        breakdown: PolicyScoreBreakdown {
            base_score: config.base_score,
            adjusted_score: adjusted,
            rating: rating_for(adjusted, config),
            risk_index: risk_index(adjusted),
        },
        red_flags,
        positive_flags,
    }
}
