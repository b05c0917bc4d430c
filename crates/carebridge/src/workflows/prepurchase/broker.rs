use super::compliance::SIGNAL_COUNT;
use super::domain::{
    BrokerRiskAnalysis, ClauseField, ClauseRiskAssessment, RiskLevel, StructuralRisk,
};
use crate::config::{BrokerThresholds, ScoringConfig};
use crate::workflows::grading::round_to;

fn recommendation(level: StructuralRisk, high_risk_count: usize, total: usize) -> String {
    match level {
        StructuralRisk::High => format!(
            "Policy shows concentrated financial risk and low regulatory transparency. \
             {high_risk_count} out of {total} clauses are High Risk. \
             Seek written clarifications from insurer before purchase. \
             Consider comparing alternatives."
        ),
        StructuralRisk::Elevated => "Policy has moderate-to-high financial risk concentration. \
             Clarify key clauses with your broker before purchase. \
             Pay special attention to exclusions and sublimits."
            .to_string(),
        StructuralRisk::Moderate => "Policy has some risk areas but no systemic imbalance. \
             Review flagged clauses and confirm with insurer."
            .to_string(),
        StructuralRisk::Balanced => "No major structural imbalance detected. \
             Standard due diligence recommended before purchase."
            .to_string(),
        StructuralRisk::InsufficientData => {
            "Too many clauses could not be detected in the provided policy text. \
             Upload a more complete version of the policy wording for accurate assessment."
                .to_string()
        }
    }
}

fn structural_level(
    density: f32,
    transparency: u8,
    thresholds: &BrokerThresholds,
) -> StructuralRisk {
    if density >= thresholds.high_density && transparency < thresholds.high_transparency_below {
        StructuralRisk::High
    } else if density >= thresholds.high_density
        || (density >= thresholds.elevated_density
            && transparency < thresholds.elevated_transparency_below)
    {
        StructuralRisk::Elevated
    } else if density >= thresholds.moderate_density {
        StructuralRisk::Moderate
    } else {
        StructuralRisk::Balanced
    }
}

/// Aggregate risk signal over the distribution of clause grades plus transparency.
pub fn analyze_broker_risk(
    clause_risk: &ClauseRiskAssessment,
    compliance_score: u8,
    config: &ScoringConfig,
) -> BrokerRiskAnalysis {
    let total = ClauseField::ALL.len();
    let weighted: f32 = clause_risk.iter().map(|(_, level)| level.density_weight()).sum();
    let density = round_to(weighted / total as f32, 2);

    let scale = if config.compliance_scale > 0.0 {
        config.compliance_scale
    } else {
        f32::from(SIGNAL_COUNT)
    };
    let transparency = (f32::from(compliance_score) / scale * 100.0)
        .round()
        .clamp(0.0, 100.0) as u8;

    let high_risk_count = clause_risk.count(RiskLevel::High);
    let not_found_count = clause_risk.count(RiskLevel::NotFound);
    let data_sufficient = not_found_count <= total / 2;

    let level = if data_sufficient {
        structural_level(density, transparency, &config.broker)
    } else {
        StructuralRisk::InsufficientData
    };

    BrokerRiskAnalysis {
        risk_density_index: density,
        transparency_score: transparency,
        structural_risk_level: level,
        recommendation: recommendation(level, high_risk_count, total),
        high_risk_count,
        not_found_count,
        data_sufficient,
    }
}

/// Second-stage adjustment the orchestrator applies on top of the per-clause score.
pub fn apply_structural_adjustment(
    score: u8,
    broker: &BrokerRiskAnalysis,
    thresholds: &BrokerThresholds,
) -> u8 {
    let mut adjusted = i32::from(score);
    match broker.structural_risk_level {
        StructuralRisk::High => adjusted -= thresholds.structural_high_penalty,
        StructuralRisk::Elevated => adjusted -= thresholds.structural_elevated_penalty,
        _ => {}
    }
    if broker.transparency_score >= thresholds.transparency_bonus_from {
        adjusted += thresholds.transparency_bonus;
    }
    adjusted.clamp(0, 100) as u8
}
