use serde::{Deserialize, Serialize};

use crate::workflows::prepurchase::domain::{ClauseField, RiskLevel};

/// Bumped whenever a weight or threshold below changes meaning.
pub const SCORING_CONFIG_VERSION: u32 = 3;

/// Declarative weight and threshold table shared by both scoring engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub version: u32,
    pub base_score: f32,
    pub risk_weights: RiskWeights,
    pub positive_boost: Vec<PositiveBoost>,
    pub compliance_scale: f32,
    pub compliance_max_boost: f32,
    /// Share of High Risk clauses at which the systemic penalty applies.
    pub systemic_high_risk_share: f32,
    pub systemic_penalty: f32,
    pub rating: RatingThresholds,
    pub broker: BrokerThresholds,
    pub compliance: ComplianceThresholds,
    pub appeal: AppealWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            version: SCORING_CONFIG_VERSION,
            base_score: 75.0,
            risk_weights: RiskWeights {
                high: -12.0,
                moderate: -5.0,
                low: 0.0,
                not_found: 0.0,
            },
            positive_boost: vec![
                PositiveBoost {
                    field: ClauseField::RestorationBenefit,
                    boost: 5.0,
                },
                PositiveBoost {
                    field: ClauseField::ExclusionsClarity,
                    boost: 3.0,
                },
                PositiveBoost {
                    field: ClauseField::ClaimProcedureComplexity,
                    boost: 3.0,
                },
            ],
            compliance_scale: 7.0,
            compliance_max_boost: 25.0,
            systemic_high_risk_share: 0.6,
            systemic_penalty: 10.0,
            rating: RatingThresholds {
                strong: 80,
                moderate: 55,
            },
            broker: BrokerThresholds {
                high_density: 0.6,
                high_transparency_below: 40,
                elevated_density: 0.4,
                elevated_transparency_below: 50,
                moderate_density: 0.2,
                structural_high_penalty: 10,
                structural_elevated_penalty: 5,
                transparency_bonus_from: 70,
                transparency_bonus: 5,
            },
            compliance: ComplianceThresholds {
                high: 6,
                moderate: 3,
            },
            appeal: AppealWeights::default(),
        }
    }
}

/// Score contribution per clause risk value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub high: f32,
    pub moderate: f32,
    pub low: f32,
    pub not_found: f32,
}

impl RiskWeights {
    pub fn weight_for(&self, level: RiskLevel) -> f32 {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::Low => self.low,
            RiskLevel::NotFound => self.not_found,
        }
    }
}

/// Bonus awarded when a consumer-friendly clause is rated Low Risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositiveBoost {
    pub field: ClauseField,
    pub boost: f32,
}

/// Lower bounds for the Strong and Moderate ratings; anything below is Weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingThresholds {
    pub strong: u8,
    pub moderate: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrokerThresholds {
    pub high_density: f32,
    pub high_transparency_below: u8,
    pub elevated_density: f32,
    pub elevated_transparency_below: u8,
    pub moderate_density: f32,
    pub structural_high_penalty: i32,
    pub structural_elevated_penalty: i32,
    pub transparency_bonus_from: u8,
    pub transparency_bonus: i32,
}

/// Minimum detected-signal counts for the High and Moderate compliance ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceThresholds {
    pub high: u8,
    pub moderate: u8,
}

/// Additive adjustments applied by the appeal-strength scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppealWeights {
    pub neutral: i32,
    pub alignment_strong: i32,
    pub alignment_partial: i32,
    pub alignment_weak: i32,
    pub alignment_not_detected: i32,
    pub gap_high: i32,
    pub gap_medium: i32,
    pub gap_low: i32,
    pub medical_ambiguity: i32,
    pub nature_procedural: i32,
    pub nature_substantive: i32,
    /// Weight kept on the raw score when both analyzers report Low confidence.
    pub both_low_retention: f32,
    /// Weight kept on the raw score when exactly one analyzer reports Low confidence.
    pub one_low_retention: f32,
    pub strong_from: u8,
    pub moderate_from: u8,
}

impl Default for AppealWeights {
    fn default() -> Self {
        Self {
            neutral: 50,
            alignment_strong: -25,
            alignment_partial: -10,
            alignment_weak: 25,
            alignment_not_detected: 35,
            gap_high: 20,
            gap_medium: 8,
            gap_low: -5,
            medical_ambiguity: 10,
            nature_procedural: 15,
            nature_substantive: -12,
            both_low_retention: 0.6,
            one_low_retention: 0.85,
            strong_from: 70,
            moderate_from: 40,
        }
    }
}
