//! Pre-purchase policy screening: clause risk grading, deterministic overrides, IRDAI
//! compliance, broker structural risk, and the policy score.

pub mod broker;
pub mod compliance;
pub mod domain;
mod engine;
pub mod features;
pub mod overrides;
pub mod scoring;

pub use domain::{
    BrokerRiskAnalysis, ClauseField, ClauseRiskAssessment, ComplianceRating, IrdaiCompliance,
    PolicyScoreBreakdown, PrePurchaseReport, PrePurchaseRequest, RiskLevel, StructuralRisk,
};
pub use engine::{detection_confidence, PrePurchaseEngine, SUMMARY};
