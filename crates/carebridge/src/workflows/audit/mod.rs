//! Post-rejection claim audit: keyword and generator clause matching, evidence
//! contradictions, documentation analysis, confidence calibration, appeal scoring, and
//! report assembly.

pub mod calibration;
pub mod classifier;
pub mod clause_matcher;
pub mod contradiction;
pub mod documentation;
pub mod domain;
mod engine;
pub mod report;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use domain::{
    Alignment, AppealStrength, AuditRequest, ClauseCategory, ClauseMatchResult,
    DocumentationAnalysisResult, FinalReport, MatchOrigin, RejectionNature,
};
pub use engine::PostRejectionEngine;
pub use scoring::{AppealComponent, AppealEvaluation, AppealFactor};
