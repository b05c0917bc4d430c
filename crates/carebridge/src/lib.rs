//! Hybrid decision pipeline for insurance claim audits and pre-purchase policy screening.
//!
//! Every stage between raw text and the final report is a pure function over immutable
//! records, except the orchestrators in [`workflows`], which own timeouts, retries, and
//! logging around the two external capabilities ([`llm::Generator`] and
//! [`retrieval::RegulatoryRetriever`]).

pub mod config;
pub mod deadline;
pub mod error;
pub mod llm;
pub mod retrieval;
pub mod sanitize;
pub mod telemetry;
pub mod workflows;
