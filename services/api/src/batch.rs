//! One-off CLI runs: read documents from disk, run a pipeline, print the report.

use crate::infra::Pipelines;
use carebridge::config::AppConfig;
use carebridge::error::AppError;
use carebridge::workflows::audit::AuditRequest;
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// Policy wording as plain text
    #[arg(long)]
    pub(crate) policy: PathBuf,
    /// Rejection letter as plain text
    #[arg(long)]
    pub(crate) rejection: PathBuf,
    /// Optional medical records (discharge summary, prescriptions)
    #[arg(long)]
    pub(crate) medical: Option<PathBuf>,
    /// Optional free-text explanation from the policyholder
    #[arg(long)]
    pub(crate) explanation: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct PrePurchaseArgs {
    /// Policy brochure or wording as plain text
    #[arg(long)]
    pub(crate) policy: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    #[arg(long)]
    pub(crate) policy_a: PathBuf,
    #[arg(long)]
    pub(crate) policy_b: PathBuf,
}

pub(crate) async fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let request = AuditRequest {
        policy_text: read_text(&args.policy)?,
        rejection_text: read_text(&args.rejection)?,
        user_explanation: args.explanation,
        medical_documents_text: args.medical.as_deref().map(read_text).transpose()?,
    };

    let pipelines = Pipelines::from_config(&AppConfig::load()?);
    let report = pipelines.audit.run(&request).await;
    print_json(&report)
}

pub(crate) async fn run_prepurchase(args: PrePurchaseArgs) -> Result<(), AppError> {
    let policy_text = read_text(&args.policy)?;
    let pipelines = Pipelines::from_config(&AppConfig::load()?);
    let report = pipelines.prepurchase.run(&policy_text).await;
    print_json(&report)
}

pub(crate) async fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let policy_a = read_text(&args.policy_a)?;
    let policy_b = read_text(&args.policy_b)?;
    let pipelines = Pipelines::from_config(&AppConfig::load()?);
    let report = pipelines.comparison.compare(&policy_a, &policy_b).await;
    print_json(&report)
}

fn read_text(path: &Path) -> Result<String, AppError> {
    Ok(fs::read_to_string(path)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}
