//! Side-by-side comparison of two policies. Both pre-purchase runs are independent and
//! joined concurrently; the diff itself is a pure function over the two reports.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::workflows::grading::Rating;
use crate::workflows::prepurchase::{ClauseField, PrePurchaseEngine, PrePurchaseReport};

/// Score gap a recommendation needs; anything closer is a tie.
pub const DECISIVE_MARGIN: i32 = 3;
/// Transparency gap worth calling out.
pub const TRANSPARENCY_MARGIN: i32 = 5;
pub const MAX_KEY_DIFFERENCES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendedPolicy {
    A,
    B,
    Neither,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub policy_a_rating: Rating,
    pub policy_b_rating: Rating,
    pub policy_a_score: u8,
    pub policy_b_score: u8,
    pub recommended_policy: RecommendedPolicy,
    pub recommendation: String,
    pub summary: String,
    pub key_differences: Vec<String>,
    pub a_advantages: Vec<String>,
    pub b_advantages: Vec<String>,
    pub a_risks: Vec<String>,
    pub b_risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub policy_a_text: String,
    pub policy_b_text: String,
}

pub fn recommend(score_a: u8, score_b: u8) -> RecommendedPolicy {
    let diff = i32::from(score_a) - i32::from(score_b);
    if diff > DECISIVE_MARGIN {
        RecommendedPolicy::A
    } else if diff < -DECISIVE_MARGIN {
        RecommendedPolicy::B
    } else {
        RecommendedPolicy::Neither
    }
}

fn recommendation_text(recommended: RecommendedPolicy, score_a: u8, score_b: u8) -> String {
    match recommended {
        RecommendedPolicy::A => format!(
            "Policy A scores {score_a} vs Policy B's {score_b}. It shows lower structural risk \
             and better clause transparency. Review remaining differences before committing."
        ),
        RecommendedPolicy::B => format!(
            "Policy B scores {score_b} vs Policy A's {score_a}. It shows lower structural risk \
             and better clause transparency. Review remaining differences before committing."
        ),
        RecommendedPolicy::Neither => format!(
            "Both policies score similarly ({score_a} vs {score_b}). Decision should be based \
             on premium, insurer claim settlement ratio, and specific coverage needs rather \
             than structural score alone."
        ),
    }
}

/// Diff two finished pre-purchase reports.
pub fn compare_reports(a: &PrePurchaseReport, b: &PrePurchaseReport) -> ComparisonReport {
    let score_a = a.score_breakdown.adjusted_score;
    let score_b = b.score_breakdown.adjusted_score;
    let recommended = recommend(score_a, score_b);

    let mut key_differences = Vec::new();
    let mut a_advantages = Vec::new();
    let mut b_advantages = Vec::new();
    let mut a_risks = Vec::new();
    let mut b_risks = Vec::new();

    for field in ClauseField::ALL {
        let (val_a, val_b) = (a.clause_risk.get(field), b.clause_risk.get(field));
        if val_a == val_b {
            continue;
        }

        let label = field.label();
        let lower = label.to_lowercase();
        key_differences.push(format!("{label}: Policy A is {val_a}, Policy B is {val_b}"));

        if val_a.rank() > val_b.rank() {
            a_advantages.push(format!("Lower {lower} risk ({val_a} vs {val_b})"));
            b_risks.push(format!("Higher {lower} risk ({val_b} vs {val_a})"));
        } else {
            b_advantages.push(format!("Lower {lower} risk ({val_b} vs {val_a})"));
            a_risks.push(format!("Higher {lower} risk ({val_a} vs {val_b})"));
        }
    }

    let comp_a = a.irdai_compliance.compliance_score;
    let comp_b = b.irdai_compliance.compliance_score;
    if comp_a > comp_b {
        a_advantages.push(format!("Better IRDAI compliance ({comp_a}/7 vs {comp_b}/7)"));
        b_risks.push(format!("Lower IRDAI compliance score ({comp_b}/7)"));
    } else if comp_b > comp_a {
        b_advantages.push(format!("Better IRDAI compliance ({comp_b}/7 vs {comp_a}/7)"));
        a_risks.push(format!("Lower IRDAI compliance score ({comp_a}/7)"));
    }

    let trans_a = a.broker_risk_analysis.transparency_score;
    let trans_b = b.broker_risk_analysis.transparency_score;
    if i32::from(trans_a) > i32::from(trans_b) + TRANSPARENCY_MARGIN {
        a_advantages.push(format!("Higher transparency score ({trans_a}% vs {trans_b}%)"));
    } else if i32::from(trans_b) > i32::from(trans_a) + TRANSPARENCY_MARGIN {
        b_advantages.push(format!("Higher transparency score ({trans_b}% vs {trans_a}%)"));
    }

    key_differences.truncate(MAX_KEY_DIFFERENCES);

    ComparisonReport {
        policy_a_rating: a.overall_policy_rating,
        policy_b_rating: b.overall_policy_rating,
        policy_a_score: score_a,
        policy_b_score: score_b,
        recommended_policy: recommended,
        recommendation: recommendation_text(recommended, score_a, score_b),
        summary: format!(
            "Policy A: {} ({score_a}/100) · Policy B: {} ({score_b}/100)",
            a.overall_policy_rating, b.overall_policy_rating
        ),
        key_differences,
        a_advantages,
        b_advantages,
        a_risks,
        b_risks,
    }
}

/// Runs two pre-purchase pipelines side by side and diffs the results.
#[derive(Clone)]
pub struct PolicyComparisonEngine {
    engine: PrePurchaseEngine,
}

impl PolicyComparisonEngine {
    pub fn new(engine: PrePurchaseEngine) -> Self {
        Self { engine }
    }

    pub async fn compare(&self, policy_a_text: &str, policy_b_text: &str) -> ComparisonReport {
        let (report_a, report_b) = tokio::join!(
            self.engine.run(policy_a_text),
            self.engine.run(policy_b_text)
        );
        let report = compare_reports(&report_a, &report_b);
        info!(
            score_a = report.policy_a_score,
            score_b = report.policy_b_score,
            recommended = ?report.recommended_policy,
            differences = report.key_differences.len(),
            "policy comparison built"
        );
        report
    }
}
