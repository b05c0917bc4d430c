use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{
    Alignment, AppealStrength, ClauseMatchResult, DocumentationAnalysisResult, RejectionNature,
};
use crate::config::AppealWeights;
use crate::workflows::grading::{Level, Rating};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealFactor {
    ClauseAlignment,
    DocumentationGap,
    MedicalAmbiguity,
    RejectionNature,
    ConfidenceDampening,
}

/// One applied adjustment, kept so the reasoning can be audited line by line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealComponent {
    pub factor: AppealFactor,
    pub delta: i32,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealEvaluation {
    pub strength: AppealStrength,
    pub components: Vec<AppealComponent>,
}

fn component(factor: AppealFactor, delta: i32, notes: &str) -> AppealComponent {
    AppealComponent {
        factor,
        delta,
        notes: notes.to_string(),
    }
}

/// Integer division rounding ties to the even neighbour.
fn div_round_half_even(numerator: i32, denominator: i32) -> i32 {
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    match (remainder * 2).cmp(&denominator) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 == 0 => quotient,
        Ordering::Equal => quotient + 1,
    }
}

/// Pull `score` toward `neutral`, keeping `retention` of its distance.
fn dampen(score: i32, neutral: i32, retention: f32) -> i32 {
    let keep = (retention.clamp(0.0, 1.0) * 100.0).round() as i32;
    div_round_half_even(score * keep + neutral * (100 - keep), 100)
}

pub fn score_appeal(
    clause: &ClauseMatchResult,
    documentation: &DocumentationAnalysisResult,
    weights: &AppealWeights,
) -> AppealEvaluation {
    let mut components = Vec::new();

    components.push(match clause.rejection_alignment {
        Alignment::Strong => component(
            AppealFactor::ClauseAlignment,
            weights.alignment_strong,
            "Rejection strongly aligns with policy wording; insurer's position is well-grounded.",
        ),
        Alignment::Partial => component(
            AppealFactor::ClauseAlignment,
            weights.alignment_partial,
            "Rejection partially aligns with policy wording; some grounds for appeal exist.",
        ),
        Alignment::Weak => component(
            AppealFactor::ClauseAlignment,
            weights.alignment_weak,
            "Rejection weakly aligns with policy wording; potential misapplication of clause \
             detected.",
        ),
        Alignment::NotDetected => component(
            AppealFactor::ClauseAlignment,
            weights.alignment_not_detected,
            "No specific policy clause identified to justify rejection; insurer's position may \
             lack clear contractual basis.",
        ),
    });

    components.push(match documentation.documentation_gap_severity {
        Level::High => component(
            AppealFactor::DocumentationGap,
            weights.gap_high,
            "Significant documentation gaps identified; insurer may not have sufficient basis \
             for rejection.",
        ),
        Level::Medium => component(
            AppealFactor::DocumentationGap,
            weights.gap_medium,
            "Moderate documentation gaps; submitting additional records may strengthen appeal.",
        ),
        Level::Low => component(
            AppealFactor::DocumentationGap,
            weights.gap_low,
            "Documentation appears complete; appeal must focus on clause interpretation.",
        ),
    });

    if documentation.medical_ambiguity_detected {
        components.push(component(
            AppealFactor::MedicalAmbiguity,
            weights.medical_ambiguity,
            "Medical documentation contains ambiguous language; expert clarification could \
             support the appeal.",
        ));
    }

    components.push(match documentation.rejection_nature {
        RejectionNature::Procedural => component(
            AppealFactor::RejectionNature,
            weights.nature_procedural,
            "Rejection is procedural in nature; correcting submission errors may resolve the \
             claim.",
        ),
        RejectionNature::Substantive => component(
            AppealFactor::RejectionNature,
            weights.nature_substantive,
            "Rejection is substantive under policy terms; appeal requires strong \
             counter-evidence or clause reinterpretation.",
        ),
        RejectionNature::Mixed | RejectionNature::NotDetected => component(
            AppealFactor::RejectionNature,
            0,
            "Rejection nature could not be clearly determined.",
        ),
    });

    let raw: i32 = weights.neutral + components.iter().map(|c| c.delta).sum::<i32>();

    let clause_low = clause.confidence == Level::Low;
    let doc_low = documentation.confidence == Level::Low;
    let dampening = match (clause_low, doc_low) {
        (true, true) => Some((
            weights.both_low_retention,
            "Score moderated toward neutral; low confidence in both clause and documentation \
             analysis.",
        )),
        (true, false) | (false, true) => Some((
            weights.one_low_retention,
            "Score slightly moderated; low confidence in partial analysis.",
        )),
        (false, false) => None,
    };

    let mut score = raw;
    if let Some((retention, notes)) = dampening {
        score = dampen(raw, weights.neutral, retention);
        components.push(component(
            AppealFactor::ConfidenceDampening,
            score - raw,
            notes,
        ));
    }

    let percentage = score.clamp(0, 100) as u8;
    let label = Rating::from_score(
        f32::from(percentage),
        weights.strong_from,
        weights.moderate_from,
    );
    let reasoning = components
        .iter()
        .map(|c| c.notes.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    AppealEvaluation {
        strength: AppealStrength {
            percentage,
            label,
            reasoning,
        },
        components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::audit::domain::ClauseCategory;

    fn clause(alignment: Alignment, confidence: Level) -> ClauseMatchResult {
        ClauseMatchResult {
            rejection_alignment: alignment,
            confidence,
            ..ClauseMatchResult::from_rule(ClauseCategory::PolicyExclusion)
        }
    }

    fn documentation(
        gap: Level,
        nature: RejectionNature,
        ambiguity: bool,
        confidence: Level,
    ) -> DocumentationAnalysisResult {
        DocumentationAnalysisResult {
            documentation_gap_severity: gap,
            rejection_nature: nature,
            medical_ambiguity_detected: ambiguity,
            confidence,
            ..DocumentationAnalysisResult::default()
        }
    }

    #[test]
    fn strongest_appeal_case_clamps_to_100() {
        let result = score_appeal(
            &clause(Alignment::NotDetected, Level::High),
            &documentation(Level::High, RejectionNature::Procedural, true, Level::High),
            &AppealWeights::default(),
        );
        // 50 + 35 + 20 + 10 + 15 = 130
        assert_eq!(result.strength.percentage, 100);
        assert_eq!(result.strength.label, Rating::Strong);
        assert_eq!(result.components.len(), 4);
    }

    #[test]
    fn reasoning_is_plain_ascii_for_every_branch() {
        let weights = AppealWeights::default();
        for alignment in [
            Alignment::Strong,
            Alignment::Partial,
            Alignment::Weak,
            Alignment::NotDetected,
        ] {
            for (gap, nature) in [
                (Level::High, RejectionNature::Procedural),
                (Level::Medium, RejectionNature::Substantive),
                (Level::Low, RejectionNature::Mixed),
            ] {
                let result = score_appeal(
                    &clause(alignment, Level::Low),
                    &documentation(gap, nature, true, Level::Low),
                    &weights,
                );
                assert!(result.strength.reasoning.is_ascii(), "{}", result.strength.reasoning);
            }
        }
    }

    #[test]
    fn well_grounded_rejection_is_weak() {
        let result = score_appeal(
            &clause(Alignment::Strong, Level::High),
            &documentation(Level::Low, RejectionNature::Substantive, false, Level::High),
            &AppealWeights::default(),
        );
        // 50 - 25 - 5 - 12 = 8
        assert_eq!(result.strength.percentage, 8);
        assert_eq!(result.strength.label, Rating::Weak);
    }

    #[test]
    fn both_low_pulls_toward_neutral() {
        let result = score_appeal(
            &clause(Alignment::Partial, Level::Low),
            &documentation(Level::Low, RejectionNature::NotDetected, false, Level::Low),
            &AppealWeights::default(),
        );
        // 50 - 10 - 5 = 35 -> 35 * 0.6 + 20 = 41
        assert_eq!(result.strength.percentage, 41);
        assert_eq!(result.strength.label, Rating::Moderate);
        let last = result.components.last().expect("dampening component");
        assert_eq!(last.factor, AppealFactor::ConfidenceDampening);
        assert_eq!(last.delta, 6);
    }

    #[test]
    fn one_low_rounds_ties_to_even() {
        let result = score_appeal(
            &clause(Alignment::Partial, Level::Medium),
            &documentation(Level::Low, RejectionNature::Mixed, false, Level::Low),
            &AppealWeights::default(),
        );
        // 50 - 10 - 5 + 0 = 35 -> 35 * 0.85 + 7.5 = 37.25
        assert_eq!(result.strength.percentage, 37);

        assert_eq!(dampen(20, 50, 0.85), 24);
        assert_eq!(dampen(10, 50, 0.85), 16);
    }

    #[test]
    fn reasoning_has_one_sentence_per_applied_adjustment() {
        let result = score_appeal(
            &clause(Alignment::Weak, Level::Low),
            &documentation(Level::Medium, RejectionNature::Procedural, true, Level::High),
            &AppealWeights::default(),
        );
        for component in &result.components {
            assert!(result.strength.reasoning.contains(&component.notes));
        }
        assert_eq!(result.components.len(), 5);
        assert!(result
            .strength
            .reasoning
            .ends_with("Score slightly moderated; low confidence in partial analysis."));
    }

    #[test]
    fn undetermined_nature_contributes_zero_with_a_note() {
        let result = score_appeal(
            &clause(Alignment::Partial, Level::High),
            &documentation(Level::Low, RejectionNature::NotDetected, false, Level::High),
            &AppealWeights::default(),
        );
        let nature = result
            .components
            .iter()
            .find(|c| c.factor == AppealFactor::RejectionNature)
            .expect("nature component");
        assert_eq!(nature.delta, 0);
        assert_eq!(result.strength.percentage, 35);
    }
}
