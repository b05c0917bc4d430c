use std::fmt;

use serde::{Deserialize, Serialize};

/// Three-step grade shared by clarity, confidence, documentation gap severity, and input
/// quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Case-insensitive parse of generator output; anything unrecognized is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" | "moderate" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label attached to a 0..=100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Strong,
    Moderate,
    Weak,
}

impl Rating {
    /// `strong_from` and `moderate_from` are inclusive lower bounds.
    pub fn from_score(score: f32, strong_from: u8, moderate_from: u8) -> Self {
        if score >= f32::from(strong_from) {
            Self::Strong
        } else if score >= f32::from(moderate_from) {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp to the 0..=100 score range; NaN collapses to 0.
pub fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

pub fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(Level::parse(" HIGH "), Some(Level::High));
        assert_eq!(Level::parse("moderate"), Some(Level::Medium));
        assert_eq!(Level::parse("unsure"), None);
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert_eq!(Rating::from_score(80.0, 80, 55), Rating::Strong);
        assert_eq!(Rating::from_score(79.9, 80, 55), Rating::Moderate);
        assert_eq!(Rating::from_score(55.0, 80, 55), Rating::Moderate);
        assert_eq!(Rating::from_score(54.0, 80, 55), Rating::Weak);
    }

    #[test]
    fn clamp_is_idempotent() {
        for raw in [-40.0, 0.0, 42.5, 100.0, 180.0, f32::NAN] {
            let once = clamp_score(raw);
            assert_eq!(clamp_score(once), once);
            assert!((0.0..=100.0).contains(&once));
        }
    }
}
