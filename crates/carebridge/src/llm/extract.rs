//! Repair ladder for generator output.
//!
//! Strategies run in a fixed order and the first one that yields an object covering at
//! least one expected key wins:
//!
//! 1. direct parse of the trimmed text
//! 2. first `{...}` block (non-nested pattern, then greedy)
//! 3. truncation repair by appending closing quotes/braces
//! 4. per-key `key: value` salvage (risk maps only)
//!
//! None of the entry points fail; callers get either a value or an explicit "nothing
//! usable" outcome and decide on their own typed default.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::workflows::prepurchase::domain::RiskLevel;

/// Which rung of the ladder produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    DirectParse,
    EmbeddedBlock,
    TruncationRepair,
    FieldSalvage,
    Defaulted,
}

/// Parsed JSON object plus the strategy that recovered it.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredOutput {
    pub object: Map<String, Value>,
    pub strategy: ExtractionStrategy,
}

/// Risk values for every expected key; keys absent from the output are `Not Found`.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskExtraction {
    pub values: BTreeMap<String, RiskLevel>,
    pub strategy: ExtractionStrategy,
}

impl RiskExtraction {
    pub fn get(&self, key: &str) -> RiskLevel {
        self.values.get(key).copied().unwrap_or(RiskLevel::NotFound)
    }

    /// Number of keys that resolved to something other than `Not Found`.
    pub fn detected(&self) -> usize {
        self.values
            .values()
            .filter(|level| **level != RiskLevel::NotFound)
            .count()
    }
}

const CLOSING_SUFFIXES: [&str; 7] = ["}", "\"}", "\"}}", "}}", "\"]}", "]}", "\"]}}"];

type Strategy = fn(&str, &[&str]) -> Option<Map<String, Value>>;

const OBJECT_LADDER: [(ExtractionStrategy, Strategy); 3] = [
    (ExtractionStrategy::DirectParse, parse_direct),
    (ExtractionStrategy::EmbeddedBlock, parse_embedded_block),
    (ExtractionStrategy::TruncationRepair, repair_truncated),
];

/// Run the object rungs of the ladder. With an empty `expected_keys` any object counts.
pub fn extract_structured(raw: &str, expected_keys: &[&str]) -> Option<StructuredOutput> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    OBJECT_LADDER.iter().find_map(|(strategy, attempt)| {
        attempt(text, expected_keys).map(|object| StructuredOutput {
            object,
            strategy: *strategy,
        })
    })
}

/// Full ladder for risk maps, including field-level salvage. Always covers every key.
pub fn extract_risk_map(raw: &str, expected_keys: &[&str]) -> RiskExtraction {
    if let Some(output) = extract_structured(raw, expected_keys) {
        let values = expected_keys
            .iter()
            .map(|key| {
                let level = output
                    .object
                    .get(*key)
                    .and_then(Value::as_str)
                    .map(RiskLevel::normalize)
                    .unwrap_or(RiskLevel::NotFound);
                (key.to_string(), level)
            })
            .collect();
        return RiskExtraction {
            values,
            strategy: output.strategy,
        };
    }

    let mut salvaged = 0;
    let values = expected_keys
        .iter()
        .map(|key| {
            let level = match salvage_field(raw, key) {
                Some(value) => {
                    salvaged += 1;
                    RiskLevel::normalize(&value)
                }
                None => RiskLevel::NotFound,
            };
            (key.to_string(), level)
        })
        .collect();

    RiskExtraction {
        values,
        strategy: if salvaged > 0 {
            ExtractionStrategy::FieldSalvage
        } else {
            ExtractionStrategy::Defaulted
        },
    }
}

/// Typed read of one string field of a recovered object. Absent or `null` yields
/// `default`; a string goes through `parse`; any other JSON type is a schema violation.
pub fn string_field<T>(
    object: &Map<String, Value>,
    key: &str,
    default: T,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    match object.get(key) {
        None | Some(Value::Null) => Some(default),
        Some(Value::String(raw)) => parse(raw),
        Some(_) => None,
    }
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn covers_expected(object: &Map<String, Value>, expected_keys: &[&str]) -> bool {
    expected_keys.is_empty() || expected_keys.iter().any(|key| object.contains_key(*key))
}

fn parse_direct(text: &str, expected_keys: &[&str]) -> Option<Map<String, Value>> {
    parse_object(text).filter(|object| covers_expected(object, expected_keys))
}

fn narrow_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[^{}]*\}").expect("narrow block pattern is valid"))
}

fn greedy_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("greedy block pattern is valid"))
}

fn parse_embedded_block(text: &str, expected_keys: &[&str]) -> Option<Map<String, Value>> {
    [narrow_block(), greedy_block()].into_iter().find_map(|pattern| {
        pattern
            .find(text)
            .and_then(|block| parse_object(block.as_str()))
            .filter(|object| covers_expected(object, expected_keys))
    })
}

fn repair_truncated(text: &str, expected_keys: &[&str]) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let body = text[start..].trim_end().trim_end_matches(',');

    // Also try dropping a dangling half-written member after the last comma.
    let mut bodies = vec![body];
    if let Some(cut) = body.rfind(',') {
        bodies.push(body[..cut].trim_end());
    }

    bodies.into_iter().find_map(|body| {
        CLOSING_SUFFIXES.iter().find_map(|suffix| {
            parse_object(&format!("{body}{suffix}"))
                .filter(|object| covers_expected(object, expected_keys))
        })
    })
}

fn salvage_field(text: &str, key: &str) -> Option<String> {
    let pattern = format!(
        r#"(?i)"?{}"?\s*[:=]\s*(?:"([^"\n]*)"?|([A-Za-z][A-Za-z ]*))"#,
        regex::escape(key)
    );
    let pattern = Regex::new(&pattern).ok()?;
    let captures = pattern.captures(text)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}
