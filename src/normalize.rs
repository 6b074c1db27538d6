//! Reshaping of upstream classifier replies into [`CanonicalResult`].
//!
//! The hosted detectors have answered in several shapes over time:
//!
//! - `{"prediction": "AI", "confidence": 0.91, "probabilities": {"Human": .., "AI": ..}}`
//! - `{"prediction": 1, "confidence": 0.91}`
//! - `{"label": "MACHINE_GENERATED", "confidence": 0.91, "probabilities": {"HUMAN_GENERATED": .., "MACHINE_GENERATED": ..}}`
//! - `{"label": "HUMAN_GENERATED"}`
//!
//! Each known shape has a parser; parsers are tried in order and the first
//! match wins. A body no parser recognizes maps to
//! [`CanonicalResult::neutral`]. Normalization never fails.

use serde_json::{Map, Value};

use crate::telemetry;
use crate::types::{CanonicalResult, Probabilities, Verdict};

/// Confidence assumed for a bare label with no confidence attached.
pub const DEFAULT_LABEL_CONFIDENCE: f64 = 0.8;

/// String tokens meaning "synthetic". The integer `1` is the only numeric one.
const SYNTHETIC_NAMES: &[&str] = &["AI", "MACHINE_GENERATED"];
const SYNTHETIC_CODE: i64 = 1;

/// Known `(human, synthetic)` key pairs in a `probabilities` map, by priority.
const PROBABILITY_KEYS: &[(&str, &str)] = &[
    ("Human", "AI"),
    ("HUMAN_GENERATED", "MACHINE_GENERATED"),
    ("HUMAN_GENERATED", "AI_GENERATED"),
];

/// Which upstream shape a body was read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `prediction` token with a numeric `confidence`.
    Scored,
    /// `label` token (or a bare `prediction`), confidence optional.
    Labelled,
    /// Nothing usable; neutral fallback.
    Unrecognized,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Scored => "scored",
            Shape::Labelled => "labelled",
            Shape::Unrecognized => "unrecognized",
        }
    }
}

/// A prediction token as the upstream sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Name(&'a str),
    Code(i64),
}

impl<'a> Token<'a> {
    fn read(value: Option<&'a Value>) -> Option<Self> {
        match value? {
            Value::String(s) if !s.is_empty() => Some(Token::Name(s)),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Token::Code),
            _ => None,
        }
    }

    fn is_synthetic(self) -> bool {
        match self {
            Token::Name(name) => SYNTHETIC_NAMES.contains(&name),
            Token::Code(code) => code == SYNTHETIC_CODE,
        }
    }
}

/// Fields pulled out of a recognized body.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Reading {
    is_synthetic: bool,
    confidence: f64,
    /// `(human, synthetic)` straight from the upstream, when it sent a known pair.
    explicit: Option<(f64, f64)>,
}

type ShapeParser = fn(&Map<String, Value>) -> Option<Reading>;

const PARSERS: &[(Shape, ShapeParser)] = &[
    (Shape::Scored, parse_scored),
    (Shape::Labelled, parse_labelled),
];

fn parse_scored(body: &Map<String, Value>) -> Option<Reading> {
    let token = Token::read(body.get("prediction"))?;
    let confidence = body.get("confidence").and_then(Value::as_f64)?;
    Some(Reading {
        is_synthetic: token.is_synthetic(),
        confidence,
        explicit: explicit_pair(body),
    })
}

fn parse_labelled(body: &Map<String, Value>) -> Option<Reading> {
    let token = Token::read(body.get("label")).or_else(|| Token::read(body.get("prediction")))?;
    let confidence = body
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_LABEL_CONFIDENCE);
    Some(Reading {
        is_synthetic: token.is_synthetic(),
        confidence,
        explicit: explicit_pair(body),
    })
}

fn explicit_pair(body: &Map<String, Value>) -> Option<(f64, f64)> {
    let probabilities = body.get("probabilities")?.as_object()?;
    PROBABILITY_KEYS.iter().find_map(|(human, synthetic)| {
        let human = probabilities.get(*human)?.as_f64()?;
        let synthetic = probabilities.get(*synthetic)?.as_f64()?;
        Some((human, synthetic))
    })
}

/// Scale a `[0, 1]` fraction to a whole percentage. Out-of-range input is clamped.
fn percent(fraction: f64) -> u8 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

impl Reading {
    fn into_result(self) -> CanonicalResult {
        let confidence = percent(self.confidence);
        let probabilities = match self.explicit {
            Some((human, synthetic)) => Probabilities::new(percent(human), percent(synthetic)),
            None if self.is_synthetic => Probabilities::new(100 - confidence, confidence),
            None => Probabilities::new(confidence, 100 - confidence),
        };
        CanonicalResult {
            prediction: Verdict::from_synthetic(self.is_synthetic),
            confidence,
            probabilities,
        }
    }
}

/// Normalize an upstream body, also reporting which shape matched.
pub fn normalize_with_shape(body: &Value) -> (Shape, CanonicalResult) {
    let matched = body.as_object().and_then(|map| {
        PARSERS
            .iter()
            .find_map(|(shape, parse)| parse(map).map(|reading| (*shape, reading)))
    });

    let (shape, result) = match matched {
        Some((shape, reading)) => (shape, reading.into_result()),
        None => (Shape::Unrecognized, CanonicalResult::neutral()),
    };

    metrics::counter!(telemetry::NORMALIZED_TOTAL, "shape" => shape.as_str()).increment(1);
    (shape, result)
}

/// Normalize an upstream body into the canonical shape.
pub fn normalize(body: &Value) -> CanonicalResult {
    normalize_with_shape(body).1
}
