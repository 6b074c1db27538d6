//! Canonical detection result returned to the frontend.

use serde::{Deserialize, Serialize};

/// Outcome of a plagiarism/AI-authorship check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Synthetic: AI- or machine-generated.
    Plagiarized,
    /// Authentic: human-written.
    #[default]
    Original,
}

impl Verdict {
    pub fn from_synthetic(is_synthetic: bool) -> Self {
        if is_synthetic {
            Verdict::Plagiarized
        } else {
            Verdict::Original
        }
    }

    pub fn is_synthetic(self) -> bool {
        matches!(self, Verdict::Plagiarized)
    }
}

/// Per-class percentages. Each side is rounded independently, so the sum
/// may drift from 100 by one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probabilities {
    #[serde(rename = "Human")]
    pub human: u8,
    #[serde(rename = "AI")]
    pub ai: u8,
}

impl Probabilities {
    pub fn new(human: u8, ai: u8) -> Self {
        Self { human, ai }
    }

    /// Even split used when the upstream gave nothing usable.
    pub fn even() -> Self {
        Self::new(50, 50)
    }
}

/// Normalized `{prediction, confidence, probabilities}` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalResult {
    pub prediction: Verdict,
    /// Model's self-reported confidence in `prediction`, as a percentage.
    pub confidence: u8,
    pub probabilities: Probabilities,
}

impl CanonicalResult {
    /// The uninformative answer: original, 50% confidence, 50/50 split.
    pub fn neutral() -> Self {
        Self {
            prediction: Verdict::Original,
            confidence: 50,
            probabilities: Probabilities::even(),
        }
    }
}

impl Default for CanonicalResult {
    fn default() -> Self {
        Self::neutral()
    }
}
