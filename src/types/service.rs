//! Upstream detection services.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A hosted detection endpoint the proxy can forward to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Audio deepfake detection.
    Audio,
    /// Text AI-authorship detection.
    Text,
    /// Source code AI-authorship detection.
    Code,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Audio, Service::Text, Service::Code];

    /// Lowercase name used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Service::Audio => "audio",
            Service::Text => "text",
            Service::Code => "code",
        }
    }

    /// Human-facing name used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Service::Audio => "Audio",
            Service::Text => "Text",
            Service::Code => "Code",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
