//! Per-detector call descriptions.
//!
//! The detectors are a fixed external contract: each expects one payload
//! field, in one encoding, with credentials in one of two header styles.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::credentials::CredentialStyle;
use crate::types::Service;

pub const AUDIO_URL: &str = "https://binshilin63--deepfake-detector-deepfakeaudioapi-predict.modal.run";
pub const TEXT_URL: &str =
    "https://binshilin63--text-plagiarism-aihumantextdetectorapi-predict.modal.run";
pub const CODE_URL: &str =
    "https://binshilin63--code-deepfake-detector-deepfakecodeapi-predict.modal.run";

/// Body encoding expected by a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// `multipart/form-data`; files keep their name and MIME type.
    #[default]
    Multipart,
    /// `application/x-www-form-urlencoded`; text only.
    Urlencoded,
}

/// How to call one detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    pub encoding: Encoding,
    /// Form field carrying the payload.
    pub field: String,
    pub auth: CredentialStyle,
    pub timeout_secs: u64,
    /// MIME type sent for file parts when the client supplied none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_content_type: Option<String>,
}

impl EndpointConfig {
    /// Audio deepfake detector: multipart `file`, Modal headers, 60s.
    pub fn audio() -> Self {
        Self {
            url: AUDIO_URL.to_string(),
            encoding: Encoding::Multipart,
            field: "file".to_string(),
            auth: CredentialStyle::ModalHeaders,
            timeout_secs: 60,
            default_content_type: Some("audio/mpeg".to_string()),
        }
    }

    /// Text detector: urlencoded `text`, Modal headers, 5 minutes.
    pub fn text() -> Self {
        Self {
            url: TEXT_URL.to_string(),
            encoding: Encoding::Urlencoded,
            field: "text".to_string(),
            auth: CredentialStyle::ModalHeaders,
            timeout_secs: 300,
            default_content_type: None,
        }
    }

    /// Code detector: multipart `code`, bearer token, 5 minutes.
    pub fn code() -> Self {
        Self {
            url: CODE_URL.to_string(),
            encoding: Encoding::Multipart,
            field: "code".to_string(),
            auth: CredentialStyle::Bearer,
            timeout_secs: 300,
            default_content_type: None,
        }
    }

    pub fn for_service(service: Service) -> Self {
        match service {
            Service::Audio => Self::audio(),
            Service::Text => Self::text(),
            Service::Code => Self::code(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// One [`EndpointConfig`] per [`Service`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub audio: EndpointConfig,
    pub text: EndpointConfig,
    pub code: EndpointConfig,
}

impl Endpoints {
    pub fn get(&self, service: Service) -> &EndpointConfig {
        match service {
            Service::Audio => &self.audio,
            Service::Text => &self.text,
            Service::Code => &self.code,
        }
    }

    pub fn get_mut(&mut self, service: Service) -> &mut EndpointConfig {
        match service {
            Service::Audio => &mut self.audio,
            Service::Text => &mut self.text,
            Service::Code => &mut self.code,
        }
    }

    /// Point every endpoint at `base_url`, keeping a per-service path.
    /// Used to aim the client at a local mock.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let mut endpoints = Self::default();
        for service in Service::ALL {
            let endpoint = endpoints.get_mut(service);
            endpoint.url = format!("{base}/{}", service.as_str());
        }
        endpoints
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            audio: EndpointConfig::audio(),
            text: EndpointConfig::text(),
            code: EndpointConfig::code(),
        }
    }
}
