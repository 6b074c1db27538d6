//! Service credentials and how they travel.

use std::fmt;

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};

use crate::{GenrealError, Result};

/// Environment variable holding the token id.
pub const TOKEN_ID_VAR: &str = "TOKEN_ID";
/// Environment variable holding the token secret.
pub const TOKEN_SECRET_VAR: &str = "TOKEN_SECRET";

/// How an endpoint expects the token pair to be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialStyle {
    /// `Modal-Key` and `Modal-Secret` headers.
    #[default]
    ModalHeaders,
    /// `Authorization: Bearer <id>:<secret>`.
    Bearer,
}

/// Token pair for the hosted inference service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token_id: String,
    token_secret: String,
}

impl Credentials {
    /// Both values must be non-blank.
    pub fn new(token_id: impl Into<String>, token_secret: impl Into<String>) -> Result<Self> {
        let token_id = token_id.into();
        let token_secret = token_secret.into();
        if token_id.trim().is_empty() {
            return Err(GenrealError::Configuration(format!(
                "{TOKEN_ID_VAR} is empty"
            )));
        }
        if token_secret.trim().is_empty() {
            return Err(GenrealError::Configuration(format!(
                "{TOKEN_SECRET_VAR} is empty"
            )));
        }
        Ok(Self {
            token_id,
            token_secret,
        })
    }

    /// Read `TOKEN_ID` / `TOKEN_SECRET` from the process environment.
    pub fn from_env() -> Result<Self> {
        let token_id = std::env::var(TOKEN_ID_VAR).map_err(|_| {
            GenrealError::Configuration(format!("{TOKEN_ID_VAR} is not set"))
        })?;
        let token_secret = std::env::var(TOKEN_SECRET_VAR).map_err(|_| {
            GenrealError::Configuration(format!("{TOKEN_SECRET_VAR} is not set"))
        })?;
        Self::new(token_id, token_secret)
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// Attach the credentials to an outbound request.
    pub fn apply(&self, style: CredentialStyle, request: RequestBuilder) -> RequestBuilder {
        match style {
            CredentialStyle::ModalHeaders => request
                .header("Modal-Key", &self.token_id)
                .header("Modal-Secret", &self.token_secret),
            CredentialStyle::Bearer => request.header(
                "Authorization",
                format!("Bearer {}:{}", self.token_id, self.token_secret),
            ),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token_id", &self.token_id)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}
