//! Configuration loading for genreald.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.genreal/config.toml` (user)
//! 3. `/etc/genreal/config.toml` (system)
//! 4. built-in defaults
//!
//! Credentials come from the environment (`TOKEN_ID`, `TOKEN_SECRET`), falling
//! back to a secrets file with mandatory permission checks:
//! 1. `~/.genreal/secrets.toml` (user, must be 0600)
//! 2. `/etc/genreal/secrets.toml` (system, must be 0600)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Service;
use crate::upstream::credentials::{TOKEN_ID_VAR, TOKEN_SECRET_VAR};
use crate::upstream::{CredentialStyle, Credentials, Encoding, EndpointConfig, Endpoints};
use crate::{GenrealError, Result};

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5000).
    #[serde(default = "default_address")]
    pub address: String,
    /// Browser origins allowed to call the API.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Refuse to start without credentials (default: true). When false the
    /// daemon starts and every analysis endpoint answers 500.
    #[serde(default = "default_require_credentials")]
    pub require_credentials: bool,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            allowed_origins: default_allowed_origins(),
            require_credentials: default_require_credentials(),
            limits: LimitsConfig::default(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_require_credentials() -> bool {
    true
}

/// Request body limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum audio upload in MiB (default: 50).
    #[serde(default = "default_audio_upload_mb")]
    pub audio_upload_mb: usize,
    /// Maximum text/code request in MiB (default: 10).
    #[serde(default = "default_plagiarism_upload_mb")]
    pub plagiarism_upload_mb: usize,
}

impl LimitsConfig {
    pub fn audio_upload_bytes(&self) -> usize {
        self.audio_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn plagiarism_upload_bytes(&self) -> usize {
        self.plagiarism_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            audio_upload_mb: default_audio_upload_mb(),
            plagiarism_upload_mb: default_plagiarism_upload_mb(),
        }
    }
}

fn default_audio_upload_mb() -> usize {
    50
}

fn default_plagiarism_upload_mb() -> usize {
    10
}

/// Per-detector overrides. Unset fields keep the detector's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub audio: Option<EndpointOverride>,
    #[serde(default)]
    pub text: Option<EndpointOverride>,
    #[serde(default)]
    pub code: Option<EndpointOverride>,
}

/// Partial [`EndpointConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointOverride {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub encoding: Option<Encoding>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub auth: Option<CredentialStyle>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub default_content_type: Option<String>,
}

impl EndpointOverride {
    fn apply(&self, endpoint: &mut EndpointConfig) {
        if let Some(url) = &self.url {
            endpoint.url = url.clone();
        }
        if let Some(encoding) = self.encoding {
            endpoint.encoding = encoding;
        }
        if let Some(field) = &self.field {
            endpoint.field = field.clone();
        }
        if let Some(auth) = self.auth {
            endpoint.auth = auth;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            endpoint.timeout_secs = timeout_secs;
        }
        if let Some(content_type) = &self.default_content_type {
            endpoint.default_content_type = Some(content_type.clone());
        }
    }
}

impl UpstreamConfig {
    fn override_for(&self, service: Service) -> Option<&EndpointOverride> {
        match service {
            Service::Audio => self.audio.as_ref(),
            Service::Text => self.text.as_ref(),
            Service::Code => self.code.as_ref(),
        }
    }

    /// Resolve the full endpoint table.
    pub fn endpoints(&self) -> Endpoints {
        let mut endpoints = Endpoints::default();
        for service in Service::ALL {
            if let Some(over) = self.override_for(service) {
                over.apply(endpoints.get_mut(service));
            }
        }
        endpoints
    }
}

/// Credentials as stored in a secrets file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub token_secret: Option<String>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.genreal/config.toml`
    /// 3. `/etc/genreal/config.toml`
    /// 4. Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::info!("no config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GenrealError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            GenrealError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(GenrealError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".genreal").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/genreal/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

impl Secrets {
    /// Resolve credentials: the environment first, then the secrets files.
    ///
    /// The secrets files are only read when the environment lacks a value.
    pub fn resolve() -> Result<Credentials> {
        Self::resolve_with(|var| std::env::var(var).ok(), dirs::home_dir().as_deref())
    }

    /// [`Secrets::resolve`] with a custom environment lookup and home directory.
    pub fn resolve_with(
        env: impl Fn(&str) -> Option<String>,
        home: Option<&Path>,
    ) -> Result<Credentials> {
        if let Ok(credentials) = Secrets::default().credentials_with(&env) {
            return Ok(credentials);
        }
        Self::load_in(home)?.credentials_with(env)
    }

    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.genreal/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/genreal/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (the environment may still
    /// provide credentials).
    pub fn load() -> Result<Self> {
        Self::load_in(dirs::home_dir().as_deref())
    }

    fn load_in(home: Option<&Path>) -> Result<Self> {
        // Try user secrets first
        if let Some(home) = home {
            let user_secrets = home.join(".genreal").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        // Try system secrets
        let system_secrets = PathBuf::from("/etc/genreal/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GenrealError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            GenrealError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    pub fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            GenrealError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(GenrealError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Resolve credentials from the process environment, then this file.
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials_with(|var| std::env::var(var).ok())
    }

    /// Resolve credentials with a custom environment lookup.
    pub fn credentials_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        let lookup = |var: &str, from_file: &Option<String>| {
            env(var)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| from_file.clone())
                .ok_or_else(|| {
                    GenrealError::Configuration(format!("missing API credentials: {var} is not set"))
                })
        };
        let token_id = lookup(TOKEN_ID_VAR, &self.token_id)?;
        let token_secret = lookup(TOKEN_SECRET_VAR, &self.token_secret)?;
        Credentials::new(token_id, token_secret)
    }
}
