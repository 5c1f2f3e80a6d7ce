//! Client configuration: file discovery, TOML parsing, environment overrides.
//!
//! Checks these locations in precedence order:
//! 1. An explicit path (`--config`)
//! 2. `./.seodata.toml` (project-local)
//! 3. `~/.config/seodata.toml` (user-global)
//!
//! Environment variables (`SEODATA_BASE_URL`, `SEODATA_TIMEOUT_MS`) override
//! file values. A `.env` file in the working directory is loaded first.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credentials::{
    Credential, CredentialResolver, EnvCredential, StaticCredential, DEFAULT_TOKEN_ENV,
};
use crate::error::{ClientError, ClientResult};
use crate::orchestrator::{PollLimits, PollOptions};

const CONFIG_FILENAME: &str = ".seodata.toml";
const GLOBAL_CONFIG_DIR: &str = ".config";
const GLOBAL_CONFIG_FILENAME: &str = "seodata.toml";

pub const ENV_BASE_URL: &str = "SEODATA_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "SEODATA_TIMEOUT_MS";

/// Connection and authentication settings for the provider API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClientConfig {
    /// API root, joined with each operation's path.
    pub base_url: String,
    /// Header carrying the credential.
    pub auth_header: String,
    /// Scheme prefix of the header value (`<scheme> <token>`).
    pub auth_scheme: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    pub user_agent: String,
    /// Environment variable the default resolver reads.
    pub token_env: String,
    /// Static token. Takes precedence over `token_env` when set.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub polling: PollingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.seranking.com/v1".to_string(),
            auth_header: "Authorization".to_string(),
            auth_scheme: "Token".to_string(),
            timeout_ms: 30_000,
            user_agent: format!("seodata-client/{}", env!("CARGO_PKG_VERSION")),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            api_token: None,
            polling: PollingConfig::default(),
        }
    }
}

/// Defaults and hard bounds for task polling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_wait_ms: u64,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub min_wait_ms: u64,
    pub max_wait_limit_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            max_wait_ms: 300_000,
            min_interval_ms: 1_000,
            max_interval_ms: 30_000,
            min_wait_ms: 10_000,
            max_wait_limit_ms: 600_000,
        }
    }
}

impl PollingConfig {
    pub fn limits(&self) -> PollLimits {
        PollLimits {
            min_interval: Duration::from_millis(self.min_interval_ms),
            max_interval: Duration::from_millis(self.max_interval_ms),
            min_wait: Duration::from_millis(self.min_wait_ms),
            max_wait: Duration::from_millis(self.max_wait_limit_ms),
        }
    }

    /// Poll options from caller-supplied overrides, falling back to the
    /// configured defaults and clamped to the configured bounds.
    pub fn options(&self, interval_ms: Option<u64>, max_wait_ms: Option<u64>) -> PollOptions {
        PollOptions::clamped(
            Duration::from_millis(interval_ms.unwrap_or(self.interval_ms)),
            Duration::from_millis(max_wait_ms.unwrap_or(self.max_wait_ms)),
            &self.limits(),
        )
    }
}

impl ClientConfig {
    /// Load configuration from the first discovered file (or defaults),
    /// then apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> ClientResult<Self> {
        // Missing .env is the normal case.
        let _ = dotenvy::dotenv();

        let mut config = match explicit.map(Path::to_path_buf).or_else(find_config_file) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading client config");
                Self::from_file(&path)?
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config_error(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            ClientError::config_error(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    fn apply_env_overrides(&mut self) -> ClientResult<()> {
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var(ENV_TIMEOUT_MS) {
            self.timeout_ms = timeout.parse().map_err(|_| {
                ClientError::config_error(format!(
                    "{} must be an integer number of milliseconds, got '{}'",
                    ENV_TIMEOUT_MS, timeout
                ))
            })?;
        }
        Ok(())
    }

    /// Check invariants the executor relies on.
    pub fn validate(&self) -> ClientResult<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            ClientError::config_error(format!("invalid base-url '{}': {}", self.base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::config_error(format!(
                "base-url must be http or https, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::config_error("timeout-ms must be greater than 0"));
        }
        if self.auth_header.trim().is_empty() {
            return Err(ClientError::config_error("auth-header must not be empty"));
        }
        let p = &self.polling;
        if p.min_interval_ms == 0 || p.min_interval_ms > p.max_interval_ms {
            return Err(ClientError::config_error(
                "polling interval bounds must satisfy 0 < min-interval-ms <= max-interval-ms",
            ));
        }
        if p.min_wait_ms == 0 || p.min_wait_ms > p.max_wait_limit_ms {
            return Err(ClientError::config_error(
                "polling wait bounds must satisfy 0 < min-wait-ms <= max-wait-limit-ms",
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The process-default credential strategy for this configuration.
    pub fn credential_resolver(&self) -> Arc<dyn CredentialResolver> {
        match self.api_token.as_deref().and_then(Credential::parse) {
            Some(credential) => Arc::new(StaticCredential::new(credential)),
            None => Arc::new(EnvCredential::new(self.token_env.clone())),
        }
    }

    /// Full header value for a credential.
    pub fn authorization_value(&self, credential: &Credential) -> String {
        if self.auth_scheme.is_empty() {
            credential.expose().to_string()
        } else {
            format!("{} {}", self.auth_scheme, credential.expose())
        }
    }
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.is_file() {
        return Some(local);
    }

    if let Some(home) = dirs::home_dir() {
        let global = home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILENAME);
        if global.is_file() {
            return Some(global);
        }
    }

    None
}
