use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub blocking: BlockingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// aria2 `--rpc-secret`, sent as `token:<secret>`
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_min_download_speed")]
    pub min_download_speed: u64,
    #[serde(default = "default_score_ban")]
    pub score_ban: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockingConfig {
    #[serde(default = "default_ban_timeout")]
    pub ban_timeout: u64,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_ipset_name")]
    pub ipset_name: String,
    #[serde(default)]
    pub create_set: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub console: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            secret: None,
            timeout_secs: default_rpc_timeout(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_download_speed: default_min_download_speed(),
            score_ban: default_score_ban(),
        }
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            ban_timeout: default_ban_timeout(),
            dry_run: false,
            ipset_name: default_ipset_name(),
            create_set: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: false,
        }
    }
}

// Default value functions
fn default_endpoint() -> String {
    "http://127.0.0.1:6800/jsonrpc".to_string()
}

fn default_rpc_timeout() -> u64 {
    5
}

fn default_min_download_speed() -> u64 {
    50 * 1024 // 50 KiB/s
}

fn default_score_ban() -> f64 {
    6.0
}

fn default_ban_timeout() -> u64 {
    86400 // 24 hours
}

fn default_ipset_name() -> String {
    "xunlei_blacklist".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The token element prepended to every call's params, if a secret is set
    pub fn token(&self) -> Option<String> {
        match self.secret.as_deref() {
            None | Some("") => None,
            Some(secret) if secret.starts_with("token:") => Some(secret.to_string()),
            Some(secret) => Some(format!("token:{}", secret)),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.rpc.endpoint.is_empty() {
            bail!("rpc.endpoint must not be empty");
        }

        if !self.rpc.endpoint.starts_with("http://") && !self.rpc.endpoint.starts_with("https://") {
            bail!(
                "rpc.endpoint '{}' must be an http:// or https:// URL",
                self.rpc.endpoint
            );
        }

        if self.rpc.timeout_secs == 0 {
            bail!("rpc.timeout_secs must be greater than 0");
        }

        if !self.detection.score_ban.is_finite() {
            bail!("detection.score_ban must be a finite number");
        }

        if self.blocking.ban_timeout == 0 {
            bail!("blocking.ban_timeout must be greater than 0");
        }

        if self.blocking.ipset_name.is_empty() {
            bail!("blocking.ipset_name must not be empty");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}
