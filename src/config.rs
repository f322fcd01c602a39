//! Configuration loading and management.
//!
//! Loads configuration from `./retort.toml` (or `$RETORT_CONFIG_PATH`).
//! Environment variables override file values; file values override
//! defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

// ── Top-level config ────────────────────────────────────────────

/// Top-level Retort configuration loaded from TOML.
///
/// Path: `./retort.toml` or `$RETORT_CONFIG_PATH`.
/// Env vars override file values; file values override defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetortConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Rate-limit settings.
    pub limits: LimitsConfig,
    /// Generation backend settings.
    pub llm: LlmConfig,
    /// Search backend settings.
    pub search: SearchConfig,
}

impl RetortConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// `path_override` (from the CLI) wins over `$RETORT_CONFIG_PATH`.
    /// A missing file is not an error; defaults apply.
    pub fn load(path_override: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load_from_file(path_override)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from TOML file only, no env overrides.
    fn load_from_file(path_override: Option<PathBuf>) -> Result<Self> {
        let path = match path_override {
            Some(p) => p,
            None => Self::config_path_with(|key| std::env::var(key).ok()),
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: RetortConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(RetortConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(p) = env("RETORT_CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("retort.toml")
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids unsafe `set_var`
    /// in tests).
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        // Server.
        if let Some(v) = env("RETORT_BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(v) = env("RETORT_LOG_LEVEL") {
            self.server.log_level = v;
        }
        if let Some(v) = env("RETORT_LOGS_DIR") {
            self.server.logs_dir = v;
        }

        // Limits.
        if let Some(v) = env("RETORT_RATE_WINDOW_SECS") {
            match v.parse() {
                Ok(n) => self.limits.window_seconds = n,
                Err(_) => tracing::warn!(
                    var = "RETORT_RATE_WINDOW_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("RETORT_RATE_CAPACITY") {
            match v.parse() {
                Ok(n) => self.limits.max_requests = n,
                Err(_) => tracing::warn!(
                    var = "RETORT_RATE_CAPACITY",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }

        // Generation backend (env var presence supplies the credential).
        if let Some(key) = env("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(v) = env("RETORT_OPENAI_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = env("RETORT_OPENAI_BASE_URL") {
            self.llm.base_url = v;
        }

        // Search backend (optional; absence selects the suggestion fallback).
        if let Some(key) = env("SERPER_API_KEY") {
            self.search.api_key = Some(key);
        }
    }

    /// Parse a TOML string into config (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: RetortConfig =
            toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }
}

// ── Server config ───────────────────────────────────────────────

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: String,
    /// Tracing log level filter default.
    pub log_level: String,
    /// Directory for rotated JSON log files.
    pub logs_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8787".to_string(),
            log_level: "info".to_string(),
            logs_dir: "logs".to_string(),
        }
    }
}

// ── Limits config ───────────────────────────────────────────────

/// Fixed-window rate-limit settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Window length in seconds.
    pub window_seconds: u64,
    /// Requests admitted per key per window.
    pub max_requests: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            window_seconds: 60,
            max_requests: 12,
        }
    }
}

// ── LLM config ──────────────────────────────────────────────────

/// Generation backend settings.
///
/// A missing `api_key` does not prevent startup; requests then fail with a
/// 500 until the credential is supplied.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL.
    pub base_url: String,
    /// API key. Mandatory for serving requests, optional for startup.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "__REDACTED__"))
            .field("model", &self.model)
            .finish()
    }
}

// ── Search config ───────────────────────────────────────────────

/// Search backend settings. The key is optional: its absence silently
/// selects the backend-free suggestion fallback for advice sources.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Serper API key.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "__REDACTED__"))
            .finish()
    }
}

// ── Tests ───────────────────────────────────────────────────────
