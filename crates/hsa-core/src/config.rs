//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. `hsa-gateway.toml` in the working directory
//! 3. Defaults
//!
//! `${VAR_NAME}` inside the TOML file is replaced with the environment value.
//! The Gemini API key is optional at load time; its absence is reported per
//! request by the chat service.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Error;

/// Default config file name looked up by [`Config::load`]
pub const CONFIG_FILE: &str = "hsa-gateway.toml";

/// Gemini backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (`GEMINI_API_KEY`)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative language API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. `None` leaves the transport default
    /// in place (no client-side limit).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl GeminiConfig {
    /// Returns the API key if one is set and non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served at `/`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Application name, used in startup logs
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
            app_name: default_app_name(),
        }
    }
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session is dropped. `None` keeps sessions
    /// for the lifetime of the process.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,

    /// How often the cleanup task runs when an idle timeout is set
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: None,
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

/// Main configuration for hsa-gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "./static".to_string()
}

fn default_app_name() -> String {
    "Home Security Assistant".to_string()
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

impl Config {
    /// Replace `${VAR_NAME}` occurrences using `lookup`.
    ///
    /// Unknown variables expand to an empty string.
    fn expand_vars(value: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Some(env_value) = lookup(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse TOML content, expanding `${VAR}` references first
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_vars(content, &|name: &str| std::env::var(name).ok());
        toml::from_str(&expanded).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load from a TOML file, then apply environment overrides
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// Load configuration from the default locations
    ///
    /// Uses `./hsa-gateway.toml` when present, otherwise environment only.
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            debug!("Loading configuration from {}", CONFIG_FILE);
            return Self::from_toml_file(CONFIG_FILE);
        }

        Ok(Self::from_env())
    }

    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name: &str| std::env::var(name).ok());
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production). Numeric values that fail to parse are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.is_empty()) {
            self.gemini.model = model;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL").filter(|u| !u.is_empty()) {
            self.gemini.base_url = url;
        }
        if let Some(secs) = parse_var(&lookup, "GEMINI_TIMEOUT_SECS") {
            self.gemini.timeout_secs = Some(secs);
        }

        if let Some(port) = parse_var(&lookup, "PORT") {
            self.server.port = port;
        }
        if let Some(dir) = lookup("STATIC_DIR").filter(|d| !d.is_empty()) {
            self.server.static_dir = dir;
        }
        if let Some(name) = lookup("APP_NAME").filter(|n| !n.is_empty()) {
            self.server.app_name = name;
        }

        if let Some(secs) = parse_var(&lookup, "SESSION_IDLE_TIMEOUT_SECS") {
            self.session.idle_timeout_secs = Some(secs);
        }
        if let Some(secs) = parse_var(&lookup, "SESSION_CLEANUP_INTERVAL_SECS") {
            self.session.cleanup_interval_secs = secs;
        }
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert!(config.gemini.api_key().is_none());
        assert!(config.session.idle_timeout_secs.is_none());
        assert!(config.gemini.timeout_secs.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("PORT", "8080"),
            ("SESSION_IDLE_TIMEOUT_SECS", "600"),
            ("GEMINI_TIMEOUT_SECS", "90"),
        ]));

        assert_eq!(config.gemini.api_key(), Some("secret"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.idle_timeout_secs, Some(600));
        assert_eq!(config.gemini.timeout_secs, Some(90));
    }

    #[test]
    fn test_invalid_port_keeps_default() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_empty_api_key_is_missing() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("GEMINI_API_KEY", "")]));
        assert!(config.gemini.api_key().is_none());
    }

    #[test]
    fn test_expand_vars() {
        let lookup = lookup_from(&[("KEY", "abc")]);
        assert_eq!(Config::expand_vars("key = \"${KEY}\"", &lookup), "key = \"abc\"");
        assert_eq!(Config::expand_vars("${MISSING}x", &lookup), "x");
        assert_eq!(Config::expand_vars("$5 total", &lookup), "$5 total");
    }

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str(
            r#"
            [gemini]
            model = "gemini-1.5-pro"

            [server]
            port = 4000

            [session]
            idle_timeout_secs = 3600
            "#,
        )
        .unwrap();

        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.static_dir, "./static");
        assert_eq!(config.session.idle_timeout_secs, Some(3600));
        assert_eq!(config.session.cleanup_interval_secs, 300);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = Config::from_toml_str("server = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
