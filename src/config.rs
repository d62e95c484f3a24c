//! Environment-driven configuration for both binaries
//!
//! Values come from the process environment (after `.env` is loaded by the
//! binaries). Parsing goes through a lookup closure so tests never touch the
//! real environment.

use crate::error::StewardError;
use crate::Result;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8081/api";
pub const DEFAULT_AGENT_URL: &str = "http://127.0.0.1:8000";

/// Settings for the JSON-file backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub port: u16,
    pub db_dir: PathBuf,
    pub api_prefix: String,
}

impl BackendConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_port(&lookup, 8081)?;
        let db_dir = lookup("DB_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("db"));
        let api_prefix = normalize_prefix(lookup("API_PREFIX").as_deref().unwrap_or("/api"));

        Ok(Self {
            port,
            db_dir,
            api_prefix,
        })
    }
}

/// Settings for the A2A agent server and its tools.
#[derive(Debug, Clone)]
pub struct AgentServerConfig {
    pub port: u16,
    pub agent_url: String,
    pub api_base_url: String,
    pub tool_timeout: Duration,
    pub model: String,
    pub gemini_api_key: String,
}

impl AgentServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_port(&lookup, 8000)?;

        let tool_timeout = match lookup("TOOL_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    StewardError::ConfigError(format!("TOOL_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(30),
        };

        Ok(Self {
            port,
            agent_url: non_empty(lookup("AGENT_URL"))
                .unwrap_or_else(|| DEFAULT_AGENT_URL.to_string()),
            api_base_url: non_empty(lookup("API_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            tool_timeout,
            model: non_empty(lookup("MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_key: non_empty(lookup("GEMINI_API_KEY"))
                .or_else(|| non_empty(lookup("GOOGLE_API_KEY")))
                .unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_port<F>(lookup: &F, default: u16) -> Result<u16>
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup("PORT")).or_else(|| non_empty(lookup("API_PORT"))) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| StewardError::ConfigError(format!("Invalid port: {}", raw))),
        None => Ok(default),
    }
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
