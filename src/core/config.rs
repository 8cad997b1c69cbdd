//! Configuration management for citytime
//!
//! Supports environment variables, a config file, and runtime overrides.
//!
//! Config file location: ~/.config/citytime/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::{CityTimeError, Result};

/// Environment variable holding the Gemini API key
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

const BASE_INSTRUCTION: &str = "You are a time assistant. Use the get_current_time tool. \
Always provide the full IANA timezone (e.g., Asia/Dubai, Europe/Paris, America/New_York).";

/// Main configuration for citytime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM backend configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Time source configuration
    #[serde(default)]
    pub time: TimeConfig,
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Gemini backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name passed to generateContent
    pub model: String,
    /// API root, without the `/v1beta` suffix
    pub base_url: String,
    /// API key; falls back to GEMINI_API_KEY when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// HTTP timeout for a single backend call
    pub timeout_secs: u64,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: env::var("CITYTIME_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
            timeout_secs: 60,
            temperature: None,
        }
    }
}

/// Where the current instant comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSource {
    /// System clock plus the bundled tz database
    Local,
    /// Remote time service over HTTP
    Remote,
}

impl fmt::Display for TimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSource::Local => write!(f, "local"),
            TimeSource::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for TimeSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(TimeSource::Local),
            "remote" => Ok(TimeSource::Remote),
            other => Err(format!("unknown time source '{}' (expected local or remote)", other)),
        }
    }
}

/// Time resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Which resolver to use
    pub source: TimeSource,
    /// Base URL of the remote time service
    pub remote_url: String,
    /// Timeout for the remote time service
    pub timeout_secs: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            source: env::var("CITYTIME_TIME_SOURCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(TimeSource::Local),
            remote_url: env::var("CITYTIME_TIME_URL")
                .unwrap_or_else(|_| "https://worldtimeapi.org".to_string()),
            timeout_secs: 10,
        }
    }
}

/// How the assistant should phrase its answer
///
/// A style only produces instruction text; the agent never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    /// Relay the tool's fact as-is
    Raw,
    /// Rephrase the fact as a friendly sentence
    Conversational,
}

impl ResponseStyle {
    /// System instruction for this style
    pub fn instruction(&self) -> String {
        match self {
            ResponseStyle::Raw => format!(
                "{} Reply with the tool result exactly as returned, without commentary.",
                BASE_INSTRUCTION
            ),
            ResponseStyle::Conversational => format!(
                "{} Answer in one or two friendly sentences. Never output raw JSON, \
                 braces or field names such as current_time or status.",
                BASE_INSTRUCTION
            ),
        }
    }
}

impl fmt::Display for ResponseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStyle::Raw => write!(f, "raw"),
            ResponseStyle::Conversational => write!(f, "conversational"),
        }
    }
}

impl FromStr for ResponseStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(ResponseStyle::Raw),
            "conversational" | "chat" => Ok(ResponseStyle::Conversational),
            other => Err(format!(
                "unknown response style '{}' (expected raw or conversational)",
                other
            )),
        }
    }
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// System instruction sent with every backend call
    pub system_instruction: String,
    /// Number of recent transcript turns included as context
    /// Default: 20
    pub context_window: usize,
    /// Maximum tool-call rounds per user turn
    /// Default: 5
    pub max_tool_rounds: usize,
    /// Whether to show debug output
    pub debug: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_instruction: ResponseStyle::Conversational.instruction(),
            context_window: 20,
            max_tool_rounds: 5,
            debug: env::var("CITYTIME_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("citytime")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::load_or_default(&Self::config_file())
    }

    /// Load `path`, falling back to defaults. A file that exists but cannot
    /// be used is reported at warn level.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) if path.exists() => {
                tracing::warn!(path = %path.display(), "ignoring config file: {}", e);
                Self::default()
            }
            Err(e) => {
                tracing::debug!("using default configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CityTimeError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CityTimeError::config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| CityTimeError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| CityTimeError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CityTimeError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| CityTimeError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Resolve the LLM credential from the config file or the environment
    pub fn api_key(&self) -> Result<String> {
        resolve_api_key(self.llm.api_key.as_deref(), env::var(API_KEY_VAR).ok())
    }

    /// Replace the system instruction with a style preset
    pub fn set_response_style(&mut self, style: ResponseStyle) {
        self.agent.system_instruction = style.instruction();
    }
}

/// Pick the first non-blank key, config file first
pub fn resolve_api_key(from_config: Option<&str>, from_env: Option<String>) -> Result<String> {
    from_config
        .map(str::to_string)
        .into_iter()
        .chain(from_env)
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
        .ok_or_else(|| {
            CityTimeError::missing_credential(format!(
                "Please add {} to your environment, a .env file, or llm.api_key in {}.",
                API_KEY_VAR,
                Config::config_file().display()
            ))
        })
}
