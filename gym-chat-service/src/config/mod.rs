use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

use crate::services::chatbot::DEFAULT_HISTORY_WINDOW;

/// Default bound on the Gemini call, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, Deserialize)]
pub struct GymChatConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub chat: ChatConfig,
    /// JSON file overriding the built-in gym reference data.
    pub gym_data_path: Option<PathBuf>,
    /// OTLP collector for span export; logs only when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Turns of history rendered into the prompt.
    pub history_window: usize,
    /// Cap on stored turns. `None` keeps every turn for the process lifetime.
    pub max_history: Option<usize>,
    /// Directory `/save_conversation` writes into.
    pub conversations_dir: PathBuf,
}

impl GymChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(GymChatConfig {
            common: common_config,
            google: GoogleConfig {
                api_key: Secret::new(get_env("GOOGLE_API_KEY", None, is_prod)?),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
                timeout_secs: parse_env(
                    "GEMINI_TIMEOUT_SECS",
                    get_env(
                        "GEMINI_TIMEOUT_SECS",
                        Some(&DEFAULT_TIMEOUT_SECS.to_string()),
                        is_prod,
                    )?,
                )?,
            },
            chat: ChatConfig {
                history_window: parse_env(
                    "CHAT_HISTORY_WINDOW",
                    get_env(
                        "CHAT_HISTORY_WINDOW",
                        Some(&DEFAULT_HISTORY_WINDOW.to_string()),
                        is_prod,
                    )?,
                )?,
                max_history: get_optional_env("CHAT_MAX_HISTORY")
                    .map(|v| parse_env("CHAT_MAX_HISTORY", v))
                    .transpose()?,
                conversations_dir: PathBuf::from(get_env(
                    "CONVERSATIONS_DIR",
                    Some("conversations"),
                    is_prod,
                )?),
            },
            gym_data_path: get_optional_env("GYM_DATA_PATH").map(PathBuf::from),
            otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Variables with no default in any environment; unset or blank means "off".
fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, value: String) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, value, e))
    })
}
