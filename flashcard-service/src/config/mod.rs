use crate::services::providers::openai::OpenAiConfig;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TEMPERATURE: &str = "0.7";
const DEFAULT_TIMEOUT_SECS: &str = "60";

#[derive(Debug, Clone)]
pub struct FlashcardConfig {
    pub common: core_config::Config,
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Read once at startup; a missing key only fails the first generation.
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl FlashcardConfig {
    pub fn load() -> Result<Self, AppError> {
        Ok(FlashcardConfig {
            common: core_config::Config::load()?,
            completion: CompletionConfig::from_lookup(|key| env::var(key).ok())?,
        })
    }
}

impl CompletionConfig {
    /// Build from a key lookup so tests need not mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(CompletionConfig {
            api_key: lookup("OPENAI_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .map(Secret::new),
            base_url: get_env(&lookup, "OPENAI_BASE_URL", DEFAULT_BASE_URL),
            model: get_env(&lookup, "FLASHCARD_MODEL", DEFAULT_MODEL),
            temperature: parse_env(&lookup, "FLASHCARD_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            timeout_secs: parse_env(&lookup, "FLASHCARD_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }

    pub fn provider_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn get_env<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(lookup, key, default);
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}
