use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub gemini: GeminiApiConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Gemini model used for chat replies (e.g., gemini-1.5-flash)
    pub chat_model: String,
}

#[derive(Debug, Clone)]
pub struct GeminiApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means any origin is allowed.
    pub allowed_origins: Vec<String>,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let api_key = get_env("GOOGLE_API_KEY", None, is_prod)?;
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_API_KEY is set but empty"
            )));
        }

        let timeout_secs = get_env(
            "GEMINI_TIMEOUT_SECS",
            Some(&DEFAULT_GEMINI_TIMEOUT_SECS.to_string()),
            is_prod,
        )?;
        let timeout_secs: u64 = timeout_secs.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "GEMINI_TIMEOUT_SECS must be a whole number of seconds, got {:?}: {}",
                timeout_secs,
                e
            ))
        })?;

        Ok(RelayConfig {
            common: common_config,
            google: GoogleConfig {
                api_key: Secret::new(api_key),
            },
            models: ModelConfig {
                chat_model: get_env("CHAT_MODEL", Some(DEFAULT_CHAT_MODEL), is_prod)?,
            },
            gemini: GeminiApiConfig {
                base_url: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(timeout_secs),
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("*"),
                    is_prod,
                )?),
            },
        })
    }
}

/// Split a comma-separated origin list. `*` anywhere means "any origin".
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
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
