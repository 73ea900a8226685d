//! Service configuration.
//!
//! Precedence (low to high): defaults, TOML file (`PORTFOLIO_CONFIG`, default
//! `config/portfolio.toml`, skipped when absent), `PORTFOLIO__*` environment,
//! then the bare `SECRET_KEY` / `OPENROUTER_API_KEY` variables.
//!
//! | Key | Default |
//! |-----|---------|
//! | host / port | 0.0.0.0 / 5000 |
//! | environment | development |
//! | secret_key | dev placeholder (rejected in production) |
//! | openrouter_url | OpenRouter chat completions endpoint |
//! | model | meta-llama/llama-3.3-70b-instruct:free |
//! | temperature / max_tokens | 0.7 / 500 |
//! | request_timeout_secs | 30 |
//! | max_turns | 10 |
//! | session_ttl_secs / session_sweep_secs | 7200 / 300 |
//! | failure_policy | retain |

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const INSECURE_SECRET_PLACEHOLDER: &str = "dev-secret-key-change-in-production";
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";
pub const DEFAULT_HTTP_REFERER: &str = "https://portfolio-chatbot.com";
pub const DEFAULT_APP_TITLE: &str = "Lathasri Portfolio Chatbot";

/// What happens to the user turn when the upstream call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep the user turn in history; it still occupies a slot.
    #[default]
    Retain,
    /// Retract the user turn so a failed call costs no history capacity.
    Rollback,
}

#[derive(Clone, Deserialize)]
pub struct ChatConfig {
    pub host: String,
    pub port: u16,
    /// "production" enables strict checks in `validate`.
    pub environment: String,
    pub secret_key: String,
    #[serde(default)]
    pub openrouter_api_key: String,
    pub openrouter_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub max_turns: usize,
    pub session_ttl_secs: u64,
    pub session_sweep_secs: u64,
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub portfolio_path: Option<PathBuf>,
    pub http_referer: String,
    pub app_title: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            environment: "development".into(),
            secret_key: INSECURE_SECRET_PLACEHOLDER.into(),
            openrouter_api_key: String::new(),
            openrouter_url: OPENROUTER_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: 0.7,
            max_tokens: 500,
            request_timeout_secs: 30,
            max_turns: crate::conversation::MAX_TURNS,
            session_ttl_secs: 7200,
            session_sweep_secs: 300,
            failure_policy: FailurePolicy::Retain,
            portfolio_path: None,
            http_referer: DEFAULT_HTTP_REFERER.into(),
            app_title: DEFAULT_APP_TITLE.into(),
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("secret_key", &"<redacted>")
            .field(
                "openrouter_api_key",
                &if self.openrouter_api_key.is_empty() { "<unset>" } else { "<redacted>" },
            )
            .field("openrouter_url", &self.openrouter_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_turns", &self.max_turns)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("session_sweep_secs", &self.session_sweep_secs)
            .field("failure_policy", &self.failure_policy)
            .field("portfolio_path", &self.portfolio_path)
            .finish()
    }
}

impl ChatConfig {
    /// Load from `PORTFOLIO_CONFIG` (or `config/portfolio.toml`) plus environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PORTFOLIO_CONFIG")
            .unwrap_or_else(|_| "config/portfolio.toml".to_string());
        Self::load_from(Some(Path::new(&path)))
    }

    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let d = Self::default();
        let builder = config::Config::builder()
            .set_default("host", d.host)?
            .set_default("port", d.port as i64)?
            .set_default("environment", d.environment)?
            .set_default("secret_key", d.secret_key)?
            .set_default("openrouter_api_key", d.openrouter_api_key)?
            .set_default("openrouter_url", d.openrouter_url)?
            .set_default("model", d.model)?
            .set_default("temperature", d.temperature as f64)?
            .set_default("max_tokens", d.max_tokens as i64)?
            .set_default("request_timeout_secs", d.request_timeout_secs as i64)?
            .set_default("max_turns", d.max_turns as i64)?
            .set_default("session_ttl_secs", d.session_ttl_secs as i64)?
            .set_default("session_sweep_secs", d.session_sweep_secs as i64)?
            .set_default("failure_policy", "retain")?
            .set_default("http_referer", d.http_referer)?
            .set_default("app_title", d.app_title)?;

        let builder = match file {
            Some(p) if p.exists() => builder.add_source(config::File::from(p)),
            _ => builder,
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("PORTFOLIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("secret_key", env_opt("SECRET_KEY"))?
            .set_override_option("openrouter_api_key", env_opt("OPENROUTER_API_KEY"))?
            .build()?;

        let cfg: ChatConfig = built.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn is_production(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case("production")
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.secret_key == INSECURE_SECRET_PLACEHOLDER
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let weak_secret = self.uses_placeholder_secret() || self.secret_key.trim().is_empty();
        if self.is_production() && weak_secret {
            return Err(ConfigError::Invalid(
                "SECRET_KEY must be set to a real secret in production".into(),
            ));
        }
        if self.max_turns == 0 {
            return Err(ConfigError::Invalid("max_turns must be at least 1".into()));
        }
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::Invalid("session_ttl_secs must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} outside 0.0..=2.0",
                self.temperature
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_secs.max(1))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
