use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::llm::DEFAULT_API_BASE;
use crate::retry::RetryConfig;

/// Everything the pipeline needs to know about its environment. Built once
/// and passed in; nothing in the library reads the environment on its own.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Model identifier sent to the completion endpoint; also selects the tokenizer.
    pub model: String,
    /// Token budget for each CSS chunk and for the HTML sent to the CTA lookup.
    pub max_tokens: usize,
    /// Sampling temperature for extraction queries.
    pub temperature: f32,
    /// Sampling temperature for writing-style rewrites.
    pub rewrite_temperature: f32,
    /// Upper bound on concurrent full-palette chunk queries.
    pub workers: usize,
    pub http_timeout: Duration,
    pub llm_timeout: Duration,
    pub retry: RetryConfig,
    pub api_base: String,
    pub api_key: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 3600,
            temperature: 0.1,
            rewrite_temperature: 0.7,
            workers: 4,
            http_timeout: Duration::from_secs(30),
            llm_timeout: Duration::from_secs(120),
            retry: RetryConfig::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
        }
    }
}

impl ExtractorConfig {
    /// Reads overrides from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env` with an injectable lookup, so tests do not have to
    /// mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(model) = get("MODEL_NAME") {
            config.model = model.trim().to_string();
        }
        if let Some(base) = get("OPENAI_API_BASE") {
            config.api_base = base.trim().to_string();
        }
        config.api_key = get("OPENAI_API_KEY").map(|k| k.trim().to_string());

        if let Some(v) = get("MODEL_MAX_TOKENS") {
            config.max_tokens = parse_positive("MODEL_MAX_TOKENS", &v)?;
        }
        if let Some(v) = get("TEMPLATEWIZ_WORKERS") {
            config.workers = parse_positive("TEMPLATEWIZ_WORKERS", &v)?;
        }
        if let Some(v) = get("TEMPLATEWIZ_HTTP_TIMEOUT_SECS") {
            config.http_timeout =
                Duration::from_secs(parse_positive("TEMPLATEWIZ_HTTP_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("TEMPLATEWIZ_LLM_TIMEOUT_SECS") {
            config.llm_timeout =
                Duration::from_secs(parse_positive("TEMPLATEWIZ_LLM_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("TEMPLATEWIZ_MAX_RETRIES") {
            let retries: usize = parse("TEMPLATEWIZ_MAX_RETRIES", &v, "retry count")?;
            config.retry.max_attempts = retries + 1;
        }
        Ok(config)
    }
}

fn parse<T: FromStr>(name: &'static str, value: &str, expected: &'static str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
        expected,
    })
}

fn parse_positive<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialOrd,
{
    let parsed: T = parse(name, value, "positive integer")?;
    if parsed > T::default() {
        Ok(parsed)
    } else {
        Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            expected: "positive integer",
        })
    }
}
