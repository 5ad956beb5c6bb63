//! Agent configuration: provider, model parameters and loop limits.
//!
//! Values come from (lowest to highest precedence) the defaults, an optional
//! YAML file and `HEALTH_AGENT_*` environment variables. The API key is
//! resolved separately and is never serialized.

use crate::error::{Error, ErrorContext};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const KEYRING_SERVICE: &str = "health-metrics-agent";

/// Hosted model API family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }

    /// Environment variable consulted for the API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GOOGLE_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(Error::configuration_with_context(
                format!("unknown provider '{}'", other),
                ErrorContext::new()
                    .with_field_path("provider")
                    .with_details("expected gemini | openai"),
            )),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub provider: Provider,
    /// Defaults to the provider's model when unset.
    pub model: Option<String>,
    /// Defaults to the provider's public endpoint when unset.
    pub base_url: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Retries of a failed model request; tool failures are never retried here.
    pub max_retries: u32,
    /// Assistant steps allowed per run before giving up.
    pub recursion_limit: usize,
    pub parallel_tool_calls: bool,
    /// Replaces the built-in system prompt.
    pub system_prompt: Option<String>,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            base_url: None,
            temperature: 0.0,
            max_tokens: 5000,
            timeout_secs: 30,
            max_retries: 2,
            recursion_limit: 25,
            parallel_tool_calls: false,
            system_prompt: None,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider", &self.provider)
            .field("model", &self.model())
            .field("base_url", &self.base_url())
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("recursion_limit", &self.recursion_limit)
            .field("parallel_tool_calls", &self.parallel_tool_calls)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AgentConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load a YAML file, then apply environment overrides.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&raw)?;
        config.apply_env_overrides()?;
        debug!(path = %path.display(), "loaded agent config");
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(provider) = env_var("HEALTH_AGENT_PROVIDER") {
            self.provider = provider.parse()?;
        }
        if let Some(model) = env_var("HEALTH_AGENT_MODEL") {
            self.model = Some(model);
        }
        if let Some(base_url) = env_var("HEALTH_AGENT_BASE_URL") {
            self.base_url = Some(base_url);
        }
        if let Some(v) = parse_env("HEALTH_AGENT_TEMPERATURE")? {
            self.temperature = v;
        }
        if let Some(v) = parse_env("HEALTH_AGENT_MAX_TOKENS")? {
            self.max_tokens = v;
        }
        if let Some(v) = parse_env("HEALTH_AGENT_TIMEOUT_SECS")? {
            self.timeout_secs = v;
        }
        if let Some(v) = parse_env("HEALTH_AGENT_MAX_RETRIES")? {
            self.max_retries = v;
        }
        if let Some(v) = parse_env("HEALTH_AGENT_RECURSION_LIMIT")? {
            self.recursion_limit = v;
        }
        if let Some(v) = parse_env("HEALTH_AGENT_PARALLEL_TOOL_CALLS")? {
            self.parallel_tool_calls = v;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.recursion_limit == 0 {
            return Err(Error::configuration_with_context(
                "recursion_limit must be at least 1",
                ErrorContext::new().with_field_path("recursion_limit"),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeout_secs must be at least 1",
                ErrorContext::new().with_field_path("timeout_secs"),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::configuration_with_context(
                "temperature must be between 0 and 2",
                ErrorContext::new()
                    .with_field_path("temperature")
                    .with_details(self.temperature.to_string()),
            ));
        }
        Ok(())
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Explicit key, then the OS keyring, then the provider's env variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            return Some(key.clone());
        }

        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, self.provider.as_str()) {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }

        env_var(self.provider.api_key_env())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            Error::configuration_with_context(
                format!("invalid value for {}", name),
                ErrorContext::new()
                    .with_field_path(name)
                    .with_details(raw)
                    .with_source("env"),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_model_settings() {
        let config = AgentConfig::default();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.model(), "gemini-2.0-flash");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 5000);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.recursion_limit, 25);
    }

    #[test]
    fn test_yaml_partial_override() {
        let config = AgentConfig::from_yaml_str(
            "provider: openai\nmodel: gpt-4o\nrecursion_limit: 5\nparallel_tool_calls: true\n",
        )
        .unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model(), "gpt-4o");
        assert_eq!(config.base_url(), "https://api.openai.com/v1");
        assert_eq!(config.recursion_limit, 5);
        assert!(config.parallel_tool_calls);
        assert_eq!(config.max_tokens, 5000);
    }

    #[test]
    fn test_yaml_rejects_invalid_values() {
        assert!(AgentConfig::from_yaml_str("recursion_limit: 0\n").is_err());
        assert!(AgentConfig::from_yaml_str("temperature: 7.5\n").is_err());
        assert!(matches!(
            AgentConfig::from_yaml_str("provider: [oops]\n"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_api_key_is_never_serialized() {
        let config = AgentConfig::default().with_api_key("secret-key");
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret-key"));
        assert!(!format!("{:?}", config).contains("secret-key"));
        assert_eq!(config.resolve_api_key().as_deref(), Some("secret-key"));
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("Google".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert!("claude".parse::<Provider>().is_err());
    }
}
