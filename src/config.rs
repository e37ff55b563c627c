use std::{env, time::Duration};

use crate::{
    error::{PlannerError, Result},
    services::{
        openai_client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT},
        photo_lookup::DEFAULT_PHOTO_BASE_URL,
    },
};

/// Endpoint credentials and request settings.
#[derive(Clone, PartialEq)]
pub struct PlannerConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
    pub unsplash_access_key: Option<String>,
    pub unsplash_base_url: String,
}

impl std::fmt::Debug for PlannerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field(
                "unsplash_access_key",
                &self.unsplash_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("unsplash_base_url", &self.unsplash_base_url)
            .finish()
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            unsplash_access_key: None,
            unsplash_base_url: DEFAULT_PHOTO_BASE_URL.to_string(),
        }
    }
}

impl PlannerConfig {
    /// Read settings from the process environment, keeping defaults for unset values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, so callers can supply values without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        config.openai_api_key = non_empty("OPENAI_API_KEY");
        config.unsplash_access_key = non_empty("UNSPLASH_ACCESS_KEY");

        if let Some(base_url) = non_empty("OPENAI_BASE_URL") {
            config.openai_base_url = base_url;
        }
        if let Some(base_url) = non_empty("UNSPLASH_BASE_URL") {
            config.unsplash_base_url = base_url;
        }
        if let Some(model) = non_empty("OPENAI_MODEL") {
            config.model = model;
        }
        if let Some(raw) = non_empty("PLANNER_TEMPERATURE") {
            config.temperature = raw.trim().parse().map_err(|_| {
                PlannerError::Config(format!("PLANNER_TEMPERATURE is not a number: `{raw}`"))
            })?;
        }
        if let Some(raw) = non_empty("PLANNER_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                PlannerError::Config(format!("PLANNER_TIMEOUT_SECS is not an integer: `{raw}`"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(PlannerError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        if self.timeout.is_zero() {
            return Err(PlannerError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// The chat endpoint key, or `MissingCredential` when absent.
    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| PlannerError::MissingCredential("OpenAI API key is missing".to_string()))
    }
}
