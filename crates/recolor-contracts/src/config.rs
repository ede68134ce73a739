use std::time::Duration;

use crate::error::ColorizeError;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-image-preview";
pub const DEFAULT_PROMPT: &str = "Recolor this image in the style of a classical oil painting. \
Keep the composition, subjects and lighting unchanged; apply rich, natural colors with visible \
brush texture and return the recolored image.";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTimeouts {
    pub connect: Duration,
    pub read: Duration,
    pub write: Duration,
}

impl TransportTimeouts {
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            connect: timeout,
            read: timeout,
            write: timeout,
        }
    }
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self::uniform(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

/// Settings for one colorize invocation.
///
/// Values arrive already resolved from whatever store the caller uses;
/// only blankness is checked here.
#[derive(Debug, Clone)]
pub struct ColorizeConfig {
    pub api_key: String,
    pub model: String,
    pub prompt: Option<String>,
    /// Checked by the caller before invoking the pipeline at all.
    pub enabled: bool,
    pub endpoint: String,
    pub timeouts: TransportTimeouts,
}

impl ColorizeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            prompt: None,
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeouts: TransportTimeouts::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeouts(mut self, timeouts: TransportTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ColorizeError> {
        if self.api_key.trim().is_empty() {
            return Err(ColorizeError::Config("API key is missing".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ColorizeError::Config(
                "model identifier is missing".to_string(),
            ));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ColorizeError::Config("endpoint is missing".to_string()));
        }
        Ok(())
    }

    /// Caller prompt, or the default when the caller left it blank.
    pub fn effective_prompt(&self) -> &str {
        effective_prompt(self.prompt.as_deref())
    }
}

pub fn effective_prompt(prompt: Option<&str>) -> &str {
    prompt
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_PROMPT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_are_documented_values() {
        let config = ColorizeConfig::new("sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.enabled);
        assert_eq!(config.timeouts.connect, Duration::from_secs(60));
        assert_eq!(config.timeouts.read, Duration::from_secs(60));
        assert_eq!(config.timeouts.write, Duration::from_secs(60));
        assert_eq!(config.effective_prompt(), DEFAULT_PROMPT);
    }

    #[test]
    fn blank_api_key_is_config_error() {
        for key in ["", "   ", "\t\n"] {
            let err = ColorizeConfig::new(key).validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
    }

    #[test]
    fn blank_model_is_config_error() {
        let err = ColorizeConfig::new("sk-test")
            .with_model(" ")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn blank_prompt_falls_back_to_default() {
        let config = ColorizeConfig::new("sk-test").with_prompt(Some("  ".to_string()));
        assert_eq!(config.effective_prompt(), DEFAULT_PROMPT);

        let config = config.with_prompt(Some("make it sepia".to_string()));
        assert_eq!(config.effective_prompt(), "make it sepia");
    }
}
