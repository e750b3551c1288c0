//! Inference endpoint configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use faqbot_core::{Error, Result};

use crate::types::ChatStatus;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "HuggingFaceH4/zephyr-7b-beta";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Where and how to reach the hosted completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub base_url: String,
    pub model: String,
    /// Bearer token. Never serialized.
    #[serde(skip)]
    pub api_token: Option<String>,
    pub connect_timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            api_token: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl InferenceConfig {
    /// Load config from env vars, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(url) = non_empty("FAQBOT_INFERENCE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = non_empty("FAQBOT_MODEL") {
            config.model = model;
        }
        config.api_token = non_empty("HF_TOKEN").or_else(|| non_empty("HUGGINGFACEHUB_API_TOKEN"));
        if let Some(raw) = non_empty("FAQBOT_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs = raw.trim().parse().map_err(|_| {
                Error::Config(format!("FAQBOT_CONNECT_TIMEOUT_SECS is not a number: {raw:?}"))
            })?;
        }

        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "inference URL must be http(s): {}",
                config.base_url
            )));
        }

        info!(
            "Inference endpoint {} (model {}, token {})",
            config.base_url,
            config.model,
            if config.api_token.is_some() { "set" } else { "unset" }
        );
        Ok(config)
    }

    /// Full URL of the streaming chat-completions route for the model.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/models/{}/v1/chat/completions",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Build the public status response (no token exposed).
    pub fn to_status(&self) -> ChatStatus {
        ChatStatus {
            model: self.model.clone(),
            endpoint: self.completions_url(),
            token_configured: self.api_token.is_some(),
        }
    }
}
