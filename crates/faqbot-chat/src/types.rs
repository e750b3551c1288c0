//! Chat types: prompt messages, history turns, generation parameters and
//! the HTTP API surface.

use serde::{Deserialize, Serialize};

use faqbot_core::{Error, Result};

pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "A helpful AI assistant providing detailed answers with resources.";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 0.95;

/// Prompts offered to the user before the first question.
pub const EXAMPLE_PROMPTS: &[&str] = &[
    "How do I reset my password?",
    "What is cloud computing?",
    "How to learn Python?",
    "What are the benefits of AI?",
];

pub const SUBMIT_LABEL: &str = "Ask AI";

/// Author of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message of the prompt sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One exchange of conversation history. Either side may be missing.
///
/// Serialized as a two-element array `[user, assistant]`, the shape chat
/// widgets hand back as history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Option<String>, Option<String>)", into = "(Option<String>, Option<String>)")]
pub struct Turn {
    pub user: Option<String>,
    pub assistant: Option<String>,
}

impl Turn {
    pub fn new(user: Option<String>, assistant: Option<String>) -> Self {
        Self { user, assistant }
    }

    /// A completed exchange.
    pub fn exchange(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self::new(Some(user.into()), Some(assistant.into()))
    }

    /// A user message that has not been answered.
    pub fn unanswered(user: impl Into<String>) -> Self {
        Self::new(Some(user.into()), None)
    }
}

impl From<(Option<String>, Option<String>)> for Turn {
    fn from((user, assistant): (Option<String>, Option<String>)) -> Self {
        Self { user, assistant }
    }
}

impl From<Turn> for (Option<String>, Option<String>) {
    fn from(turn: Turn) -> Self {
        (turn.user, turn.assistant)
    }
}

/// Sampling parameters forwarded verbatim to the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

/// Per-call generation settings. Nothing here is remembered between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub system_message: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            system_message: DEFAULT_SYSTEM_MESSAGE.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

impl GenerationConfig {
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    /// Check the domain invariants: `max_tokens > 0`, `top_p` in (0, 1],
    /// finite non-negative temperature.
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(Error::InvalidInput("max_tokens must be greater than 0".into()));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(Error::InvalidInput(format!(
                "top_p must be in (0, 1], got {}",
                self.top_p
            )));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(Error::InvalidInput(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Slider bounds for one adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

/// The configuration panel a chat front-end renders next to the input box.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterPanel {
    #[serde(rename = "systemMessage")]
    pub system_message: String,
    #[serde(rename = "maxTokens")]
    pub max_tokens: ParameterRange,
    pub temperature: ParameterRange,
    #[serde(rename = "topP")]
    pub top_p: ParameterRange,
    #[serde(rename = "submitLabel")]
    pub submit_label: String,
}

impl Default for ParameterPanel {
    fn default() -> Self {
        Self {
            system_message: DEFAULT_SYSTEM_MESSAGE.into(),
            max_tokens: ParameterRange {
                min: 1.0,
                max: 2048.0,
                step: 1.0,
                default: DEFAULT_MAX_TOKENS as f64,
            },
            temperature: ParameterRange {
                min: 0.1,
                max: 4.0,
                step: 0.1,
                default: DEFAULT_TEMPERATURE,
            },
            top_p: ParameterRange {
                min: 0.1,
                max: 1.0,
                step: 0.05,
                default: DEFAULT_TOP_P,
            },
            submit_label: SUBMIT_LABEL.into(),
        }
    }
}

/// Incoming chat request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<Turn>,
    #[serde(rename = "systemMessage")]
    pub system_message: Option<String>,
    #[serde(rename = "maxTokens")]
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    #[serde(rename = "topP")]
    pub top_p: Option<f64>,
}

impl ChatRequest {
    /// Generation settings for this request, defaults filled in per field.
    pub fn generation_config(&self) -> GenerationConfig {
        let defaults = GenerationConfig::default();
        GenerationConfig {
            system_message: self
                .system_message
                .clone()
                .unwrap_or(defaults.system_message),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_p: self.top_p.unwrap_or(defaults.top_p),
        }
    }
}

/// Chat response: the composed reply or the fixed error text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Chat status response (token masked).
#[derive(Debug, Clone, Serialize)]
pub struct ChatStatus {
    pub model: String,
    pub endpoint: String,
    #[serde(rename = "tokenConfigured")]
    pub token_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn test_turn_from_pair_with_nulls() {
        let turns: Vec<Turn> =
            serde_json::from_str(r#"[["A", "B"], ["C", null], [null, "D"]]"#).unwrap();
        assert_eq!(turns[0], Turn::exchange("A", "B"));
        assert_eq!(turns[1], Turn::unanswered("C"));
        assert_eq!(turns[2], Turn::new(None, Some("D".into())));
    }

    #[test]
    fn test_request_defaults_fill_missing_fields() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"message": "hello", "temperature": 1.5}"#).unwrap();
        assert!(req.history.is_empty());

        let config = req.generation_config();
        assert_eq!(config.system_message, DEFAULT_SYSTEM_MESSAGE);
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.temperature, 1.5);
        assert_eq!(config.top_p, 0.95);
    }

    #[test]
    fn test_validate_accepts_lower_bounds() {
        let config = GenerationConfig {
            max_tokens: 1,
            temperature: 0.1,
            top_p: 0.1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(GenerationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_broken_invariants() {
        let zero_tokens = GenerationConfig {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(zero_tokens.validate().is_err());

        for top_p in [0.0, -0.5, 1.01, f64::NAN] {
            let config = GenerationConfig {
                top_p,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "top_p={top_p} accepted");
        }

        let hot = GenerationConfig {
            temperature: f64::INFINITY,
            ..Default::default()
        };
        assert!(hot.validate().is_err());
    }

    #[test]
    fn test_panel_matches_defaults() {
        let panel = ParameterPanel::default();
        assert_eq!(panel.max_tokens.default, 512.0);
        assert_eq!(panel.temperature.max, 4.0);
        assert_eq!(panel.top_p.step, 0.05);

        let json = serde_json::to_value(&panel).unwrap();
        assert_eq!(json["submitLabel"], "Ask AI");
        assert!(json["topP"]["min"].is_number());
    }
}
