pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured (set GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no text")]
    EmptyResponse,
}

impl LlmError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Transport(e) => !e.is_builder() && !e.is_decode(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::MissingApiKey | LlmError::EmptyResponse => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// A text-in, text-out language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError>;
}

/// Named generation settings selectable from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPreset {
    pub name: &'static str,
    pub model: &'static str,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub max_retries: u32,
}

pub const PRESETS: &[ModelPreset] = &[
    ModelPreset {
        name: "gemini_flash_l",
        model: "gemini-1.5-flash",
        temperature: 0.5,
        max_output_tokens: 4096,
        max_retries: 2,
    },
    ModelPreset {
        name: "gemini_flash",
        model: "gemini-1.5-flash",
        temperature: 0.1,
        max_output_tokens: 4096,
        max_retries: 0,
    },
];

/// Look up a preset by name, falling back to the first one for unknown names.
pub fn preset(name: &str) -> &'static ModelPreset {
    let name = name.trim();
    PRESETS.iter().find(|p| p.name == name).unwrap_or_else(|| {
        tracing::warn!(
            model = name,
            default = PRESETS[0].name,
            "model not found, using default model"
        );
        &PRESETS[0]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_presets() {
        assert_eq!(preset("gemini_flash").temperature, 0.1);
        assert_eq!(preset(" gemini_flash_l ").max_retries, 2);
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        assert_eq!(preset("gpt-banana").name, "gemini_flash_l");
    }

    #[test]
    fn test_transient_errors() {
        let rate_limited = LlmError::Api { status: 429, body: String::new() };
        let unavailable = LlmError::Api { status: 503, body: String::new() };
        let bad_request = LlmError::Api { status: 400, body: String::new() };
        assert!(rate_limited.is_transient());
        assert!(unavailable.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!LlmError::EmptyResponse.is_transient());
    }
}
