use super::{Completion, LanguageModel, LlmError, ModelPreset, TokenUsage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini REST base URL used by the Developer API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const RETRY_BACKOFF: Duration = Duration::from_millis(750);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateContentResponse {
    fn into_completion(self) -> Result<Completion, LlmError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(Completion {
            text,
            usage: self.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            }),
        })
    }
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    preset: ModelPreset,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<&str>,
        base_url: &str,
        preset: &ModelPreset,
    ) -> Result<Self, LlmError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;
        Ok(GeminiClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            preset: preset.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.preset.model
        )
    }

    async fn send_once(&self, request: &GenerateContentRequest<'_>) -> Result<Completion, LlmError> {
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.into_completion()
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    fn name(&self) -> &str {
        self.preset.name
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.preset.temperature,
                max_output_tokens: self.preset.max_output_tokens,
            },
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(completion) => {
                    if let Some(usage) = completion.usage {
                        tracing::info!(
                            model = self.preset.model,
                            prompt_tokens = usage.prompt_tokens,
                            output_tokens = usage.output_tokens,
                            "model call finished"
                        );
                    }
                    return Ok(completion);
                }
                Err(e) if e.is_transient() && attempt < self.preset.max_retries => {
                    attempt += 1;
                    tracing::warn!(attempt, error = %e, "model call failed, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::preset;

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 4096,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 4096);
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_response_parts_are_joined() {
        let body = r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "[{\"id\": 1"}, {"text": "}]"}]}}],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 30, "totalTokenCount": 150}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let completion = response.into_completion().unwrap();
        assert_eq!(completion.text, "[{\"id\": 1}]");
        assert_eq!(
            completion.usage,
            Some(TokenUsage {
                prompt_tokens: 120,
                output_tokens: 30
            })
        );
    }

    #[test]
    fn test_blocked_response_is_empty() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            response.into_completion(),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let err = GeminiClient::new(None, GEMINI_API_BASE_URL, preset("gemini_flash")).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
        assert!(GeminiClient::new(Some(" "), GEMINI_API_BASE_URL, preset("gemini_flash")).is_err());
    }

    #[test]
    fn test_endpoint() {
        let client =
            GeminiClient::new(Some("k"), "http://localhost:9999/", preset("gemini_flash")).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(client.name(), "gemini_flash");
    }
}
