//! Google Gemini client for resume scoring

use crate::config::AiConfig;
use crate::error::ScoringError;
use crate::llm::prompts::ScoringRequest;
use crate::llm::scoring::{Assessment, ScoringService};
use base64::{engine::general_purpose::STANDARD, Engine};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    response_mime_type: &'a str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
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
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    status: Option<String>,
}

impl GeminiClient {
    /// Create a client, reading the API key from the environment.
    pub fn new(config: &AiConfig) -> Result<Self, ScoringError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| ScoringError::MissingApiKey(config.api_key_env.clone()))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &AiConfig, api_key: impl Into<String>) -> Result<Self, ScoringError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_body<'a>(&self, request: &'a ScoringRequest) -> GenerateContentRequest<'a> {
        let mut parts = vec![Part {
            text: Some(&request.prompt),
            inline_data: None,
        }];

        if let Some(image) = &request.image {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type,
                    data: STANDARD.encode(&image.data),
                }),
            });
        }

        GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
            },
        }
    }
}

impl ScoringService for GeminiClient {
    async fn score(&self, request: &ScoringRequest) -> Result<Assessment, ScoringError> {
        let body = self.build_body(request);

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &text));
        }

        parse_response(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

impl GeminiClient {
    fn map_transport_error(&self, error: reqwest::Error) -> ScoringError {
        if error.is_timeout() {
            ScoringError::Timeout(self.timeout_secs)
        } else {
            ScoringError::Http(error)
        }
    }
}

/// Map a non-success HTTP answer to a scoring error.
fn classify_error(status: u16, body: &str) -> ScoringError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let exhausted = parsed
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .map(|s| s == "RESOURCE_EXHAUSTED")
        .unwrap_or(false);

    if status == 429 || exhausted {
        ScoringError::RateLimited(message)
    } else {
        ScoringError::Api { status, message }
    }
}

/// Pull the candidate text out of a successful response and validate it.
fn parse_response(body: &str) -> Result<Assessment, ScoringError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ScoringError::Malformed(format!("unexpected response envelope: {}", e)))?;

    if let Some(usage) = &response.usage_metadata {
        debug!(
            "Gemini usage: prompt_tokens={}, output_tokens={}",
            usage.prompt_token_count, usage.candidates_token_count
        );
    }

    if let Some(reason) = response.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_ref()) {
        return Err(ScoringError::Blocked(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| ScoringError::Blocked("no candidates returned".to_string()))?;

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
        return Err(ScoringError::Blocked(format!("empty answer (finish reason {})", reason)));
    }

    Assessment::from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::file_detector::ImageFormat;
    use crate::llm::prompts::PromptTemplates;
    use crate::processing::document::{ExtractedResume, JobDescription};

    fn client() -> GeminiClient {
        GeminiClient::with_api_key(&AiConfig::default(), "test-key").unwrap()
    }

    fn success_body(answer: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": answer }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 812, "candidatesTokenCount": 64, "totalTokenCount": 876 }
        })
        .to_string()
    }

    const ANSWER: &str = r#"{"name":"Asha Rao","email":"asha@example.com","phone":"","location":"Delhi","score":64,"explanation":"Good backend match, little Rust.","matched_keywords":["Go","PostgreSQL"]}"#;

    #[test]
    fn test_endpoint() {
        let mut config = AiConfig::default();
        config.api_base = "http://localhost:8080/v1beta/".to_string();
        config.model = "gemini-test".to_string();
        let client = GeminiClient::with_api_key(&config, "k").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1beta/models/gemini-test:generateContent");
        assert_eq!(client.model_name(), "gemini-test");
    }

    #[test]
    fn test_request_body_shape() {
        let job = JobDescription::new("Rust developer").unwrap();
        let resume = ExtractedResume::Image {
            format: ImageFormat::Png,
            data: vec![1, 2, 3],
        };
        let request = PromptTemplates::default().build_request("scan.png", &job, &resume);

        let body = serde_json::to_value(client().build_body(&request)).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 2);
        assert!(parts[0]["text"].as_str().unwrap().contains("Rust developer"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
        assert!(parts[1].get("text").is_none());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_parse_success() {
        let assessment = parse_response(&success_body(ANSWER)).unwrap();
        assert_eq!(assessment.name, "Asha Rao");
        assert_eq!(assessment.score, 64);
        assert_eq!(assessment.matched_keywords, vec!["Go", "PostgreSQL"]);
    }

    #[test]
    fn test_parse_split_parts() {
        let (head, tail) = ANSWER.split_at(40);
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": head }, { "text": tail }] } }]
        })
        .to_string();
        assert_eq!(parse_response(&body).unwrap().location, "Delhi");
    }

    #[test]
    fn test_parse_blocked() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(parse_response(body), Err(ScoringError::Blocked(_))));

        let body = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert!(matches!(parse_response(body), Err(ScoringError::Blocked(_))));
    }

    #[test]
    fn test_parse_malformed_answer() {
        let body = success_body(r#"{"name":"Asha Rao","score":64}"#);
        assert!(matches!(parse_response(&body), Err(ScoringError::Malformed(_))));

        assert!(matches!(parse_response("<html>oops</html>"), Err(ScoringError::Malformed(_))));
    }

    #[test]
    fn test_classify_errors() {
        let quota = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        match classify_error(429, quota) {
            ScoringError::RateLimited(message) => assert_eq!(message, "Quota exceeded"),
            other => panic!("unexpected {:?}", other),
        }

        let bad_key = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let error = classify_error(400, bad_key);
        assert!(matches!(error, ScoringError::Api { status: 400, .. }));
        assert!(!error.is_transient());

        let error = classify_error(503, "Service Unavailable");
        assert!(matches!(&error, ScoringError::Api { status: 503, message } if message == "Service Unavailable"));
        assert!(error.is_transient());
    }
}
