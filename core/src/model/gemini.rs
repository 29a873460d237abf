use crate::error::{ModelError, Result, ScreeningError};
use crate::model::TextGenerator;
use crate::types::ServiceConfig;
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
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
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
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

impl GeminiClient {
    /// Creates a client from the service configuration
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::Config`] if the API key is empty or the HTTP
    /// client cannot be built.
    pub fn new(services: &ServiceConfig, timeout: Duration) -> Result<Self> {
        if services.api_key.trim().is_empty() {
            return Err(ScreeningError::Config(
                "GOOGLE_API_KEY is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScreeningError::Config(format!("HTTP client for Gemini: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                services.gemini_base_url.trim_end_matches('/'),
                services.gemini_model
            ),
            api_key: services.api_key.clone(),
            temperature: services.temperature,
            max_output_tokens: services.max_output_tokens,
            timeout,
        })
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> std::result::Result<String, ModelError> {
        debug!("gemini: POST {} ({} prompt chars)", self.endpoint, prompt.len());

        let map_transport = |e: reqwest::Error| {
            if e.is_timeout() {
                ModelError::Timeout(self.timeout)
            } else {
                ModelError::from(e)
            }
        };

        let body = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(map_transport)?
            .text()
            .map_err(map_transport)?;

        parse_generate_response(&body)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Extracts the text of the first candidate
///
/// Multiple parts of the candidate are concatenated as received.
pub fn parse_generate_response(body: &str) -> std::result::Result<String, ModelError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ModelError::MalformedResponse(format!("{}", e)))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        Err(ModelError::MalformedResponse(
            "response contains no candidate text".to_string(),
        ))
    } else {
        Ok(text)
    }
}
