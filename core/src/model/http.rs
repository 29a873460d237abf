use crate::error::{ModelError, Result, ScreeningError};
use crate::model::{checked_score, ModelInput, ScoreModel};
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

/// Score model served over HTTP
///
/// Posts the [`ModelInput`] as JSON and expects
/// `{"score": <f64>, "available": <bool>}` back. `available` defaults to
/// true when omitted; `false` means the endpoint is up but the model is not.
#[derive(Debug, Clone)]
pub struct HttpScoreModel {
    name: String,
    url: String,
    client: Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: Option<f64>,
    #[serde(default = "default_available")]
    available: bool,
}

fn default_available() -> bool {
    true
}

impl HttpScoreModel {
    /// Creates a client for `url` with a per-request timeout
    pub fn new(name: &str, url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScreeningError::Config(format!("HTTP client for {}: {}", name, e)))?;

        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
            client,
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_transport(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout(self.timeout)
        } else {
            e.into()
        }
    }
}

impl ScoreModel for HttpScoreModel {
    fn predict(&self, input: &ModelInput) -> std::result::Result<f64, ModelError> {
        debug!(
            "{}: POST {} (shape {:?}, mean {:.4})",
            self.name,
            self.url,
            input.shape,
            input.mean()
        );

        let body = self
            .client
            .post(&self.url)
            .json(input)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| self.map_transport(e))?
            .text()
            .map_err(|e| self.map_transport(e))?;

        parse_score_response(&body)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Interprets a score endpoint response body
pub fn parse_score_response(body: &str) -> std::result::Result<f64, ModelError> {
    let response: ScoreResponse = serde_json::from_str(body)
        .map_err(|e| ModelError::MalformedResponse(format!("{}", e)))?;

    if !response.available {
        return Err(ModelError::Unavailable(
            "endpoint reported the model as unavailable".to_string(),
        ));
    }

    let score = response
        .score
        .ok_or_else(|| ModelError::MalformedResponse("response has no score".to_string()))?;
    checked_score(score)
}
