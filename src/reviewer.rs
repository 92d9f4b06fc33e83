use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuditError;

pub const DEFAULT_MODEL: &str = "command-xlarge-nightly";
const GENERATE_URL: &str = "https://api.cohere.ai/v1/generate";

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;
const TOP_K: u32 = 0;
const TOP_P: f32 = 0.75;
const FREQUENCY_PENALTY: f32 = 0.0;
const PRESENCE_PENALTY: f32 = 0.0;
const STOP_SEQUENCE: &str = "--END--";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Credentials and endpoint for the narrative reviewer service.
///
/// The API key is resolved once at startup; a missing key is a fatal startup
/// condition, never a per-request error.
#[derive(Debug, Clone)]
pub struct ReviewerConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl ReviewerConfig {
    pub fn from_env() -> Result<Self, AuditError> {
        let api_key = std::env::var("COHERE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AuditError::MissingConfig("COHERE_API_KEY"))?;
        let model =
            std::env::var("COHERE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let endpoint =
            std::env::var("COHERE_API_URL").unwrap_or_else(|_| GENERATE_URL.to_string());

        Ok(Self {
            api_key,
            model,
            endpoint,
        })
    }
}

/// Client handle for the narrative reviewer.
///
/// Constructed once and passed to whoever needs it; stateless between calls.
/// The call is one-shot: no retry, only a defensive request timeout.
#[derive(Debug, Clone)]
pub struct CohereReviewer {
    client: reqwest::Client,
    config: ReviewerConfig,
}

impl CohereReviewer {
    pub fn new(config: ReviewerConfig) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Send the transcript for qualitative review and return the commentary.
    pub async fn review(&self, transcript: &str) -> Result<String, AuditError> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt: review_prompt(transcript),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            k: TOP_K,
            p: TOP_P,
            frequency_penalty: FREQUENCY_PENALTY,
            presence_penalty: PRESENCE_PENALTY,
            stop_sequences: [STOP_SEQUENCE],
            return_likelihoods: "NONE",
        };

        debug!(model = %self.config.model, "sending transcript for review");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AuditError::Reviewer(format!(
                "generate returned status {status}: {detail}"
            )));
        }

        let payload: GenerateResponse = response.json().await?;
        payload
            .generations
            .into_iter()
            .next()
            .map(|generation| generation.text.trim().to_string())
            .ok_or_else(|| {
                AuditError::Reviewer("generate response contained no generations".to_string())
            })
    }
}

/// The single instruction string sent to the reviewer, embedding the full
/// transcript.
fn review_prompt(transcript: &str) -> String {
    format!(
        "You are a financial analyst specializing in government budgets. \
         Analyze the following budget document for any inconsistencies in the \
         financial data, especially discrepancies in totals. Provide a \
         detailed report highlighting any issues found and recommendations:\
         \n\n{transcript}\n\nProvide your analysis below."
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    k: u32,
    p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    stop_sequences: [&'static str; 1],
    return_likelihoods: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}
