//! Language-model-backed correction over HTTP.
//!
//! The endpoint speaks the Ollama generate API: `POST {base_url}/api/generate`
//! with `{model, prompt, stream: false}` answering `{response}`. Reachability
//! is checked once with `GET {base_url}/api/tags`; an unreachable endpoint means
//! the corrector is simply not registered for the lifetime of the process.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{GlossaError, Result};
use crate::spelling::strategy::{SpellCheckResult, SpellCheckStrategy};

/// Confidence of an accepted model answer.
pub const LLM_CONFIDENCE: f64 = 0.7;

/// Quote characters stripped from model answers.
const QUOTES: &[char] = &['"', '\'', '`', '«', '»', '“', '”'];

/// Endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the model server.
    pub base_url: String,
    /// Model name passed to the server.
    pub model: String,
    /// Hard timeout for a generate call.
    pub timeout_secs: u64,
    /// Timeout for the startup reachability check.
    pub connect_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 2,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Outcome of a generate call. Transport and protocol failures are values,
/// not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmResponse {
    Success(String),
    Failure(String),
}

impl LlmResponse {
    /// Whether the call produced text.
    pub fn is_success(&self) -> bool {
        matches!(self, LlmResponse::Success(_))
    }

    /// The generated text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            LlmResponse::Success(text) => Some(text),
            LlmResponse::Failure(_) => None,
        }
    }
}

/// HTTP client for the model server.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a client with the configured hard timeout.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GlossaError::llm(format!("Failed to build HTTP client: {e}")))?;
        Ok(LlmClient { client, config })
    }

    /// The endpoint settings.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Check whether the server answers at all.
    pub async fn is_reachable(&self) -> bool {
        let result = self
            .client
            .get(self.endpoint("api/tags"))
            .timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!("LLM health check returned status {}", response.status());
                false
            }
            Err(e) => {
                debug!("LLM health check failed: {e}");
                false
            }
        }
    }

    /// Generate a completion for `prompt`.
    pub async fn generate(&self, prompt: &str) -> LlmResponse {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let http_response = match self
            .client
            .post(self.endpoint("api/generate"))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return LlmResponse::Failure(format!("LLM request failed: {e}")),
        };

        let status = http_response.status();
        let response_text = match http_response.text().await {
            Ok(text) => text,
            Err(e) => return LlmResponse::Failure(format!("Failed to read LLM response: {e}")),
        };

        if !status.is_success() {
            return LlmResponse::Failure(format!(
                "LLM error (status {status}): {response_text}"
            ));
        }

        match serde_json::from_str::<GenerateResponse>(&response_text) {
            Ok(response) => LlmResponse::Success(response.response),
            Err(e) => LlmResponse::Failure(format!("Failed to parse LLM response: {e}")),
        }
    }
}

/// Build the correction prompt for a search query.
pub fn correction_prompt(query: &str) -> String {
    format!(
        "You correct typos in search queries for a Russian news site. \
         Fix spelling mistakes and wrong keyboard layout only, keep the meaning \
         and language, do not add words. Answer with the corrected query only, \
         on a single line, or repeat it unchanged if it is already correct.\n\
         Query: {query}"
    )
}

/// Extract a correction from a model answer.
///
/// Takes the first non-empty line without surrounding quotes. Empty answers
/// and answers more than twice the query length plus ten characters are
/// rejected.
pub fn parse_correction(query: &str, answer: &str) -> Option<String> {
    let line = answer.lines().map(str::trim).find(|line| !line.is_empty())?;
    let corrected = line.trim_matches(QUOTES).trim();
    if corrected.is_empty() {
        return None;
    }

    let limit = query.chars().count() * 2 + 10;
    if corrected.chars().count() > limit {
        debug!("Discarding LLM answer of {} chars", corrected.chars().count());
        return None;
    }

    Some(corrected.to_string())
}

/// Last-resort corrector delegating to a language model.
pub struct LlmCorrector {
    client: LlmClient,
}

impl LlmCorrector {
    /// Wrap a client without probing it.
    pub fn new(client: LlmClient) -> Self {
        LlmCorrector { client }
    }

    /// Check the endpoint once and build a corrector only if it answers.
    pub async fn connect(config: LlmConfig) -> Option<Self> {
        let client = match LlmClient::new(config) {
            Ok(client) => client,
            Err(e) => {
                warn!("LLM corrector disabled: {e}");
                return None;
            }
        };

        if client.is_reachable().await {
            info!(
                "LLM corrector enabled ({} at {})",
                client.config.model, client.config.base_url
            );
            Some(LlmCorrector::new(client))
        } else {
            info!(
                "LLM endpoint {} unreachable, corrector disabled",
                client.config.base_url
            );
            None
        }
    }
}

#[async_trait]
impl SpellCheckStrategy for LlmCorrector {
    fn name(&self) -> &str {
        "llm"
    }

    fn priority(&self) -> u32 {
        30
    }

    async fn check(&self, query: &str) -> Result<SpellCheckResult> {
        match self.client.generate(&correction_prompt(query)).await {
            LlmResponse::Success(answer) => match parse_correction(query, &answer) {
                Some(corrected) => Ok(SpellCheckResult::changed(
                    query,
                    corrected,
                    self.name(),
                    LLM_CONFIDENCE,
                )),
                None => Ok(SpellCheckResult::unchanged(query)),
            },
            LlmResponse::Failure(message) => Err(GlossaError::llm(message)),
        }
    }
}
