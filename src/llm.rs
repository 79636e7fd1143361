//! OpenAI-compatible chat completion client with provider failover.

use crate::config::{PipelineConfig, ProviderConfig};
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

/// One chat completion.
#[derive(Debug, Clone, Copy)]
pub struct Prompt<'a> {
    pub system: &'a str,
    pub user: &'a str,
    /// Ask the provider for a JSON object response
    pub json_output: bool,
}

impl ChatRequest {
    fn new(model: &str, prompt: &Prompt<'_>) -> Self {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(model);
        Self {
            model: model.to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: prompt.system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.user.to_string(),
                },
            ],
            max_completion_tokens: if is_reasoning { 16000 } else { 8000 },
            temperature: if is_reasoning { None } else { Some(0.2) },
            reasoning_effort: is_reasoning.then(|| "low".to_string()),
            response_format: prompt
                .json_output
                .then(|| json!({"type": "json_object"})),
        }
    }
}

/// A single provider call failure.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unreadable response body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response contained no content")]
    EmptyResponse,
}

impl ProviderError {
    /// 429 and 5xx are worth retrying on the same provider; other 4xx are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => true,
        }
    }
}

/// Chat completion client over an ordered list of providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    providers: Vec<ProviderConfig>,
    retry: RetryConfig,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, providers: Vec<ProviderConfig>, retry: RetryConfig) -> Self {
        Self {
            http,
            providers,
            retry,
        }
    }

    /// Client using the configured providers, each with the provider-call
    /// retry budget at the configured delay.
    pub fn from_config(http: reqwest::Client, config: &PipelineConfig) -> Self {
        let attempts = RetryConfig::provider_call().max_attempts;
        Self::new(
            http,
            config.providers.clone(),
            RetryConfig::fixed(attempts, config.retry_delay),
        )
    }

    /// Run a completion, moving to the next provider when one is exhausted
    /// or rejects the request outright.
    pub async fn complete(&self, prompt: Prompt<'_>) -> Result<String> {
        let mut last_error = None;

        for provider in &self.providers {
            let result = with_retry_if(
                &self.retry,
                &format!("{} completion", provider.name),
                || self.call(provider, &prompt),
                ProviderError::is_retryable,
            )
            .await;

            match result {
                Ok(content) => {
                    info!(provider = %provider.name, model = %provider.model, "completion succeeded");
                    return Ok(content);
                }
                Err(e) => {
                    warn!(provider = %provider.name, "provider failed: {}", e);
                    last_error = Some((provider.name.clone(), e));
                }
            }
        }

        match last_error {
            Some((name, e)) => {
                Err(anyhow::Error::new(e).context(format!("all LLM providers failed (last: {})", name)))
            }
            None => bail!("no LLM providers configured"),
        }
    }

    async fn call(&self, provider: &ProviderConfig, prompt: &Prompt<'_>) -> Result<String, ProviderError> {
        let request = ChatRequest::new(&provider.model, prompt);

        let response = self
            .http
            .post(&provider.api_url)
            .bearer_auth(&provider.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let chat: ChatResponse = serde_json::from_slice(&bytes)?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}
