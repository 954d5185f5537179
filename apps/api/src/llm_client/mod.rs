//! LLM Client: the single point of entry for all generative-text calls in the screener.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! Callers depend on the `TextGenerator` trait so pipelines can run against fakes.
//!
//! Model: claude-sonnet-4-5 (hardcoded)

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::retry::{with_retry, RetryPolicy};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
pub const MODEL: &str = "claude-sonnet-4-5";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited (status {status}): {message}")]
    RateLimited { status: u16, message: String },

    #[error("service unavailable (status {status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Rate limiting, overload and transport timeouts are worth another attempt.
    /// Everything else is a permanent failure for this request.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Unavailable { .. } => true,
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            LlmError::Api { .. } | LlmError::EmptyContent => false,
        }
    }
}

/// Sampling options for a single generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.5,
            top_p: 0.9,
        }
    }
}

/// Anything that can turn a prompt into text. `LlmClient` in production, fakes in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API with a request timeout and bounded retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build LLM HTTP client")?;
        Ok(Self {
            client,
            api_key,
            retry: RetryPolicy::default(),
        })
    }

    /// One HTTP round trip, no retries. Status codes are mapped onto `LlmError` classes.
    async fn call_once(
        &self,
        prompt: &str,
        system: &str,
        options: &GenerateOptions,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: options.max_tokens,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            top_p: options.top_p,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            let status = status.as_u16();
            return Err(match status {
                429 => LlmError::RateLimited { status, message },
                500..=599 => LlmError::Unavailable { status, message },
                _ => LlmError::Api { status, message },
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }

    /// Calls the model and returns the text of the first text block.
    /// Retries rate limiting and 5xx responses with exponential backoff.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        options: &GenerateOptions,
    ) -> Result<String, LlmError> {
        let response = with_retry(&self.retry, "LLM call", LlmError::is_retryable, || {
            self.call_once(prompt, system, options)
        })
        .await?;

        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, LlmError> {
        self.call(prompt, prompts::PLAIN_TEXT_SYSTEM, options).await
    }
}
