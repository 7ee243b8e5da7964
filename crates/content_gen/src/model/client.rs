//! Model client for text generation using the Bedrock runtime

use async_trait::async_trait;
use aws_sdk_bedrockruntime::{error::DisplayErrorContext, primitives::Blob, Client};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error};

use crate::config::{conversational_prompt, Settings, STOP_SEQUENCE};
use crate::error::GenerationError;

/// Configuration for the generation model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: "anthropic.claude-v2".to_string(),
            max_tokens: 300,
            temperature: 0.7,
            stop_sequences: vec![STOP_SEQUENCE.to_string()],
        }
    }
}

impl ModelConfig {
    /// Create a new ModelConfig for a model identifier
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }

    /// Set the default token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the stop sequences
    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = stop_sequences;
        self
    }
}

impl From<&Settings> for ModelConfig {
    fn from(settings: &Settings) -> Self {
        ModelConfig::new(&settings.model_id)
            .with_max_tokens(settings.max_tokens)
            .with_temperature(settings.temperature)
    }
}

/// Text completion request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens_to_sample: u32,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
}

impl CompletionRequest {
    /// Wrap `prompt` in the conversational template and attach sampling parameters
    pub fn new(config: &ModelConfig, prompt: &str, max_tokens: u32) -> Self {
        Self {
            prompt: conversational_prompt(prompt),
            max_tokens_to_sample: max_tokens,
            temperature: config.temperature,
            stop_sequences: config.stop_sequences.clone(),
        }
    }
}

/// Text completion response body
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub completion: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl CompletionResponse {
    /// Parse a raw response body into trimmed, non-empty text
    pub fn parse_text(body: &[u8]) -> Result<String, GenerationError> {
        let response: CompletionResponse = serde_json::from_slice(body)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        let text = response.completion.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }
        Ok(text.to_string())
    }
}

/// Anything that turns a prompt into generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`, bounded by `max_tokens`
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;

    /// Token budget used when the caller has no preference
    fn default_max_tokens(&self) -> u32 {
        300
    }
}

/// Client for Anthropic text completion models hosted on Bedrock
pub struct BedrockModelClient {
    config: ModelConfig,
    client: Client,
}

impl BedrockModelClient {
    /// Create a new BedrockModelClient
    pub fn new(config: ModelConfig, sdk_config: &aws_config::SdkConfig) -> Self {
        let client = Client::new(sdk_config);
        Self { config, client }
    }
}

#[async_trait]
impl TextGenerator for BedrockModelClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let start_time = Instant::now();
        let request = CompletionRequest::new(&self.config, prompt, max_tokens);
        let body = serde_json::to_vec(&request).map_err(GenerationError::Encode)?;

        debug!(
            model_id = %self.config.model_id,
            max_tokens,
            "Invoking model"
        );

        let output = self
            .client
            .invoke_model()
            .model_id(&self.config.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                let err = GenerationError::Invocation(DisplayErrorContext(&e).to_string());
                error!("Content generation error: {}", err);
                err
            })?;

        let text = CompletionResponse::parse_text(output.body().as_ref()).map_err(|e| {
            error!("Content generation error: {}", e);
            e
        })?;

        debug!(
            "Generated {} characters in {:.3}s",
            text.chars().count(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(text)
    }

    fn default_max_tokens(&self) -> u32 {
        self.config.max_tokens
    }
}
