//! Topic-to-record pipeline shared by both drivers

use aws_config::{BehaviorVersion, Region};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{blog_post_prompt, Settings};
use crate::error::{ContentGenError, Result, StoreError};
use crate::model::{BedrockModelClient, ModelConfig, TextGenerator};
use crate::store::{DynamoRecordStore, RecordStore, StoreConfig};

/// A validated topic and the prompt derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    topic: String,
    prompt: String,
    max_tokens: u32,
}

impl GenerationRequest {
    /// Trim and validate `topic`, then build the blog-post prompt
    pub fn new(topic: &str) -> Result<Self> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ContentGenError::Validation(
                "Topic cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            topic: topic.to_string(),
            prompt: blog_post_prompt(topic),
            max_tokens: 300,
        })
    }

    /// Set the token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Result of a pipeline run whose generation step succeeded
#[derive(Debug)]
pub struct GenerationOutcome {
    pub topic: String,
    pub content: String,
    /// Identifier of the stored record, or why it could not be stored
    pub stored: std::result::Result<String, StoreError>,
}

impl GenerationOutcome {
    pub fn record_id(&self) -> Option<&str> {
        self.stored.as_deref().ok()
    }

    /// Both generation and storage succeeded
    pub fn is_complete(&self) -> bool {
        self.stored.is_ok()
    }
}

/// Composes a text generator and a record store
#[derive(Clone)]
pub struct ContentGenerator {
    model: Arc<dyn TextGenerator>,
    store: Arc<dyn RecordStore>,
}

impl ContentGenerator {
    /// Create a new ContentGenerator
    pub fn new(model: Arc<dyn TextGenerator>, store: Arc<dyn RecordStore>) -> Self {
        Self { model, store }
    }

    /// Build Bedrock and DynamoDB clients from `settings`
    ///
    /// Provisions the log table first when `settings.provision_table` is set.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let model = BedrockModelClient::new(ModelConfig::from(settings), &sdk_config);
        let store = DynamoRecordStore::new(StoreConfig::from(settings), &sdk_config);
        let generator = Self::new(Arc::new(model), Arc::new(store));

        if settings.provision_table {
            generator.provision().await?;
        } else {
            info!("Skipping table provisioning for {}", settings.table_name);
        }

        Ok(generator)
    }

    /// Ensure the backing table exists
    pub async fn provision(&self) -> Result<()> {
        self.store.ensure_schema().await?;
        Ok(())
    }

    /// Validate `topic` into a request using the model's default token budget
    pub fn request(&self, topic: &str) -> Result<GenerationRequest> {
        Ok(GenerationRequest::new(topic)?.with_max_tokens(self.model.default_max_tokens()))
    }

    /// Run the model for a request
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let content = self
            .model
            .generate(request.prompt(), request.max_tokens())
            .await?;
        Ok(content)
    }

    /// Record a generation
    pub async fn save(&self, topic: &str, content: &str) -> std::result::Result<String, StoreError> {
        self.store.save(topic, content).await
    }

    /// Validate, generate and store
    ///
    /// Returns `Err` when validation or generation fails; storage failure is
    /// carried in the outcome so the generated text is not lost.
    pub async fn run(&self, topic: &str) -> Result<GenerationOutcome> {
        let request = self.request(topic)?;
        let content = self.generate(&request).await?;

        let stored = self.save(request.topic(), &content).await;
        if let Err(e) = &stored {
            warn!("Generated content for '{}' was not stored: {}", request.topic(), e);
        }

        Ok(GenerationOutcome {
            topic: request.topic,
            content,
            stored,
        })
    }
}
