//! Single-shot request driver for serverless entry points

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::ContentGenError;
use crate::generator::{ContentGenerator, GenerationOutcome};

pub const STATUS_OK: u16 = 200;
/// Content was generated but the record could not be stored
pub const STATUS_PARTIAL: u16 = 207;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_GENERATION_FAILED: u16 = 500;

/// Body key carrying the stored record identifier
pub const RECORD_ID_KEY: &str = "dynamodb_id";
/// Error text returned with [`STATUS_PARTIAL`]; storage details stay in the log
pub const NOT_STORED_MESSAGE: &str = "Content generated but not stored";

/// Incoming event; only `topic` is read
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GenerateEvent {
    #[serde(default)]
    pub topic: Option<String>,
}

impl GenerateEvent {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
        }
    }
}

/// Response in the proxy-integration shape: a status code and a JSON-encoded body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    fn new(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            body: body.to_string(),
        }
    }

    fn from_outcome(outcome: &GenerationOutcome) -> Self {
        match &outcome.stored {
            Ok(id) => Self::new(
                STATUS_OK,
                json!({
                    "topic": outcome.topic,
                    "content": outcome.content,
                    RECORD_ID_KEY: id,
                }),
            ),
            Err(_) => Self::new(
                STATUS_PARTIAL,
                json!({
                    "topic": outcome.topic,
                    "content": outcome.content,
                    RECORD_ID_KEY: Value::Null,
                    "error": NOT_STORED_MESSAGE,
                }),
            ),
        }
    }
}

/// Turns one [`GenerateEvent`] into one [`HandlerResponse`]
///
/// The response status reflects the least successful step: 400 for a missing
/// topic, 500 when generation fails, 207 when only storage fails, 200 otherwise.
#[derive(Clone)]
pub struct ContentHandler {
    generator: ContentGenerator,
}

impl ContentHandler {
    pub fn new(generator: ContentGenerator) -> Self {
        Self { generator }
    }

    pub async fn handle(&self, event: GenerateEvent) -> HandlerResponse {
        let topic = event.topic.unwrap_or_default();

        match self.generator.run(&topic).await {
            Ok(outcome) => {
                info!(
                    stored = outcome.is_complete(),
                    "Generated {} characters for '{}'",
                    outcome.content.chars().count(),
                    outcome.topic
                );
                if let Err(e) = &outcome.stored {
                    warn!("Record for '{}' not stored: {}", outcome.topic, e);
                }
                HandlerResponse::from_outcome(&outcome)
            }
            Err(ContentGenError::Validation(reason)) => {
                warn!("Rejected request: {}", reason);
                HandlerResponse::new(STATUS_BAD_REQUEST, json!("No topic provided"))
            }
            Err(e) => {
                error!("Request failed: {}", e);
                HandlerResponse::new(STATUS_GENERATION_FAILED, json!("Failed to generate content"))
            }
        }
    }
}
