//! Generation log record

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::StoreError;

pub const ATTR_ID: &str = "id";
pub const ATTR_TOPIC: &str = "topic";
pub const ATTR_CONTENT: &str = "content";
pub const ATTR_TIMESTAMP: &str = "timestamp";
pub const ATTR_CONTENT_LENGTH: &str = "content_length";

/// One successful generation, written once and never updated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: String,
    pub topic: String,
    pub content: String,
    /// RFC 3339 creation time (UTC)
    pub timestamp: String,
    /// Character count of `content` captured at creation
    pub content_length: usize,
}

impl GenerationRecord {
    /// Build a record with a fresh identifier and the current time
    pub fn new(topic: &str, content: &str) -> Result<Self, StoreError> {
        if content.is_empty() {
            return Err(StoreError::InvalidRecord(
                "content must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            content: content.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            content_length: content.chars().count(),
        })
    }

    /// Whether the stored length still matches the content
    pub fn is_consistent(&self) -> bool {
        self.content_length == self.content.chars().count()
    }

    /// Convert into a table item
    pub fn to_item(&self) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (ATTR_ID.to_string(), AttributeValue::S(self.id.clone())),
            (ATTR_TOPIC.to_string(), AttributeValue::S(self.topic.clone())),
            (
                ATTR_CONTENT.to_string(),
                AttributeValue::S(self.content.clone()),
            ),
            (
                ATTR_TIMESTAMP.to_string(),
                AttributeValue::S(self.timestamp.clone()),
            ),
            (
                ATTR_CONTENT_LENGTH.to_string(),
                AttributeValue::N(self.content_length.to_string()),
            ),
        ])
    }
}

/// `{id}_content.txt`
pub fn content_file_name(id: &str) -> String {
    format!("{}_content.txt", id)
}
