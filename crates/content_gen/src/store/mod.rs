//! Generation log storage
//!
//! This module provides:
//! - `record`: The persisted `GenerationRecord`
//! - `dynamo`: DynamoDB-backed `RecordStore`

mod dynamo;
mod record;

use async_trait::async_trait;
use tracing::info;

use crate::error::StoreError;

pub use dynamo::{DynamoRecordStore, StoreConfig};
pub use record::{content_file_name, GenerationRecord};

/// Write-only log of successful generations
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Make sure the backing table exists and is ready; safe to call repeatedly
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Write a single record as a new item
    async fn put_record(&self, record: &GenerationRecord) -> Result<(), StoreError>;

    /// Record a generation and return its identifier
    async fn save(&self, topic: &str, content: &str) -> Result<String, StoreError> {
        let record = GenerationRecord::new(topic, content)?;
        self.put_record(&record).await?;
        info!("Content saved with ID: {}", record.id);
        Ok(record.id)
    }
}
