//! In-memory stand-ins for the model and the table

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::error::{GenerationError, StoreError};
use crate::model::TextGenerator;
use crate::store::{GenerationRecord, RecordStore};

/// Replays queued responses and remembers every prompt it saw
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: Option<String>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    /// Answer every prompt with `text`
    pub fn always(text: &str) -> Self {
        Self {
            fallback: Some(text.to_string()),
            ..Default::default()
        }
    }

    /// Fail every prompt
    pub fn failing() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .await
            .push((prompt.to_string(), max_tokens));

        if let Some(response) = self.responses.lock().await.pop_front() {
            return response;
        }
        match &self.fallback {
            Some(text) => Ok(text.clone()),
            None => Err(GenerationError::Invocation("access denied".to_string())),
        }
    }
}

/// Keeps records in a vector, optionally refusing writes
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<GenerationRecord>>,
    fail_writes: bool,
    schema_checks: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes are throttled
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub async fn records(&self) -> Vec<GenerationRecord> {
        self.records.lock().await.clone()
    }

    pub fn schema_checks(&self) -> usize {
        self.schema_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.schema_checks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn put_record(&self, record: &GenerationRecord) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write(
                "ProvisionedThroughputExceededException".to_string(),
            ));
        }
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}
