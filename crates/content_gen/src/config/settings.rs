//! Environment-backed settings

use lazy_static::lazy_static;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ContentGenError, Result};

/// All tunables shared by the interactive and request drivers
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub region: String,
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub table_name: String,
    pub read_capacity: i64,
    pub write_capacity: i64,
    /// Check for (and create) the table when a driver is constructed
    pub provision_table: bool,
    pub table_ready_poll_ms: u64,
    pub table_ready_max_attempts: u32,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: env::var("CONTENT_GEN_REGION").unwrap_or_else(|_| "us-west-2".to_string()),
            model_id: env::var("CONTENT_GEN_MODEL_ID")
                .unwrap_or_else(|_| "anthropic.claude-v2".to_string()),
            max_tokens: env_or("CONTENT_GEN_MAX_TOKENS", 300),
            temperature: env_or("CONTENT_GEN_TEMPERATURE", 0.7),
            table_name: env::var("CONTENT_GEN_TABLE")
                .unwrap_or_else(|_| "ContentGenerationLog".to_string()),
            read_capacity: env_or("CONTENT_GEN_READ_CAPACITY", 5),
            write_capacity: env_or("CONTENT_GEN_WRITE_CAPACITY", 5),
            provision_table: env_or("CONTENT_GEN_PROVISION_TABLE", true),
            table_ready_poll_ms: env_or("CONTENT_GEN_TABLE_POLL_MS", 2000),
            table_ready_max_attempts: env_or("CONTENT_GEN_TABLE_MAX_ATTEMPTS", 60),
        }
    }
}

impl Settings {
    /// Read settings from the environment
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn table_ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.table_ready_poll_ms)
    }

    /// Reject values the model or the table API would refuse anyway
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(ContentGenError::Config(
                "max_tokens must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ContentGenError::Config(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            )));
        }
        if self.table_name.trim().is_empty() {
            return Err(ContentGenError::Config(
                "table name must not be empty".to_string(),
            ));
        }
        if self.read_capacity < 1 || self.write_capacity < 1 {
            return Err(ContentGenError::Config(
                "table capacity units must be at least 1".to_string(),
            ));
        }
        if self.table_ready_max_attempts == 0 {
            return Err(ContentGenError::Config(
                "table readiness needs at least one check".to_string(),
            ));
        }
        Ok(())
    }
}

lazy_static! {
    /// Settings captured from the environment at first use
    pub static ref SETTINGS: Settings = Settings::from_env();
}
