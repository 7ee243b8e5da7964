//! content_gen: blog-post generation with a persistent generation log
//!
//! This library provides:
//! - A Bedrock text completion client behind the `TextGenerator` trait
//! - A DynamoDB generation log behind the `RecordStore` trait
//! - `ContentGenerator`, which composes the two
//! - Two drivers: `InteractiveSession` (console read-loop) and
//!   `ContentHandler` (single request, serverless friendly)
//!
//! # Example
//!
//! ```no_run
//! use content_gen::{ContentGenerator, ContentHandler, GenerateEvent, Settings};
//!
//! #[tokio::main]
//! async fn main() -> content_gen::Result<()> {
//!     let generator = ContentGenerator::connect(&Settings::from_env()).await?;
//!     let handler = ContentHandler::new(generator);
//!
//!     let response = handler.handle(GenerateEvent::new("renewable energy")).await;
//!     println!("{}: {}", response.status_code, response.body);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// External services
pub mod model;
pub mod store;

// Pipeline and drivers
pub mod generator;
pub mod handler;
pub mod output;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export commonly used types and functions
pub use error::{ContentGenError, GenerationError, Result, StoreError};

pub use config::{blog_post_prompt, conversational_prompt, is_exit_keyword, Settings, SETTINGS};

pub use model::{BedrockModelClient, ModelConfig, TextGenerator};

pub use store::{DynamoRecordStore, GenerationRecord, RecordStore, StoreConfig};

pub use generator::{ContentGenerator, GenerationOutcome, GenerationRequest};

pub use handler::{ContentHandler, GenerateEvent, HandlerResponse};

pub use output::ContentFileWriter;

pub use session::{InteractiveSession, SessionEnd, SessionSummary};
