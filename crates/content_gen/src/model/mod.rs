//! Model client module for text generation
//!
//! This module provides:
//! - `client`: Bedrock text completion client and the `TextGenerator` seam

mod client;

pub use client::{
    BedrockModelClient, CompletionRequest, CompletionResponse, ModelConfig, TextGenerator,
};
