//! Configuration module for content_gen
//!
//! This module contains:
//! - `settings`: Environment-backed settings for the model and the log table
//! - `prompts`: Prompt templates and console keywords

mod prompts;
mod settings;

pub use prompts::{blog_post_prompt, conversational_prompt, is_exit_keyword, EXIT_KEYWORDS, STOP_SEQUENCE};
pub use settings::{Settings, SETTINGS};
