//! Prompt templates

/// Stop sequence that ends the assistant turn
pub const STOP_SEQUENCE: &str = "\n\nHuman:";

/// Console inputs that end an interactive session
pub const EXIT_KEYWORDS: [&str; 2] = ["quit", "exit"];

/// Build the blog-post instruction for a topic
pub fn blog_post_prompt(topic: &str) -> String {
    format!(
        "Write a comprehensive blog post about the topic: {}. \
         Include key insights, current trends, and future implications.",
        topic
    )
}

/// Wrap an instruction in the Human/Assistant turn format expected by the text completion API
pub fn conversational_prompt(prompt: &str) -> String {
    format!("Human: {}\n\nAssistant:", prompt)
}

/// Case-insensitive match against [`EXIT_KEYWORDS`]
pub fn is_exit_keyword(input: &str) -> bool {
    EXIT_KEYWORDS
        .iter()
        .any(|keyword| input.eq_ignore_ascii_case(keyword))
}
