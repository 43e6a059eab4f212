mod client;
mod prompt;
mod types;

pub use client::OpenRouterClient;
pub use prompt::{build_topic_prompt, parse_suggestions};
