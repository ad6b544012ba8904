pub mod provider;
pub mod claude;
pub mod prompts;
pub mod parser;

pub use provider::Classifier;
pub use claude::ClaudeClassifier;
pub use prompts::{basic_prompt, classify_post, classify_post_detailed, detailed_prompt};
