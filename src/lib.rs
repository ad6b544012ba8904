pub mod config;
pub mod error;
pub mod models;
pub mod hn;
pub mod llm;
pub mod flow;
pub mod analysis;
pub mod compare;

pub use config::{CompareConfig, Config};
pub use error::{Error, Result};
pub use hn::{HnApi, HnClient};
pub use llm::{ClaudeClassifier, Classifier};
pub use flow::{FlowClient, FlowDefinition, LocalRunner, StepHandler};
pub use analysis::AnalyzeHnPost;
pub use compare::{HistorySource, PgHistory};
