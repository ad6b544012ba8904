use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid Hacker News item URL: {0}")]
    InvalidItemUrl(String),

    #[error("Hacker News API error: {0}")]
    HnApi(String),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Classification out of shape: {0}")]
    InvalidClassification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Flow error: {0}")]
    Flow(String),

    #[error("Run not found: {0}")]
    RunNotFound(uuid::Uuid),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
