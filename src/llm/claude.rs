use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::llm::parser::parse_classification;
use crate::llm::provider::Classifier;
use crate::models::Classification;

const TOOL_NAME: &str = "record_classification";

pub struct ClaudeClassifier {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ClaudeMessage<'a>>,
    tools: Vec<ClaudeTool>,
    tool_choice: ToolChoice,
}

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ClaudeTool {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: &'static str,
    name: &'static str,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

impl ClaudeClassifier {
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn classification_from_response(result: ClaudeResponse) -> Result<Classification> {
    if let Some(error) = result.error {
        return Err(Error::LLMApi(error.message));
    }

    if let Some(input) = result
        .content
        .iter()
        .find(|c| c.content_type == "tool_use")
        .and_then(|c| c.input.clone())
    {
        return Classification::from_value(input);
    }

    let text = result
        .content
        .into_iter()
        .filter(|c| c.content_type == "text")
        .filter_map(|c| c.text)
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(Error::LLMApi("Empty response from Claude".to_string()));
    }

    parse_classification(&text)
}

#[async_trait]
impl Classifier for ClaudeClassifier {
    async fn classify(&self, model: &str, prompt: &str) -> Result<Classification> {
        let request_body = ClaudeRequest {
            model,
            max_tokens: 1024,
            messages: vec![ClaudeMessage {
                role: "user",
                content: prompt,
            }],
            tools: vec![ClaudeTool {
                name: TOOL_NAME,
                description: "Record the classification of a Hacker News post.",
                input_schema: Classification::json_schema(),
            }],
            tool_choice: ToolChoice {
                choice_type: "tool",
                name: TOOL_NAME,
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LLMApi(format!(
                "Claude API error ({}): {}",
                status, body
            )));
        }

        let result: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to parse Claude response: {}", e)))?;

        classification_from_response(result)
    }

    fn name(&self) -> &str {
        "Claude"
    }
}
