use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::flow::{FlowDefinition, StepHandler};
use crate::hn::{fetch_first_comment, fetch_item, HnApi};
use crate::llm::{classify_post, Classifier};
use crate::models::{FirstComment, FlowInput, StoryItem};

pub const FLOW_SLUG: &str = "analyze_hn_post";
pub const ITEM_STEP: &str = "item";
pub const FIRST_COMMENT_STEP: &str = "firstComment";
pub const CLASSIFICATION_STEP: &str = "classification";

/// item and firstComment only need the run input; classification needs both.
pub fn analyze_hn_post_flow() -> FlowDefinition {
    FlowDefinition::new(FLOW_SLUG)
        .step(ITEM_STEP, &[])
        .step(FIRST_COMMENT_STEP, &[])
        .step(CLASSIFICATION_STEP, &[ITEM_STEP, FIRST_COMMENT_STEP])
}

/// Task handlers for the `analyze_hn_post` flow.
pub struct AnalyzeHnPost {
    hn: Arc<dyn HnApi>,
    classifier: Arc<dyn Classifier>,
    model: String,
}

impl AnalyzeHnPost {
    pub fn new(
        hn: impl HnApi + 'static,
        classifier: impl Classifier + 'static,
        model: impl Into<String>,
    ) -> Self {
        Self {
            hn: Arc::new(hn),
            classifier: Arc::new(classifier),
            model: model.into(),
        }
    }

    fn run_input(input: &Value) -> Result<FlowInput> {
        let run = input
            .get("run")
            .cloned()
            .ok_or_else(|| Error::Flow("step input has no run payload".to_string()))?;
        serde_json::from_value(run)
            .map_err(|e| Error::Flow(format!("run input out of shape: {}", e)))
    }

    fn dependency<T: serde::de::DeserializeOwned>(input: &Value, slug: &str) -> Result<T> {
        let value = input
            .get(slug)
            .cloned()
            .ok_or_else(|| Error::Flow(format!("missing output of step '{}'", slug)))?;
        serde_json::from_value(value)
            .map_err(|e| Error::Flow(format!("output of step '{}' out of shape: {}", slug, e)))
    }
}

#[async_trait]
impl StepHandler for AnalyzeHnPost {
    async fn run_step(&self, step_slug: &str, input: &Value) -> Result<Value> {
        match step_slug {
            ITEM_STEP => {
                let run = Self::run_input(input)?;
                let item = fetch_item(self.hn.as_ref(), &run.url).await?;
                Ok(serde_json::to_value(item)?)
            }
            FIRST_COMMENT_STEP => {
                let run = Self::run_input(input)?;
                let comment = fetch_first_comment(self.hn.as_ref(), &run.url).await?;
                Ok(serde_json::to_value(comment)?)
            }
            CLASSIFICATION_STEP => {
                let item: StoryItem = Self::dependency(input, ITEM_STEP)?;
                let comment: FirstComment = Self::dependency(input, FIRST_COMMENT_STEP)?;
                let classification = classify_post(
                    self.classifier.as_ref(),
                    &self.model,
                    &item.title,
                    &comment.text,
                )
                .await?;
                tracing::info!(
                    "Item {} classified: ai={} hype={}",
                    item.id,
                    classification.is_ai_related,
                    classification.hype_meter
                );
                Ok(serde_json::to_value(classification)?)
            }
            other => Err(Error::Flow(format!(
                "flow '{}' has no step '{}'",
                FLOW_SLUG, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, RawItem};
    use serde_json::json;
    use std::sync::Mutex;

    type Prompts = Arc<Mutex<Vec<String>>>;

    struct NoItems;

    #[async_trait]
    impl HnApi for NoItems {
        async fn get_item(&self, _id: u64) -> Result<Option<RawItem>> {
            Ok(None)
        }
    }

    struct CapturingClassifier(Prompts);

    #[async_trait]
    impl Classifier for CapturingClassifier {
        async fn classify(&self, model: &str, prompt: &str) -> Result<Classification> {
            self.0.lock().unwrap().push(format!("{}|{}", model, prompt));
            Ok(Classification {
                is_ai_related: false,
                hype_meter: 1,
                tags: vec![],
            })
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    #[test]
    fn test_flow_shape() {
        let flow = analyze_hn_post_flow();
        flow.validate().unwrap();
        let levels = flow.levels().unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1][0].slug, CLASSIFICATION_STEP);
    }

    #[tokio::test]
    async fn test_classification_uses_dependency_outputs() {
        let prompts = Prompts::default();
        let handler = AnalyzeHnPost::new(NoItems, CapturingClassifier(prompts.clone()), "test-model");
        let input = json!({
            "run": {"url": "https://news.ycombinator.com/item?id=5"},
            "item": {"id": 5, "title": "Neural nets in 10 lines", "by": "x", "time": 0, "score": 1},
            "firstComment": {"by": "y", "text": "Nice"}
        });
        let output = handler.run_step(CLASSIFICATION_STEP, &input).await.unwrap();
        assert_eq!(output["hypeMeter"], 1);

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("test-model|"));
        assert!(prompts[0].contains("Neural nets in 10 lines"));
        assert!(prompts[0].contains("Nice"));
    }

    #[tokio::test]
    async fn test_unknown_step() {
        let handler = AnalyzeHnPost::new(
            NoItems,
            CapturingClassifier(Prompts::default()),
            "m",
        );
        let result = handler.run_step("summary", &json!({})).await;
        assert!(matches!(result, Err(Error::Flow(_))));
    }

    #[tokio::test]
    async fn test_missing_run_input() {
        let handler = AnalyzeHnPost::new(
            NoItems,
            CapturingClassifier(Prompts::default()),
            "m",
        );
        let result = handler.run_step(ITEM_STEP, &json!({"run": {}})).await;
        assert!(matches!(result, Err(Error::Flow(_))));
    }
}
