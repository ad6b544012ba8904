use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::flow::definition::FlowDefinition;

/// Executes one step. `input` is `{ "run": <flow input>, "<dep>": <dep output>, ... }`,
/// the same shape the workflow engine hands to its task handlers.
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn run_step(&self, step_slug: &str, input: &Value) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct FlowRunOutput {
    pub flow_slug: String,
    pub input: Value,
    /// Step outputs in declaration order.
    pub outputs: Vec<(String, Value)>,
}

impl FlowRunOutput {
    pub fn output(&self, step_slug: &str) -> Option<&Value> {
        self.outputs
            .iter()
            .find(|(slug, _)| slug == step_slug)
            .map(|(_, v)| v)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("run".to_string(), self.input.clone());
        for (slug, output) in &self.outputs {
            map.insert(slug.clone(), output.clone());
        }
        Value::Object(map)
    }
}

/// Runs a flow inside this process: level by level, the steps of one level
/// concurrently. The first failing step fails the run; nothing is retried.
pub struct LocalRunner;

impl LocalRunner {
    pub async fn run(
        definition: &FlowDefinition,
        handler: &dyn StepHandler,
        flow_input: Value,
    ) -> Result<FlowRunOutput> {
        let levels = definition.levels()?;
        let mut outputs: HashMap<String, Value> = HashMap::new();

        tracing::info!(
            "Running flow '{}' locally ({} steps)",
            definition.slug,
            definition.steps.len()
        );

        for level in levels {
            let futures = level.iter().map(|step| {
                let mut input = Map::new();
                input.insert("run".to_string(), flow_input.clone());
                for dep in &step.depends_on {
                    if let Some(output) = outputs.get(dep) {
                        input.insert(dep.clone(), output.clone());
                    }
                }
                let input = Value::Object(input);
                async move {
                    tracing::info!("Step '{}' started", step.slug);
                    let result = handler.run_step(&step.slug, &input).await;
                    (step.slug.clone(), result)
                }
            });

            let results = join_all(futures).await;
            for (slug, result) in results {
                match result {
                    Ok(output) => {
                        tracing::info!("Step '{}' completed", slug);
                        outputs.insert(slug, output);
                    }
                    Err(e) => {
                        tracing::warn!("Step '{}' failed: {}", slug, e);
                        return Err(Error::Flow(format!("step '{}' failed: {}", slug, e)));
                    }
                }
            }
        }

        let ordered = definition
            .steps
            .iter()
            .filter_map(|s| outputs.remove(&s.slug).map(|v| (s.slug.clone(), v)))
            .collect();

        Ok(FlowRunOutput {
            flow_slug: definition.slug.clone(),
            input: flow_input,
            outputs: ordered,
        })
    }
}
