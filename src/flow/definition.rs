//! Declarative flow wiring: named steps and the steps they depend on.
//!
//! Steps must be declared after their dependencies, so declaration order is
//! always a valid execution order. The same definition is used to register
//! the flow with the workflow engine ([`FlowDefinition::to_sql`]) and to run
//! it in-process with [`super::LocalRunner`].

use std::collections::HashSet;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct StepDefinition {
    pub slug: String,
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowDefinition {
    pub slug: String,
    pub steps: Vec<StepDefinition>,
}

impl FlowDefinition {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, slug: &str, depends_on: &[&str]) -> Self {
        self.steps.push(StepDefinition {
            slug: slug.to_string(),
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
        });
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_slug(&self.slug) {
            return Err(Error::Flow(format!("invalid flow slug '{}'", self.slug)));
        }
        if self.steps.is_empty() {
            return Err(Error::Flow(format!("flow '{}' has no steps", self.slug)));
        }

        let mut declared: HashSet<&str> = HashSet::new();
        for step in &self.steps {
            if !is_valid_slug(&step.slug) || step.slug == "run" {
                return Err(Error::Flow(format!("invalid step slug '{}'", step.slug)));
            }
            for dep in &step.depends_on {
                if !declared.contains(dep.as_str()) {
                    return Err(Error::Flow(format!(
                        "step '{}' depends on '{}' which is not declared before it",
                        step.slug, dep
                    )));
                }
            }
            if !declared.insert(step.slug.as_str()) {
                return Err(Error::Flow(format!("duplicate step '{}'", step.slug)));
            }
        }

        Ok(())
    }

    /// Group steps so that every step's dependencies sit in an earlier level.
    pub fn levels(&self) -> Result<Vec<Vec<&StepDefinition>>> {
        self.validate()?;

        let mut levels: Vec<Vec<&StepDefinition>> = Vec::new();
        let mut level_of: Vec<(&str, usize)> = Vec::new();

        for step in &self.steps {
            let level = step
                .depends_on
                .iter()
                .filter_map(|dep| {
                    level_of
                        .iter()
                        .find(|(slug, _)| *slug == dep.as_str())
                        .map(|(_, l)| l + 1)
                })
                .max()
                .unwrap_or(0);

            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(step);
            level_of.push((step.slug.as_str(), level));
        }

        Ok(levels)
    }

    /// Registration statements for the workflow engine.
    pub fn to_sql(&self) -> Result<String> {
        self.validate()?;

        let mut sql = format!("SELECT pgflow.create_flow('{}');\n", self.slug);
        for step in &self.steps {
            if step.depends_on.is_empty() {
                sql.push_str(&format!(
                    "SELECT pgflow.add_step('{}', '{}');\n",
                    self.slug, step.slug
                ));
            } else {
                let deps = step
                    .depends_on
                    .iter()
                    .map(|d| format!("'{}'", d))
                    .collect::<Vec<_>>()
                    .join(", ");
                sql.push_str(&format!(
                    "SELECT pgflow.add_step('{}', '{}', ARRAY[{}]);\n",
                    self.slug, step.slug, deps
                ));
            }
        }
        Ok(sql)
    }
}

// Slugs end up inside SQL literals, so keep them to identifier characters.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 128
        && slug.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
