use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const HYPE_MIN: u8 = 1;
pub const HYPE_MAX: u8 = 10;
pub const MAX_TAGS: usize = 3;

/// Output of the `classification` step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub is_ai_related: bool,
    pub hype_meter: u8,
    pub tags: Vec<String>,
}

impl Classification {
    pub fn validate(&self) -> Result<()> {
        if !(HYPE_MIN..=HYPE_MAX).contains(&self.hype_meter) {
            return Err(Error::InvalidClassification(format!(
                "hypeMeter must be between {} and {}, got {}",
                HYPE_MIN, HYPE_MAX, self.hype_meter
            )));
        }
        if self.tags.len() > MAX_TAGS {
            return Err(Error::InvalidClassification(format!(
                "at most {} tags allowed, got {}",
                MAX_TAGS,
                self.tags.len()
            )));
        }
        Ok(())
    }

    /// Deserialize and validate in one go.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let classification: Classification = serde_json::from_value(value)
            .map_err(|e| Error::InvalidClassification(e.to_string()))?;
        classification.validate()?;
        Ok(classification)
    }

    /// Tags present here but not in `other`, compared case-insensitively.
    pub fn tags_not_in(&self, other: &Classification) -> Vec<String> {
        self.tags
            .iter()
            .filter(|t| !other.tags.iter().any(|o| o.eq_ignore_ascii_case(t)))
            .cloned()
            .collect()
    }

    /// JSON schema handed to the LLM as the structured response shape.
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "isAiRelated": {
                    "type": "boolean",
                    "description": "Whether the post is about AI, ML or LLMs"
                },
                "hypeMeter": {
                    "type": "integer",
                    "minimum": HYPE_MIN,
                    "maximum": HYPE_MAX,
                    "description": "How sensational the content is, 1 (sober) to 10 (pure hype)"
                },
                "tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "maxItems": MAX_TAGS,
                    "description": "Up to three short topic tags"
                }
            },
            "required": ["isAiRelated", "hypeMeter", "tags"]
        })
    }
}
