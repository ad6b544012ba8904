use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Item as returned by the public HN API. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawItem {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub kids: Vec<u64>,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub deleted: bool,
}

impl RawItem {
    pub fn is_gone(&self) -> bool {
        self.dead || self.deleted
    }
}

/// Output of the `item` step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoryItem {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub score: i64,
}

impl StoryItem {
    /// Sentinel for a deleted, dead or missing story.
    pub fn empty(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.by.is_empty()
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        if self.time <= 0 {
            return None;
        }
        Utc.timestamp_opt(self.time, 0).single()
    }
}

impl From<RawItem> for StoryItem {
    fn from(raw: RawItem) -> Self {
        Self {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            by: raw.by.unwrap_or_default(),
            time: raw.time.unwrap_or_default(),
            score: raw.score.unwrap_or_default(),
        }
    }
}

/// Output of the `firstComment` step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FirstComment {
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub text: String,
}

impl FirstComment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.by.is_empty() && self.text.is_empty()
    }
}
