use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classification::Classification;
use super::hn::{FirstComment, StoryItem};

/// Input a run of the classification flow is started with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowInput {
    pub url: String,
}

/// One completed run as stored by the workflow engine: the run input, the
/// outputs of the classification step's dependencies, and its own output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalRow {
    pub run_id: Uuid,
    pub input: FlowInput,
    pub item: StoryItem,
    #[serde(rename = "firstComment")]
    pub first_comment: FirstComment,
    pub output: Classification,
}
