use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPool;

use crate::analysis::{CLASSIFICATION_STEP, FLOW_SLUG};
use crate::error::Result;
use crate::models::HistoricalRow;

/// Previously stored classification runs, newest first.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn load(&self, limit: u32) -> Result<Vec<HistoricalRow>>;
}

// One JSON object per completed classification task: the run input, the
// outputs of the step's dependencies keyed by slug, and the step's own output.
const HISTORY_QUERY: &str = r#"
SELECT jsonb_build_object(
    'run_id', r.run_id,
    'input', r.input,
    'item', deps.outputs -> 'item',
    'firstComment', deps.outputs -> 'firstComment',
    'output', t.output
) AS history_row
FROM pgflow.step_tasks t
JOIN pgflow.runs r ON r.run_id = t.run_id
CROSS JOIN LATERAL (
    SELECT COALESCE(jsonb_object_agg(d.dep_slug, dt.output), '{}'::jsonb) AS outputs
    FROM pgflow.deps d
    JOIN pgflow.step_tasks dt
      ON dt.run_id = t.run_id
     AND dt.step_slug = d.dep_slug
     AND dt.status = 'completed'
    WHERE d.flow_slug = t.flow_slug AND d.step_slug = t.step_slug
) deps
WHERE t.flow_slug = $1
  AND t.step_slug = $2
  AND t.status = 'completed'
ORDER BY t.completed_at DESC
LIMIT $3
"#;

pub struct PgHistory {
    pool: PgPool,
}

impl PgHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistorySource for PgHistory {
    async fn load(&self, limit: u32) -> Result<Vec<HistoricalRow>> {
        let rows: Vec<(Value,)> = sqlx::query_as(HISTORY_QUERY)
            .bind(FLOW_SLUG)
            .bind(CLASSIFICATION_STEP)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        tracing::info!("Loaded {} stored runs", rows.len());
        Ok(parse_rows(rows.into_iter().map(|(v,)| v)))
    }
}

/// Rows that no longer match the current shapes (older flow versions) are
/// skipped with a warning.
fn parse_rows(values: impl Iterator<Item = Value>) -> Vec<HistoricalRow> {
    values
        .filter_map(|value| match serde_json::from_value::<HistoricalRow>(value) {
            Ok(row) => match row.output.validate() {
                Ok(()) => Some(row),
                Err(e) => {
                    tracing::warn!("Skipping run {}: {}", row.run_id, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Skipping stored row: {}", e);
                None
            }
        })
        .collect()
}
