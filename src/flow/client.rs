use serde::Serialize;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Thin client for the workflow engine's SQL interface: start a run, read run
/// and step status, read a step's output. Scheduling and retries stay in the
/// engine.
#[derive(Clone)]
pub struct FlowClient {
    pool: PgPool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StepStatus {
    pub step_slug: String,
    pub status: String,
    pub remaining_tasks: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunStatus {
    pub run_id: Uuid,
    pub flow_slug: String,
    pub status: String,
    pub remaining_steps: i32,
    pub steps: Vec<StepStatus>,
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed")
    }
}

#[derive(sqlx::FromRow)]
struct RunRow {
    run_id: Uuid,
    flow_slug: String,
    status: String,
    remaining_steps: i32,
}

impl FlowClient {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        tracing::debug!("Connected to workflow database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn start_run(&self, flow_slug: &str, input: &Value) -> Result<Uuid> {
        let (run_id,): (Uuid,) = sqlx::query_as(
            "SELECT run_id FROM pgflow.start_flow(flow_slug => $1, input => $2)",
        )
        .bind(flow_slug)
        .bind(Json(input))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Started run {} of flow '{}'", run_id, flow_slug);
        Ok(run_id)
    }

    pub async fn run_status(&self, run_id: Uuid) -> Result<RunStatus> {
        let run: RunRow = sqlx::query_as(
            "SELECT run_id, flow_slug, status, remaining_steps FROM pgflow.runs WHERE run_id = $1",
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::RunNotFound(run_id))?;

        let steps: Vec<StepStatus> = sqlx::query_as(
            r#"
            SELECT ss.step_slug, ss.status, ss.remaining_tasks
            FROM pgflow.step_states ss
            JOIN pgflow.steps s
              ON s.flow_slug = ss.flow_slug AND s.step_slug = ss.step_slug
            WHERE ss.run_id = $1
            ORDER BY s.step_index
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(RunStatus {
            run_id: run.run_id,
            flow_slug: run.flow_slug,
            status: run.status,
            remaining_steps: run.remaining_steps,
            steps,
        })
    }

    /// Output of a step's completed task, if there is one yet.
    pub async fn step_output(&self, run_id: Uuid, step_slug: &str) -> Result<Option<Value>> {
        let row: Option<(Option<Value>,)> = sqlx::query_as(
            r#"
            SELECT output
            FROM pgflow.step_tasks
            WHERE run_id = $1 AND step_slug = $2 AND status = 'completed'
            ORDER BY task_index
            LIMIT 1
            "#,
        )
        .bind(run_id)
        .bind(step_slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|(output,)| output))
    }
}
