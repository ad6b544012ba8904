use async_trait::async_trait;
use uuid::Uuid;

use hnhype::compare::{render, replay, DEFAULT_MODELS};
use hnhype::models::{Classification, FirstComment, FlowInput, HistoricalRow, StoryItem};
use hnhype::{Classifier, Error, HistorySource, Result};

/// Stored rows held in memory, honouring the limit like the SQL read does.
struct StoredRuns(Vec<HistoricalRow>);

#[async_trait]
impl HistorySource for StoredRuns {
    async fn load(&self, limit: u32) -> Result<Vec<HistoricalRow>> {
        Ok(self.0.iter().take(limit as usize).cloned().collect())
    }
}

/// Answers "AI related" for every model except the ones listed as failing.
struct Scripted {
    failing: Vec<&'static str>,
}

#[async_trait]
impl Classifier for Scripted {
    async fn classify(&self, model: &str, prompt: &str) -> Result<Classification> {
        if self.failing.iter().any(|f| *f == model) {
            return Err(Error::LLMApi(format!("{} unavailable", model)));
        }
        assert!(prompt.contains("hypeMeter"), "detailed rubric expected");
        Ok(Classification {
            is_ai_related: true,
            hype_meter: 8,
            tags: vec!["llm".to_string(), "agents".to_string()],
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn stored_row(id: u64, title: &str, is_ai_related: bool) -> HistoricalRow {
    HistoricalRow {
        run_id: Uuid::new_v4(),
        input: FlowInput {
            url: format!("https://news.ycombinator.com/item?id={}", id),
        },
        item: StoryItem {
            id,
            title: title.to_string(),
            by: "author".to_string(),
            time: 1700000000,
            score: 100,
        },
        first_comment: FirstComment {
            by: "commenter".to_string(),
            text: "Interesting.".to_string(),
        },
        output: Classification {
            is_ai_related,
            hype_meter: 5,
            tags: vec!["llm".to_string()],
        },
    }
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

#[tokio::test]
async fn single_row_with_flipped_ai_flag_is_changed() {
    let history = StoredRuns(vec![
        stored_row(1, "A new database engine", false),
        stored_row(2, "Another row beyond the limit", false),
    ]);

    let rows = history.load(1).await.unwrap();
    assert_eq!(rows.len(), 1);

    let comparisons = replay(&Scripted { failing: vec![] }, rows, &default_models(), false).await;
    assert_eq!(comparisons.len(), 1);
    assert!(comparisons[0].is_changed());

    let report = render(&comparisons);
    assert!(report.contains("A new database engine"));
    assert!(report.contains("Status: CHANGED"));
    assert!(report.contains("Summary: 1 of 1 rows changed"));
    assert!(!report.contains("Model Comparison"));
}

#[tokio::test]
async fn failed_model_is_reported_without_dropping_others() {
    let history = StoredRuns(vec![
        stored_row(1, "GPT agents everywhere", true),
        stored_row(2, "Rust 2.0 announced", false),
    ]);
    let rows = history.load(10).await.unwrap();

    let failing = DEFAULT_MODELS[1];
    let comparisons = replay(
        &Scripted {
            failing: vec![failing],
        },
        rows,
        &default_models(),
        false,
    )
    .await;

    assert_eq!(comparisons.len(), 2);
    for comparison in &comparisons {
        assert_eq!(comparison.outcomes.len(), 3);
        assert_eq!(
            comparison
                .outcomes
                .iter()
                .filter(|o| o.result.is_err())
                .count(),
            1
        );
    }
    assert!(!comparisons[0].is_changed());
    assert!(comparisons[1].is_changed());

    let report = render(&comparisons);
    assert!(report.contains(&format!("ERROR: LLM API error: {} unavailable", failing)));
    assert!(report.contains("=== Model Comparison ==="));
    assert!(report.contains("=== Tag Differences ==="));
    assert!(report.contains(&format!("| {} | 2 | 0 | 50% | +3.00 | 3.00 |", DEFAULT_MODELS[0])));
    assert!(report.contains(&format!("| {} | 2 | 2 | - | - | - |", failing)));
    assert!(report.contains("Summary: 1 of 2 rows changed"));
}
