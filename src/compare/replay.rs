use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};

use crate::llm::{classify_post_detailed, Classifier};
use crate::models::{Classification, HistoricalRow};

/// One model's answer for one stored row. Failures are kept as their message.
#[derive(Debug, Clone)]
pub struct ModelOutcome {
    pub model: String,
    pub result: std::result::Result<Classification, String>,
}

impl ModelOutcome {
    pub fn classification(&self) -> Option<&Classification> {
        self.result.as_ref().ok()
    }

    pub fn agrees_on_ai(&self, stored: &Classification) -> Option<bool> {
        self.classification()
            .map(|c| c.is_ai_related == stored.is_ai_related)
    }

    pub fn hype_delta(&self, stored: &Classification) -> Option<i32> {
        self.classification()
            .map(|c| i32::from(c.hype_meter) - i32::from(stored.hype_meter))
    }
}

#[derive(Debug, Clone)]
pub struct RowComparison {
    pub row: HistoricalRow,
    pub outcomes: Vec<ModelOutcome>,
}

impl RowComparison {
    /// Some model that answered disagrees with the stored `isAiRelated`.
    pub fn is_changed(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.agrees_on_ai(&self.row.output) == Some(false))
    }
}

/// Re-classify every stored row with every model. All calls run concurrently
/// and each outcome is recorded on its own, so one failure never cancels the
/// others.
pub async fn replay(
    classifier: &dyn Classifier,
    rows: Vec<HistoricalRow>,
    models: &[String],
    show_progress: bool,
) -> Vec<RowComparison> {
    let total = (rows.len() * models.len()) as u64;
    let pb = if show_progress {
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} calls")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    tracing::info!(
        "Replaying {} rows against {} models ({} calls)",
        rows.len(),
        models.len(),
        total
    );

    let calls = rows.iter().enumerate().flat_map(|(row_index, row)| {
        let pb = pb.clone();
        models.iter().map(move |model| {
            let pb = pb.clone();
            async move {
                let result = classify_post_detailed(
                    classifier,
                    model,
                    &row.item.title,
                    &row.first_comment.text,
                )
                .await
                .map_err(|e| {
                    tracing::warn!("{} failed on run {}: {}", model, row.run_id, e);
                    e.to_string()
                });
                pb.inc(1);
                (
                    row_index,
                    ModelOutcome {
                        model: model.clone(),
                        result,
                    },
                )
            }
        })
    });

    let results = join_all(calls).await;
    pb.finish_and_clear();

    let mut comparisons: Vec<RowComparison> = rows
        .into_iter()
        .map(|row| RowComparison {
            row,
            outcomes: Vec::with_capacity(models.len()),
        })
        .collect();

    for (row_index, outcome) in results {
        comparisons[row_index].outcomes.push(outcome);
    }

    comparisons
}
