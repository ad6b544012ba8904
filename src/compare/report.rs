use crate::compare::replay::{ModelOutcome, RowComparison};
use crate::models::Classification;

fn describe(c: &Classification) -> String {
    format!(
        "ai={} hype={:>2} tags=[{}]",
        if c.is_ai_related { "yes" } else { "no " },
        c.hype_meter,
        c.tags.join(", ")
    )
}

fn signed(delta: i32) -> String {
    if delta > 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn format_outcome(outcome: &ModelOutcome, stored: &Classification, width: usize) -> String {
    match &outcome.result {
        Ok(c) => {
            let delta = i32::from(c.hype_meter) - i32::from(stored.hype_meter);
            let added = c.tags_not_in(stored);
            let removed = stored.tags_not_in(c);
            let mut line = format!(
                "  {:<width$}  {} (hype {})",
                outcome.model,
                describe(c),
                signed(delta),
                width = width
            );
            if c.is_ai_related != stored.is_ai_related {
                line.push_str(" [AI FLIP]");
            }
            if !added.is_empty() {
                line.push_str(&format!(" +[{}]", added.join(", ")));
            }
            if !removed.is_empty() {
                line.push_str(&format!(" -[{}]", removed.join(", ")));
            }
            line
        }
        Err(e) => format!("  {:<width$}  ERROR: {}", outcome.model, e, width = width),
    }
}

fn format_row(index: usize, total: usize, comparison: &RowComparison) -> String {
    let row = &comparison.row;
    let mut output = String::new();

    let title = if row.item.is_empty() {
        "(deleted or missing item)"
    } else if row.item.title.is_empty() {
        "(untitled)"
    } else {
        row.item.title.as_str()
    };
    output.push_str(&format!(
        "\n=== [{}/{}] {} ===\n",
        index + 1,
        total,
        title
    ));
    output.push_str(&format!("Run: {}\n", row.run_id));
    output.push_str(&format!("URL: {}\n", row.input.url));
    if let Some(posted) = row.item.posted_at() {
        output.push_str(&format!(
            "Posted: {} by {} ({} points)\n",
            posted.format("%Y-%m-%d %H:%M UTC"),
            row.item.by,
            row.item.score
        ));
    }
    if row.first_comment.is_empty() {
        output.push_str("First comment: (none)\n");
    } else {
        output.push_str(&format!(
            "First comment: {} wrote \"{}\"\n",
            row.first_comment.by,
            truncate(&row.first_comment.text.replace('\n', " "), 120)
        ));
    }

    let width = comparison
        .outcomes
        .iter()
        .map(|o| o.model.len())
        .chain(std::iter::once("stored".len()))
        .max()
        .unwrap_or(0);

    output.push_str(&format!(
        "  {:<width$}  {}\n",
        "stored",
        describe(&row.output),
        width = width
    ));
    for outcome in &comparison.outcomes {
        output.push_str(&format_outcome(outcome, &row.output, width));
        output.push('\n');
    }

    output.push_str(if comparison.is_changed() {
        "Status: CHANGED\n"
    } else {
        "Status: unchanged\n"
    });

    output
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ModelStats {
    pub model: String,
    pub calls: usize,
    pub failures: usize,
    pub agreements: usize,
    pub total_delta: i32,
    pub total_abs_delta: i32,
    pub tags_added: usize,
    pub tags_removed: usize,
}

impl ModelStats {
    fn answered(&self) -> usize {
        self.calls - self.failures
    }

    pub fn agreement_rate(&self) -> Option<f64> {
        (self.answered() > 0).then(|| self.agreements as f64 / self.answered() as f64)
    }

    pub fn average_delta(&self) -> Option<f64> {
        (self.answered() > 0).then(|| f64::from(self.total_delta) / self.answered() as f64)
    }

    pub fn average_abs_delta(&self) -> Option<f64> {
        (self.answered() > 0).then(|| f64::from(self.total_abs_delta) / self.answered() as f64)
    }
}

/// Per-model aggregates in the order models first appear.
pub fn aggregate(comparisons: &[RowComparison]) -> Vec<ModelStats> {
    let mut stats: Vec<ModelStats> = Vec::new();

    for comparison in comparisons {
        let stored = &comparison.row.output;
        for outcome in &comparison.outcomes {
            let index = match stats.iter().position(|s| s.model == outcome.model) {
                Some(i) => i,
                None => {
                    stats.push(ModelStats {
                        model: outcome.model.clone(),
                        ..Default::default()
                    });
                    stats.len() - 1
                }
            };
            let entry = &mut stats[index];
            entry.calls += 1;

            match outcome.classification() {
                Some(c) => {
                    if c.is_ai_related == stored.is_ai_related {
                        entry.agreements += 1;
                    }
                    let delta = i32::from(c.hype_meter) - i32::from(stored.hype_meter);
                    entry.total_delta += delta;
                    entry.total_abs_delta += delta.abs();
                    entry.tags_added += c.tags_not_in(stored).len();
                    entry.tags_removed += stored.tags_not_in(c).len();
                }
                None => entry.failures += 1,
            }
        }
    }

    stats
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn format_aggregates(comparisons: &[RowComparison]) -> String {
    let stats = aggregate(comparisons);
    let mut output = String::new();

    output.push_str("\n=== Model Comparison ===\n\n");
    output.push_str("| Model | Calls | Failed | AI Agreement | Avg Hype Delta | Avg Abs Delta |\n");
    output.push_str("|-------|-------|--------|--------------|----------------|---------------|\n");
    for s in &stats {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            s.model,
            s.calls,
            s.failures,
            or_dash(s.agreement_rate().map(|r| format!("{:.0}%", r * 100.0))),
            or_dash(s.average_delta().map(|d| format!("{:+.2}", d))),
            or_dash(s.average_abs_delta().map(|d| format!("{:.2}", d))),
        ));
    }

    output.push_str("\n=== Tag Differences ===\n\n");
    output.push_str("| Model | Tags Added | Tags Removed |\n");
    output.push_str("|-------|------------|--------------|\n");
    for s in &stats {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            s.model, s.tags_added, s.tags_removed
        ));
    }

    output
}

/// Full comparison report. Aggregate tables only appear for more than one row.
pub fn render(comparisons: &[RowComparison]) -> String {
    let mut output = String::new();

    if comparisons.is_empty() {
        output.push_str("No stored runs to compare.\n");
        return output;
    }

    for (i, comparison) in comparisons.iter().enumerate() {
        output.push_str(&format_row(i, comparisons.len(), comparison));
    }

    if comparisons.len() > 1 {
        output.push_str(&format_aggregates(comparisons));
    }

    let changed = comparisons.iter().filter(|c| c.is_changed()).count();
    output.push_str(&format!(
        "\nSummary: {} of {} rows changed\n",
        changed,
        comparisons.len()
    ));

    output
}
