use crate::error::Result;
use crate::llm::provider::Classifier;
use crate::models::Classification;

const BASIC_INSTRUCTION: &str = "Classify this Hacker News post. Decide whether it is related to AI, \
rate how hyped it is on a scale of 1 to 10, and give at most three short tags.";

const DETAILED_INSTRUCTION: &str = r#"You are classifying a Hacker News post using its title and the first comment.

Decide the following:

1. isAiRelated: true when the post is primarily about artificial intelligence, machine learning,
   large language models, AI products or AI companies. Posts that merely mention AI in passing are
   not AI-related.

2. hypeMeter: an integer from 1 to 10 rating how sensational the content is.
   1-2: sober, factual, technical detail with no grand claims
   3-4: mildly enthusiastic, measured claims
   5-6: noticeable excitement or marketing language
   7-8: bold claims, "game changer", "revolutionary", big promises
   9-10: pure hype, extraordinary claims without evidence
   Judge the tone of the title and the comment together. A skeptical comment on a hyped title
   lowers the score slightly.

3. tags: up to three short, lowercase topic tags (for example "llm", "hardware", "startups").
   Prefer specific tags over generic ones. Use fewer tags if the post is narrow."#;

fn or_none(text: &str) -> &str {
    if text.trim().is_empty() {
        "(none)"
    } else {
        text
    }
}

pub fn basic_prompt(title: &str, comment: &str) -> String {
    format!(
        "{}\n\nTitle: {}\nFirst comment: {}",
        BASIC_INSTRUCTION,
        or_none(title),
        or_none(comment)
    )
}

pub fn detailed_prompt(title: &str, comment: &str) -> String {
    format!(
        "{}\n\nTitle:\n{}\n\nFirst comment:\n{}\n\nRespond with the classification only.",
        DETAILED_INSTRUCTION,
        or_none(title),
        or_none(comment)
    )
}

/// Classify a post with the fixed instruction used by the pipeline.
pub async fn classify_post(
    classifier: &dyn Classifier,
    model: &str,
    title: &str,
    comment: &str,
) -> Result<Classification> {
    let prompt = basic_prompt(title, comment);
    tracing::debug!("Classifying with {} ({} chars)", model, prompt.len());
    classifier.classify(model, &prompt).await
}

/// Same as [`classify_post`] but with the detailed rubric.
pub async fn classify_post_detailed(
    classifier: &dyn Classifier,
    model: &str,
    title: &str,
    comment: &str,
) -> Result<Classification> {
    let prompt = detailed_prompt(title, comment);
    tracing::debug!("Classifying with {} ({} chars, detailed)", model, prompt.len());
    classifier.classify(model, &prompt).await
}
