pub mod pipeline;

pub use pipeline::{analyze_hn_post_flow, AnalyzeHnPost, CLASSIFICATION_STEP, FLOW_SLUG};
