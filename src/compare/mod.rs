pub mod history;
pub mod replay;
pub mod report;

pub use history::{HistorySource, PgHistory};
pub use replay::{replay, ModelOutcome, RowComparison};
pub use report::render;

pub const DEFAULT_MODELS: [&str; 3] = [
    "claude-3-5-haiku-20241022",
    "claude-sonnet-4-20250514",
    "claude-opus-4-20250514",
];
