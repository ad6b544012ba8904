pub mod client;
pub mod html;
pub mod url;

pub use client::{fetch_first_comment, fetch_item, HnApi, HnClient};
pub use html::clean_html;
pub use url::parse_item_id;
