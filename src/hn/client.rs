use async_trait::async_trait;
use reqwest::{header, Client};

use crate::error::{Error, Result};
use crate::hn::html::clean_html;
use crate::hn::url::parse_item_id;
use crate::models::{FirstComment, RawItem, StoryItem};

/// Read access to HN items. `Ok(None)` means the API answered `null`.
#[async_trait]
pub trait HnApi: Send + Sync {
    async fn get_item(&self, id: u64) -> Result<Option<RawItem>>;
}

pub struct HnClient {
    client: Client,
    base_url: String,
}

impl HnClient {
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("hnhype/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl HnApi for HnClient {
    async fn get_item(&self, id: u64) -> Result<Option<RawItem>> {
        let url = format!("{}/item/{}.json", self.base_url, id);
        tracing::debug!("Fetching HN item: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HnApi(format!(
                "Failed to fetch item {}: {} - {}",
                id, status, body
            )));
        }

        let body = response.text().await?;
        serde_json::from_str::<Option<RawItem>>(&body)
            .map_err(|e| Error::HnApi(format!("Item {} has unexpected shape: {}", id, e)))
    }
}

/// Fetch the story behind an item URL. Deleted, dead or missing stories come
/// back as [`StoryItem::empty`].
pub async fn fetch_item(api: &dyn HnApi, url: &str) -> Result<StoryItem> {
    let id = parse_item_id(url)?;
    tracing::info!("Fetching item {}", id);

    match api.get_item(id).await? {
        Some(raw) if !raw.is_gone() => {
            let mut story = StoryItem::from(raw);
            story.id = id;
            Ok(story)
        }
        _ => {
            tracing::info!("Item {} is deleted or dead", id);
            Ok(StoryItem::empty(id))
        }
    }
}

/// Fetch the first child comment of the story behind an item URL, with its
/// text cleaned of HTML. Anything absent along the way yields
/// [`FirstComment::empty`].
pub async fn fetch_first_comment(api: &dyn HnApi, url: &str) -> Result<FirstComment> {
    let id = parse_item_id(url)?;

    let story = match api.get_item(id).await? {
        Some(raw) if !raw.is_gone() => raw,
        _ => return Ok(FirstComment::empty()),
    };

    let Some(&comment_id) = story.kids.first() else {
        tracing::info!("Item {} has no comments", id);
        return Ok(FirstComment::empty());
    };

    tracing::info!("Fetching first comment {} of item {}", comment_id, id);
    match api.get_item(comment_id).await? {
        Some(comment) if !comment.is_gone() => Ok(FirstComment {
            by: comment.by.unwrap_or_default(),
            text: clean_html(comment.text.as_deref().unwrap_or_default()),
        }),
        _ => Ok(FirstComment::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct FixedItems(HashMap<u64, serde_json::Value>);

    #[async_trait]
    impl HnApi for FixedItems {
        async fn get_item(&self, id: u64) -> Result<Option<RawItem>> {
            match self.0.get(&id) {
                Some(v) => Ok(serde_json::from_value(v.clone())?),
                None => Ok(None),
            }
        }
    }

    fn items(entries: Vec<(u64, serde_json::Value)>) -> FixedItems {
        FixedItems(entries.into_iter().collect())
    }

    const URL: &str = "https://news.ycombinator.com/item?id=10";

    #[tokio::test]
    async fn test_fetch_item_populated() {
        let api = items(vec![(
            10,
            json!({"id": 10, "title": "Show HN: a thing", "by": "alice", "time": 1700000000, "score": 12}),
        )]);
        let story = fetch_item(&api, URL).await.unwrap();
        assert_eq!(story.title, "Show HN: a thing");
        assert_eq!(story.by, "alice");
        assert_eq!(story.score, 12);
    }

    #[tokio::test]
    async fn test_fetch_item_dead_is_empty() {
        let api = items(vec![(10, json!({"id": 10, "title": "spam", "dead": true}))]);
        let story = fetch_item(&api, URL).await.unwrap();
        assert_eq!(story, StoryItem::empty(10));
    }

    #[tokio::test]
    async fn test_fetch_item_null_is_empty() {
        let api = items(vec![]);
        let story = fetch_item(&api, URL).await.unwrap();
        assert!(story.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_item_rejects_bad_url() {
        let api = items(vec![]);
        let result = fetch_item(&api, "https://example.com/item?id=10").await;
        assert!(matches!(result, Err(Error::InvalidItemUrl(_))));
    }

    #[tokio::test]
    async fn test_first_comment_cleaned() {
        let api = items(vec![
            (10, json!({"id": 10, "title": "t", "kids": [11, 12]})),
            (11, json!({"id": 11, "by": "bob", "text": "Cool&#x27;s<p>second"})),
        ]);
        let comment = fetch_first_comment(&api, URL).await.unwrap();
        assert_eq!(comment.by, "bob");
        assert_eq!(comment.text, "Cool's\nsecond");
    }

    #[tokio::test]
    async fn test_first_comment_deleted_is_empty() {
        let api = items(vec![
            (10, json!({"id": 10, "title": "t", "kids": [11]})),
            (11, json!({"id": 11, "deleted": true})),
        ]);
        let comment = fetch_first_comment(&api, URL).await.unwrap();
        assert_eq!(comment, FirstComment::empty());
    }

    #[tokio::test]
    async fn test_first_comment_without_kids_is_empty() {
        let api = items(vec![(10, json!({"id": 10, "title": "t"}))]);
        let comment = fetch_first_comment(&api, URL).await.unwrap();
        assert!(comment.is_empty());
    }
}
