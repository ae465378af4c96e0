use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("YouTube API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// One page of a collection listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Snapshot of one video as returned by `videos.list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default, rename = "contentDetails")]
    pub content_details: ContentDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snippet {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentDetails {
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub maxres: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    #[serde(rename = "default")]
    pub default_: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

impl Thumbnails {
    /// Highest resolution available: maxres, standard, high, medium, default.
    pub fn best_url(&self) -> Option<&str> {
        [
            &self.maxres,
            &self.standard,
            &self.high,
            &self.medium,
            &self.default_,
        ]
        .into_iter()
        .flatten()
        .map(|t| t.url.as_str())
        .find(|url| !url.is_empty())
    }
}

/// Read side of the upstream video platform.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn list_page(
        &self,
        collection_id: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<ListPage, SourceError>;

    /// At most [`crate::config::MAX_DETAIL_BATCH`] ids per call.
    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<SourceItem>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(rename = "contentDetails")]
    content_details: Option<PlaylistItemDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemDetails {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<SourceItem>,
}

pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let url = format!("{}/{}", API_BASE, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn list_page(
        &self,
        collection_id: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<ListPage, SourceError> {
        let max_results = page_size.to_string();
        let mut query = vec![
            ("part", "contentDetails"),
            ("playlistId", collection_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let resp: PlaylistItemsResponse = self.get_json("playlistItems", &query).await?;
        let video_ids: Vec<String> = resp
            .items
            .into_iter()
            .filter_map(|item| item.content_details?.video_id)
            .filter(|id| !id.is_empty())
            .collect();
        debug!(count = video_ids.len(), "playlistItems page");

        Ok(ListPage {
            video_ids,
            next_page_token: resp.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<SourceItem>, SourceError> {
        let joined = ids.join(",");
        let resp: VideosResponse = self
            .get_json(
                "videos",
                &[("part", "snippet,contentDetails"), ("id", joined.as_str())],
            )
            .await?;
        Ok(resp.items)
    }
}

/// Pull `error.message` out of a Google API error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

// ── Tests ──
