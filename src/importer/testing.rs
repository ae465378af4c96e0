//! In-memory fakes of the upstream platform and the document store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ImportSettings;
use crate::prismic::migration::{OperationKind, OperationStatus, StagedDocument};
use crate::prismic::{
    DocumentHit, DocumentStore, MigrationBatch, MigrationEvent, MigrationReport, StoreError,
};
use crate::youtube::{
    ContentDetails, ListPage, Snippet, SourceError, SourceItem, Thumbnail, Thumbnails, VideoSource,
};

pub fn settings() -> ImportSettings {
    let mut s = ImportSettings::new("UUtest");
    s.api_delay = Duration::ZERO;
    s
}

pub fn video(id: &str, duration: &str) -> SourceItem {
    SourceItem {
        id: id.to_string(),
        snippet: Snippet {
            title: Some(format!("Receta {}", id)),
            description: Some(format!(
                "Receta {id}.\nINGREDIENTES:\n2 huevos\nsal\nPREPARACIÓN:\nbatir\ncuajar"
            )),
            published_at: "2024-05-01T10:00:00Z".parse().ok(),
            thumbnails: Thumbnails {
                high: Some(Thumbnail {
                    url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
                }),
                ..Default::default()
            },
        },
        content_details: ContentDetails {
            duration: Some(duration.to_string()),
        },
    }
}

// ── Fake video source ──

#[derive(Default)]
pub struct FakeSource {
    /// Pages served in order; `None` fails that call.
    pages: Vec<Option<ListPage>>,
    details: HashMap<String, SourceItem>,
    failing_ids: HashSet<String>,
    pub list_calls: Arc<Mutex<Vec<Option<String>>>>,
    pub detail_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page; every page but the last links to the next one.
    pub fn with_page(mut self, ids: &[&str]) -> Self {
        let token = format!("page-{}", self.pages.len());
        if let Some(Some(prev)) = self.pages.last_mut() {
            prev.next_page_token = Some(token);
        }
        self.pages.push(Some(ListPage {
            video_ids: ids.iter().map(|s| s.to_string()).collect(),
            next_page_token: None,
        }));
        self
    }

    pub fn with_failing_page(mut self) -> Self {
        let token = format!("page-{}", self.pages.len());
        if let Some(Some(prev)) = self.pages.last_mut() {
            prev.next_page_token = Some(token);
        }
        self.pages.push(None);
        self
    }

    pub fn with_video(mut self, item: SourceItem) -> Self {
        self.details.insert(item.id.clone(), item);
        self
    }

    /// Any detail batch containing `id` fails.
    pub fn with_failing_detail(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }
}

#[async_trait]
impl VideoSource for FakeSource {
    async fn list_page(
        &self,
        _collection_id: &str,
        _page_size: usize,
        page_token: Option<&str>,
    ) -> Result<ListPage, SourceError> {
        self.list_calls
            .lock()
            .unwrap()
            .push(page_token.map(str::to_string));
        let index = match page_token {
            None => 0,
            Some(t) => t.trim_start_matches("page-").parse().unwrap_or(usize::MAX),
        };
        match self.pages.get(index) {
            Some(Some(page)) => Ok(page.clone()),
            Some(None) => Err(SourceError::Api {
                status: 500,
                message: "backend error".into(),
            }),
            None => Ok(ListPage::default()),
        }
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<SourceItem>, SourceError> {
        self.detail_calls.lock().unwrap().push(ids.to_vec());
        if ids.iter().any(|id| self.failing_ids.contains(id)) {
            return Err(SourceError::Api {
                status: 403,
                message: "quotaExceeded".into(),
            });
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.details.get(id).cloned())
            .collect())
    }
}

// ── Fake document store ──

#[derive(Debug, Clone)]
pub enum QueryFailure {
    Parsing(String),
    Api(u16),
}

#[derive(Debug, Clone)]
pub struct Submitted {
    pub asset_urls: Vec<String>,
    pub documents: Vec<StagedDocument>,
}

#[derive(Default)]
pub struct FakeStore {
    existing: HashSet<String>,
    failures: HashMap<String, QueryFailure>,
    migrate_status: Option<u16>,
    pub queries: Arc<Mutex<Vec<(String, String)>>>,
    pub submitted: Arc<Mutex<Vec<Submitted>>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(mut self, id: &str) -> Self {
        self.existing.insert(id.to_string());
        self
    }

    pub fn with_query_failure(mut self, id: &str, failure: QueryFailure) -> Self {
        self.failures.insert(id.to_string(), failure);
        self
    }

    pub fn with_migrate_failure(mut self, status: u16) -> Self {
        self.migrate_status = Some(status);
        self
    }

    pub fn queried_ids(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, v)| v.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn get_first_by_field(
        &self,
        field_path: &str,
        value: &str,
    ) -> Result<Option<DocumentHit>, StoreError> {
        self.queries
            .lock()
            .unwrap()
            .push((field_path.to_string(), value.to_string()));
        match self.failures.get(value) {
            Some(QueryFailure::Parsing(message)) => Err(StoreError::Parsing {
                message: message.clone(),
            }),
            Some(QueryFailure::Api(status)) => Err(StoreError::Api {
                status: *status,
                body: "{}".into(),
            }),
            None if self.existing.contains(value) => Ok(Some(DocumentHit {
                id: format!("doc-{}", value),
            })),
            None => Ok(None),
        }
    }

    async fn migrate(
        &self,
        batch: &MigrationBatch,
        reporter: &mut (dyn FnMut(MigrationEvent) + Send),
    ) -> Result<MigrationReport, StoreError> {
        if let Some(status) = self.migrate_status {
            reporter(MigrationEvent {
                kind: OperationKind::DocumentCreate,
                status: OperationStatus::Failed,
                message: format!("HTTP {}", status),
            });
            return Err(StoreError::Api {
                status,
                body: r#"{"message":"Forbidden"}"#.into(),
            });
        }

        for asset in batch.assets() {
            reporter(MigrationEvent {
                kind: OperationKind::AssetUpload,
                status: OperationStatus::Done,
                message: asset.url.clone(),
            });
        }
        for doc in batch.documents() {
            reporter(MigrationEvent {
                kind: OperationKind::DocumentCreate,
                status: OperationStatus::Done,
                message: doc.label.clone(),
            });
        }

        self.submitted.lock().unwrap().push(Submitted {
            asset_urls: batch.assets().iter().map(|a| a.url.clone()).collect(),
            documents: batch.documents().to_vec(),
        });
        Ok(MigrationReport {
            assets_created: batch.assets().len(),
            documents_created: batch.documents().len(),
        })
    }
}
