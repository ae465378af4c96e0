use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Placeholder key written into document data where an uploaded asset id goes.
const ASSET_REF_KEY: &str = "__migration_asset";

/// Handle to an asset registered in a [`MigrationBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AssetRef {
    #[serde(rename = "__migration_asset")]
    index: usize,
}

impl AssetRef {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Remote file the store fetches and hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAsset {
    pub url: String,
    pub filename: String,
    pub alt: Option<String>,
}

/// Document creation waiting in a batch.
#[derive(Debug, Clone)]
pub struct StagedDocument {
    pub label: String,
    pub doc_type: String,
    pub lang: String,
    pub data: Map<String, Value>,
}

/// Pending operations for one run, submitted together.
#[derive(Debug, Default)]
pub struct MigrationBatch {
    assets: Vec<StagedAsset>,
    documents: Vec<StagedDocument>,
}

impl MigrationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a remote asset. The same URL registered twice yields the same handle.
    pub fn create_asset(
        &mut self,
        url: &str,
        filename: &str,
        alt: Option<&str>,
    ) -> Result<AssetRef, StagingError> {
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(StagingError::InvalidAssetUrl(url.to_string()));
        }
        if let Some(index) = self.assets.iter().position(|a| a.url == url) {
            return Ok(AssetRef { index });
        }
        self.assets.push(StagedAsset {
            url: url.to_string(),
            filename: filename.to_string(),
            alt: alt.map(str::to_string),
        });
        Ok(AssetRef {
            index: self.assets.len() - 1,
        })
    }

    /// Queue a creation. `data` must serialize to a JSON object; null fields are dropped.
    pub fn create_document<T: Serialize>(
        &mut self,
        doc_type: &str,
        lang: &str,
        data: &T,
        label: &str,
    ) -> Result<(), StagingError> {
        let data = match serde_json::to_value(data).map_err(StagingError::Serialize)? {
            Value::Object(map) => strip_nulls(map),
            other => return Err(StagingError::NotAnObject(json_kind(&other))),
        };
        self.documents.push(StagedDocument {
            label: label.to_string(),
            doc_type: doc_type.to_string(),
            lang: lang.to_string(),
            data,
        });
        Ok(())
    }

    pub fn assets(&self) -> &[StagedAsset] {
        &self.assets
    }

    pub fn documents(&self) -> &[StagedDocument] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.documents.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("asset URL is not http(s): {0:?}")]
    InvalidAssetUrl(String),
    #[error("document data is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
    #[error("document data could not be serialized")]
    Serialize(#[source] serde_json::Error),
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Drop top-level keys whose value is `null`.
pub fn strip_nulls(mut data: Map<String, Value>) -> Map<String, Value> {
    let nulls: Vec<String> = data
        .iter()
        .filter(|(_, v)| v.is_null())
        .map(|(k, _)| k.clone())
        .collect();
    for key in nulls {
        data.remove(&key);
    }
    data
}

/// Swap asset placeholders for `{"id": ..}` image links.
/// Placeholders whose asset never uploaded are removed.
pub fn resolve_asset_refs(data: &Map<String, Value>, uploaded: &HashMap<usize, String>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in data {
        match placeholder_index(value) {
            Some(index) => {
                if let Some(id) = uploaded.get(&index) {
                    out.insert(key.clone(), serde_json::json!({ "id": id }));
                }
            }
            None => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    out
}

fn placeholder_index(value: &Value) -> Option<usize> {
    let obj = value.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.get(ASSET_REF_KEY)?.as_u64().map(|i| i as usize)
}

// ── Progress reporting ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    AssetUpload,
    DocumentCreate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Started,
    Done,
    Failed,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::AssetUpload => "asset.create",
            OperationKind::DocumentCreate => "document.create",
        })
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationStatus::Started => "start",
            OperationStatus::Done => "end",
            OperationStatus::Failed => "failed",
        })
    }
}

/// Per-operation progress emitted while a batch is submitted.
#[derive(Debug, Clone)]
pub struct MigrationEvent {
    pub kind: OperationKind,
    pub status: OperationStatus,
    pub message: String,
}

/// Counts of operations the store accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub assets_created: usize,
    pub documents_created: usize,
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Article {
        title: String,
        featured_image: Option<AssetRef>,
        publication_date: Option<String>,
    }

    #[test]
    fn null_thumbnail_is_stripped() {
        let mut batch = MigrationBatch::new();
        let article = Article {
            title: "Gazpacho".into(),
            featured_image: None,
            publication_date: None,
        };
        batch
            .create_document("videoarticle", "es-es", &article, "YT Import: Gazpacho")
            .unwrap();
        let doc = &batch.documents()[0];
        assert!(!doc.data.contains_key("featured_image"));
        assert!(!doc.data.contains_key("publication_date"));
        assert_eq!(doc.data["title"], json!("Gazpacho"));
        assert_eq!(doc.label, "YT Import: Gazpacho");
    }

    #[test]
    fn same_url_registers_once() {
        let mut batch = MigrationBatch::new();
        let a = batch
            .create_asset("https://i.ytimg.com/vi/x/maxresdefault.jpg", "x.jpg", Some("X"))
            .unwrap();
        let b = batch
            .create_asset("https://i.ytimg.com/vi/x/maxresdefault.jpg", "x.jpg", Some("X"))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(batch.assets().len(), 1);
        assert!(batch.create_asset("ftp://nope", "n.jpg", None).is_err());
    }

    #[test]
    fn non_object_data_rejected() {
        let mut batch = MigrationBatch::new();
        let err = batch
            .create_document("videoarticle", "es-es", &vec![1, 2], "label")
            .unwrap_err();
        assert!(matches!(err, StagingError::NotAnObject("array")));
        assert!(batch.is_empty());
    }

    #[test]
    fn placeholders_resolve_or_vanish() {
        let mut batch = MigrationBatch::new();
        let uploaded_ref = batch.create_asset("https://a/1.jpg", "1.jpg", None).unwrap();
        let lost_ref = batch.create_asset("https://a/2.jpg", "2.jpg", None).unwrap();

        let data = json!({
            "featured_image": uploaded_ref,
            "social_card_image": lost_ref,
            "youtube_video_id": "abc",
        });
        let data = data.as_object().unwrap().clone();

        let uploaded = HashMap::from([(uploaded_ref.index(), "ZxY123".to_string())]);
        let resolved = resolve_asset_refs(&data, &uploaded);
        assert_eq!(resolved["featured_image"], json!({"id": "ZxY123"}));
        assert!(!resolved.contains_key("social_card_image"));
        assert_eq!(resolved["youtube_video_id"], json!("abc"));
    }
}
