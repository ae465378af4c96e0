use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::migration::{
    resolve_asset_refs, MigrationBatch, MigrationEvent, MigrationReport, OperationKind,
    OperationStatus, StagedAsset, StagedDocument,
};
use super::{DocumentHit, DocumentStore, StoreError};
use crate::config::Settings;

const ASSET_API_URL: &str = "https://asset-api.prismic.io/assets";
const MIGRATION_API_URL: &str = "https://migration.prismic.io/documents";

/// Spacing between write calls; the write APIs reject bursts.
const WRITE_DELAY: Duration = Duration::from_millis(1500);

pub struct PrismicClient {
    client: reqwest::Client,
    api_endpoint: String,
    repository: String,
    token: String,
    migration_api_key: Option<String>,
    write_delay: Duration,
    master_ref: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    ref_: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

impl PrismicClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_endpoint: settings.prismic_api_endpoint.trim_end_matches('/').to_string(),
            repository: settings.prismic_repo_name.clone(),
            token: settings.prismic_write_token.clone(),
            migration_api_key: settings.prismic_migration_api_key.clone(),
            write_delay: WRITE_DELAY,
            master_ref: OnceCell::new(),
        })
    }

    async fn master_ref(&self) -> Result<&str, StoreError> {
        let r = self
            .master_ref
            .get_or_try_init(|| async {
                let resp = self
                    .client
                    .get(&self.api_endpoint)
                    .query(&[("access_token", self.token.as_str())])
                    .send()
                    .await?;
                let info: ApiInfo = check(resp).await?.json().await?;
                info.refs
                    .into_iter()
                    .find(|r| r.is_master_ref)
                    .map(|r| r.ref_)
                    .ok_or_else(|| StoreError::Response("API info has no master ref".into()))
            })
            .await?;
        Ok(r.as_str())
    }
}

/// Write calls made by a migration, one request each.
#[async_trait]
trait WriteApi: Sync {
    async fn upload_asset(&self, asset: &StagedAsset) -> Result<String, StoreError>;

    async fn create_document(
        &self,
        doc: &StagedDocument,
        data: Map<String, Value>,
    ) -> Result<String, StoreError>;
}

#[async_trait]
impl WriteApi for PrismicClient {
    async fn upload_asset(&self, asset: &StagedAsset) -> Result<String, StoreError> {
        let source = self.client.get(&asset.url).send().await?;
        if !source.status().is_success() {
            return Err(StoreError::AssetFetch {
                url: asset.url.clone(),
                status: source.status().as_u16(),
            });
        }
        let content_type = source
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = source.bytes().await?;

        let part = Part::bytes(bytes.to_vec())
            .file_name(asset.filename.clone())
            .mime_str(&content_type)?;
        let mut form = Form::new().part("file", part);
        if let Some(alt) = &asset.alt {
            form = form.text("alt", alt.clone());
        }

        let resp = self
            .client
            .post(ASSET_API_URL)
            .bearer_auth(&self.token)
            .header("repository", &self.repository)
            .multipart(form)
            .send()
            .await?;
        let created: CreatedResponse = check(resp).await?.json().await?;
        Ok(created.id)
    }

    async fn create_document(
        &self,
        doc: &StagedDocument,
        data: Map<String, Value>,
    ) -> Result<String, StoreError> {
        let body = serde_json::json!({
            "title": doc.label,
            "type": doc.doc_type,
            "lang": doc.lang,
            "data": data,
        });

        let mut req = self
            .client
            .post(MIGRATION_API_URL)
            .bearer_auth(&self.token)
            .header("repository", &self.repository)
            .json(&body);
        if let Some(key) = &self.migration_api_key {
            req = req.header("x-api-key", key);
        }

        let created: CreatedResponse = check(req.send().await?).await?.json().await?;
        Ok(created.id)
    }
}

#[async_trait]
impl DocumentStore for PrismicClient {
    async fn get_first_by_field(
        &self,
        field_path: &str,
        value: &str,
    ) -> Result<Option<DocumentHit>, StoreError> {
        let master = self.master_ref().await?;
        let q = at_predicate(field_path, value);
        let fetch = fetch_field(field_path);
        let url = format!("{}/documents/search", self.api_endpoint);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("ref", master),
                ("q", q.as_str()),
                ("pageSize", "1"),
                ("fetch", fetch),
                ("access_token", self.token.as_str()),
            ])
            .send()
            .await?;
        let found: SearchResponse = check(resp).await?.json().await?;

        Ok(found
            .results
            .into_iter()
            .next()
            .map(|r| DocumentHit { id: r.id }))
    }

    async fn migrate(
        &self,
        batch: &MigrationBatch,
        reporter: &mut (dyn FnMut(MigrationEvent) + Send),
    ) -> Result<MigrationReport, StoreError> {
        run_migration(self, batch, reporter, self.write_delay).await
    }
}

/// Upload assets, then create documents with their placeholders resolved.
/// A thumbnail source that cannot be fetched only costs that image; any other
/// failure stops the migration.
async fn run_migration<W>(
    api: &W,
    batch: &MigrationBatch,
    reporter: &mut (dyn FnMut(MigrationEvent) + Send),
    write_delay: Duration,
) -> Result<MigrationReport, StoreError>
where
    W: WriteApi + ?Sized,
{
    let mut report = MigrationReport::default();
    let mut uploaded: HashMap<usize, String> = HashMap::new();
    let mut first_call = true;

    for (index, asset) in batch.assets().iter().enumerate() {
        if !std::mem::take(&mut first_call) {
            tokio::time::sleep(write_delay).await;
        }
        emit(reporter, OperationKind::AssetUpload, OperationStatus::Started, &asset.url);
        match api.upload_asset(asset).await {
            Ok(id) => {
                emit(reporter, OperationKind::AssetUpload, OperationStatus::Done, &id);
                uploaded.insert(index, id);
                report.assets_created += 1;
            }
            Err(e @ StoreError::AssetFetch { .. }) => {
                warn!(error = %e, "Asset skipped; documents using it are created without the image");
                emit(reporter, OperationKind::AssetUpload, OperationStatus::Failed, &e.to_string());
            }
            Err(e) => {
                emit(reporter, OperationKind::AssetUpload, OperationStatus::Failed, &e.to_string());
                return Err(e);
            }
        }
    }

    for doc in batch.documents() {
        if !std::mem::take(&mut first_call) {
            tokio::time::sleep(write_delay).await;
        }
        emit(reporter, OperationKind::DocumentCreate, OperationStatus::Started, &doc.label);
        let data = resolve_asset_refs(&doc.data, &uploaded);
        match api.create_document(doc, data).await {
            Ok(id) => {
                debug!(document_id = %id, "document accepted");
                emit(
                    reporter,
                    OperationKind::DocumentCreate,
                    OperationStatus::Done,
                    &format!("{} ({})", doc.label, id),
                );
                report.documents_created += 1;
            }
            Err(e) => {
                emit(reporter, OperationKind::DocumentCreate, OperationStatus::Failed, &e.to_string());
                return Err(e);
            }
        }
    }

    Ok(report)
}

fn emit(
    reporter: &mut (dyn FnMut(MigrationEvent) + Send),
    kind: OperationKind,
    status: OperationStatus,
    message: &str,
) {
    reporter(MigrationEvent {
        kind,
        status,
        message: message.to_string(),
    });
}

/// `[[at(path, "value")]]` with the value quoted for the predicate language.
fn at_predicate(field_path: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[[at({}, \"{}\")]]", field_path, escaped)
}

/// `fetch` restriction for a query on `my.<type>.<field>`: only that field comes back.
fn fetch_field(field_path: &str) -> &str {
    field_path.strip_prefix("my.").unwrap_or(field_path)
}

/// Map non-success responses to [`StoreError`], singling out predicate parsing errors.
async fn check(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(classify_error_body(status.as_u16(), body))
}

fn classify_error_body(status: u16, body: String) -> StoreError {
    if status == 400 {
        if let Ok(ApiErrorBody {
            kind: Some(kind),
            message,
        }) = serde_json::from_str::<ApiErrorBody>(&body)
        {
            if kind == "parsing-error" {
                return StoreError::Parsing {
                    message: message.unwrap_or(body),
                };
            }
        }
    }
    StoreError::Api { status, body }
}
