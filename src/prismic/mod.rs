//! Destination document store: Prismic Content API for reads, Asset and
//! Migration APIs for writes.

mod client;
pub mod error;
pub mod migration;
pub mod richtext;

use async_trait::async_trait;

pub use client::PrismicClient;
pub use error::StoreError;
pub use migration::{MigrationBatch, MigrationEvent, MigrationReport};

/// Minimal view of a document returned by a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHit {
    pub id: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First document whose `field_path` equals `value`, fetching no extra fields.
    async fn get_first_by_field(
        &self,
        field_path: &str,
        value: &str,
    ) -> Result<Option<DocumentHit>, StoreError>;

    /// Submit every operation in `batch`. Accepted creations are processed
    /// asynchronously by the store and may not be queryable right away.
    async fn migrate(
        &self,
        batch: &MigrationBatch,
        reporter: &mut (dyn FnMut(MigrationEvent) + Send),
    ) -> Result<MigrationReport, StoreError>;
}
