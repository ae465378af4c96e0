use tracing::{error, info};

use crate::prismic::{DocumentStore, MigrationBatch, MigrationEvent, MigrationReport, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing was staged.
    Skipped,
    /// Staged but deliberately not submitted.
    DryRun,
    Submitted(MigrationReport),
    Failed { status: Option<u16> },
}

/// Submit every staged operation in one migration. Failures are logged, never raised.
pub async fn commit<D>(store: &D, batch: &MigrationBatch) -> CommitOutcome
where
    D: DocumentStore + ?Sized,
{
    if batch.is_empty() {
        info!("No new documents to migrate in this run");
        return CommitOutcome::Skipped;
    }

    info!(
        assets = batch.assets().len(),
        documents = batch.documents().len(),
        "Submitting migration"
    );
    let mut reporter = |event: MigrationEvent| {
        info!("  [migration] {} {}: {}", event.kind, event.status, event.message);
    };

    match store.migrate(batch, &mut reporter).await {
        Ok(report) => {
            info!(
                "Migration submitted: {} assets, {} documents. The store processes them asynchronously.",
                report.assets_created, report.documents_created
            );
            CommitOutcome::Submitted(report)
        }
        Err(e) => {
            log_commit_error(&e);
            CommitOutcome::Failed { status: e.status() }
        }
    }
}

fn log_commit_error(e: &StoreError) {
    error!("Migration failed: {}", e);
    if let Some(status) = e.status() {
        error!("  status: {}", status);
    }
    if let Some(body) = e.body() {
        error!("  response: {}", body);
    }
    let cause = e.cause();
    if !cause.is_empty() {
        error!("  cause: {}", cause);
    }
    if e.is_forbidden() {
        error!("  403 received: check that PRISMIC_WRITE_TOKEN is valid and has write permission");
    }
}
