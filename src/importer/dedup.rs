use tracing::{debug, error, warn};

use crate::prismic::{DocumentStore, StoreError};

/// Result of the existence check for one video id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupVerdict {
    Found,
    NotFound,
    /// Query hit the known unrecognized-field defect; presence is unknown and
    /// the video is imported anyway.
    AssumedAbsent,
    /// Query failed for another reason; the video is skipped.
    AssumedPresent,
}

impl DedupVerdict {
    pub fn exists(self) -> bool {
        matches!(self, DedupVerdict::Found | DedupVerdict::AssumedPresent)
    }
}

/// The Content API sometimes rejects the custom-field predicate with a
/// parsing error naming the very field being filtered on.
pub fn is_known_filter_defect(err: &StoreError, field_path: &str) -> bool {
    match err {
        StoreError::Parsing { message } => {
            message.contains(&format!("unexpected field '{}'", field_path))
        }
        _ => false,
    }
}

pub async fn check_exists<D>(store: &D, field_path: &str, video_id: &str) -> DedupVerdict
where
    D: DocumentStore + ?Sized,
{
    match store.get_first_by_field(field_path, video_id).await {
        Ok(Some(hit)) => {
            debug!(video_id, document_id = %hit.id, "Already in the repository");
            DedupVerdict::Found
        }
        Ok(None) => DedupVerdict::NotFound,
        Err(e) if is_known_filter_defect(&e, field_path) => {
            warn!(
                video_id,
                "Ignoring known ParsingError on {}; assuming the video is not imported yet",
                field_path
            );
            DedupVerdict::AssumedAbsent
        }
        Err(e) => {
            error!(video_id, error = %e, "Existence check failed; skipping to avoid a duplicate");
            DedupVerdict::AssumedPresent
        }
    }
}
