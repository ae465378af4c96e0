use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use crate::config::MAX_DETAIL_BATCH;
use crate::youtube::{SourceItem, VideoSource};

/// Fetch details for `ids` in order-preserving batches. A failed batch is
/// logged and its videos are simply missing from the result.
pub async fn fetch_details<S>(
    source: &S,
    ids: &[String],
    batch_size: usize,
    delay: Duration,
) -> Vec<SourceItem>
where
    S: VideoSource + ?Sized,
{
    let batch_size = batch_size.clamp(1, MAX_DETAIL_BATCH);
    let batches: Vec<&[String]> = ids.chunks(batch_size).collect();

    let pb = ProgressBar::new(batches.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} batches") {
        pb.set_style(style.progress_chars("=> "));
    }

    let mut details = Vec::with_capacity(ids.len());
    for (i, batch) in batches.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await;
        }
        match source.fetch_details(batch).await {
            Ok(items) => {
                info!("  batch {}: {} of {} videos resolved", i + 1, items.len(), batch.len());
                details.extend(items);
            }
            Err(e) => {
                error!(
                    batch = i + 1,
                    error = %e,
                    "Failed to fetch video details for [{}]",
                    batch.join(",")
                );
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    details
}
