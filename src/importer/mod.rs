//! Playlist → Prismic import: list, fetch details, drop shorts, dedup,
//! stage, commit. One sequential pass per invocation.

pub mod commit;
pub mod dedup;
pub mod details;
pub mod listing;
pub mod staging;

#[cfg(test)]
pub mod testing;

use std::collections::HashSet;

use anyhow::Result;
use tracing::{error, info};

use crate::config::ImportSettings;
use crate::parser::{is_long_form, parse_iso_duration, ContentExtractor};
use crate::prismic::{DocumentStore, MigrationBatch};
use crate::youtube::{SourceItem, VideoSource};
use commit::CommitOutcome;

/// Counters for the end-of-run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub listed: usize,
    pub fetched: usize,
    pub long_form: usize,
    pub skipped_existing: usize,
    pub staged: usize,
    pub assets: usize,
    pub commit: CommitOutcome,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            listed: 0,
            fetched: 0,
            long_form: 0,
            skipped_existing: 0,
            staged: 0,
            assets: 0,
            commit: CommitOutcome::Skipped,
        }
    }
}

impl RunSummary {
    pub fn print(&self) {
        println!(
            "Listed {} videos, {} with details, {} long-form, {} already imported, {} staged ({} assets).",
            self.listed, self.fetched, self.long_form, self.skipped_existing, self.staged, self.assets,
        );
        match &self.commit {
            CommitOutcome::Skipped => println!("Nothing to migrate."),
            CommitOutcome::DryRun => println!("Dry run: migration not submitted."),
            CommitOutcome::Submitted(r) => println!(
                "Migration submitted: {} assets, {} documents. Check the repository in a few moments.",
                r.assets_created, r.documents_created
            ),
            CommitOutcome::Failed { status: Some(s) } => println!("Migration failed (HTTP {}).", s),
            CommitOutcome::Failed { status: None } => println!("Migration failed."),
        }
    }
}

/// Keep videos longer than the shorts threshold, plus those whose duration is unknown.
pub fn keep_long_form(items: Vec<SourceItem>, max_short_seconds: u64) -> Vec<SourceItem> {
    items
        .into_iter()
        .filter(|v| {
            let secs = parse_iso_duration(v.content_details.duration.as_deref().unwrap_or(""));
            is_long_form(secs, max_short_seconds)
        })
        .collect()
}

pub async fn run<S, D>(
    settings: &ImportSettings,
    source: &S,
    store: &D,
    dry_run: bool,
) -> Result<RunSummary>
where
    S: VideoSource + ?Sized,
    D: DocumentStore + ?Sized,
{
    let mut summary = RunSummary::default();

    // Phase 1: ids
    info!("Phase 1: listing recent uploads");
    let ids = listing::list_video_ids(source, settings).await?;
    summary.listed = ids.len();
    if ids.is_empty() {
        info!("No videos found in playlist {}", settings.playlist_id);
        return Ok(summary);
    }
    info!("Phase 1: {} ids", ids.len());

    // Phase 2: details
    info!("Phase 2: fetching video details");
    let details =
        details::fetch_details(source, &ids, settings.detail_batch_size, settings.api_delay).await;
    summary.fetched = details.len();
    info!("Phase 2: details for {} videos", details.len());

    // Phase 3: shorts
    let long_form = keep_long_form(details, settings.shorts_max_seconds);
    summary.long_form = long_form.len();
    info!("Phase 3: {} videos that are not shorts", long_form.len());
    if long_form.is_empty() {
        info!("No long-form videos to process");
        return Ok(summary);
    }

    // Phase 4: dedup + staging
    info!(
        "Phase 4: staging up to {} documents",
        settings.max_videos_to_import
    );
    let extractor = ContentExtractor::new();
    let field_path = settings.video_id_path();
    let mut batch = MigrationBatch::new();
    let mut staged_ids: HashSet<String> = HashSet::new();

    for video in &long_form {
        if summary.staged >= settings.max_videos_to_import {
            info!("Reached limit of {} documents for this run", settings.max_videos_to_import);
            break;
        }
        if staged_ids.contains(&video.id) {
            continue;
        }

        info!(
            "Processing \"{}\" ({})",
            video.snippet.title.as_deref().unwrap_or(""),
            video.id
        );
        if dedup::check_exists(store, &field_path, &video.id).await.exists() {
            info!("  already imported (or check failed), skipping");
            summary.skipped_existing += 1;
            continue;
        }

        match staging::stage_video(&mut batch, &extractor, video, settings) {
            Ok(staged) => {
                info!(
                    "  staged document.create for \"{}\" (thumbnail: {})",
                    staged.title,
                    if staged.has_image { "yes" } else { "no" }
                );
                staged_ids.insert(staged.video_id);
                summary.staged += 1;
            }
            Err(e) => error!(video_id = %video.id, error = %e, "Could not stage document"),
        }
    }
    summary.assets = batch.assets().len();
    info!("Phase 4: {} documents staged", summary.staged);

    // Phase 5: commit
    summary.commit = if dry_run {
        for doc in batch.documents() {
            info!("  [dry run] would create {} ({})", doc.label, doc.doc_type);
        }
        if batch.is_empty() {
            CommitOutcome::Skipped
        } else {
            CommitOutcome::DryRun
        }
    } else {
        info!("Phase 5: migrating");
        commit::commit(store, &batch).await
    };

    Ok(summary)
}

// ── Tests ──
