use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::ImportSettings;
use crate::youtube::VideoSource;

/// Collect video ids from the uploads playlist, newest first, bounded by
/// `max_pages` and `max_videos_to_check`. A failure on the first page is
/// fatal; later pages only truncate the listing.
pub async fn list_video_ids<S>(source: &S, settings: &ImportSettings) -> Result<Vec<String>>
where
    S: VideoSource + ?Sized,
{
    let cap = settings.max_videos_to_check;
    let mut ids: Vec<String> = Vec::new();
    if cap == 0 {
        return Ok(ids);
    }

    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        pages += 1;
        info!(page = pages, "Fetching playlist page");

        let page = match source
            .list_page(&settings.playlist_id, settings.page_size, token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) if pages == 1 => {
                return Err(e).with_context(|| {
                    format!("failed to list playlist {}", settings.playlist_id)
                });
            }
            Err(e) => {
                warn!(
                    page = pages,
                    error = %e,
                    "Playlist page failed, keeping {} ids collected so far",
                    ids.len()
                );
                break;
            }
        };

        let added = page.video_ids.len();
        ids.extend(page.video_ids);
        info!("  +{} ids, total {}", added, ids.len());

        if ids.len() >= cap {
            info!("Reached limit of {} ids to check", cap);
            break;
        }
        token = page.next_page_token;
        if token.is_none() || pages >= settings.max_pages {
            break;
        }
        tokio::time::sleep(settings.api_delay).await;
    }

    ids.truncate(cap);
    Ok(ids)
}
