use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::ImportSettings;
use crate::parser::ContentExtractor;
use crate::prismic::migration::{AssetRef, StagingError};
use crate::prismic::richtext::RichTextBlock;
use crate::prismic::MigrationBatch;
use crate::youtube::SourceItem;

const UNTITLED: &str = "Video sin título";
const META_TITLE_CHARS: usize = 60;
const META_DESCRIPTION_CHARS: usize = 160;

/// Data payload of a `videoarticle` document.
#[derive(Debug, Serialize)]
pub struct VideoArticle {
    pub title: Vec<RichTextBlock>,
    pub youtube_video_id: String,
    pub publication_date: Option<String>,
    pub featured_image: Option<AssetRef>,
    pub social_card_image: Option<AssetRef>,
    pub video_embed: Option<VideoEmbed>,
    pub short_description: Vec<RichTextBlock>,
    pub ingredients: Vec<RichTextBlock>,
    pub instructions: Vec<RichTextBlock>,
    pub meta_title: String,
    pub meta_description: String,
}

#[derive(Debug, Serialize)]
pub struct VideoEmbed {
    pub embed_url: String,
}

/// What got added to the batch for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedVideo {
    pub video_id: String,
    pub title: String,
    pub has_image: bool,
}

/// Register the thumbnail and queue the document creation for `item`.
/// A thumbnail that cannot be registered leaves the document without an image.
pub fn stage_video(
    batch: &mut MigrationBatch,
    extractor: &ContentExtractor,
    item: &SourceItem,
    settings: &ImportSettings,
) -> Result<StagedVideo, StagingError> {
    let title = item
        .snippet
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED);

    let image = match item.snippet.thumbnails.best_url() {
        Some(url) => {
            info!("    Registering thumbnail asset: {}", url);
            match batch.create_asset(url, &format!("{}.jpg", item.id), Some(title)) {
                Ok(asset) => Some(asset),
                Err(e) => {
                    error!(video_id = %item.id, error = %e, "Could not register thumbnail asset");
                    None
                }
            }
        }
        None => {
            warn!(video_id = %item.id, "No thumbnail URL found");
            None
        }
    };

    let parsed = extractor.extract(item.snippet.description.as_deref().unwrap_or(""));
    let meta_description = parsed
        .short_description
        .first()
        .map(|p| p.text.as_str())
        .unwrap_or(title);

    let article = VideoArticle {
        title: vec![RichTextBlock::heading1(title)],
        youtube_video_id: item.id.clone(),
        publication_date: item
            .snippet
            .published_at
            .map(|d| d.format("%Y-%m-%d").to_string()),
        featured_image: image,
        social_card_image: image,
        video_embed: (!item.id.is_empty()).then(|| VideoEmbed {
            embed_url: format!("https://www.youtube.com/watch?v={}", item.id),
        }),
        meta_title: truncate_chars(title, META_TITLE_CHARS),
        meta_description: truncate_chars(meta_description, META_DESCRIPTION_CHARS),
        short_description: parsed.short_description,
        ingredients: parsed.ingredients,
        instructions: parsed.instructions,
    };

    batch.create_document(
        &settings.custom_type,
        &settings.lang,
        &article,
        &format!("YT Import: {}", title),
    )?;

    Ok(StagedVideo {
        video_id: item.id.clone(),
        title: title.to_string(),
        has_image: image.is_some(),
    })
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
