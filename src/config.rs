use std::time::Duration;

use thiserror::Error;

const REQUIRED_KEYS: [&str; 5] = [
    "YOUTUBE_API_KEY",
    "PRISMIC_API_ENDPOINT",
    "PRISMIC_WRITE_TOKEN",
    "YOUTUBE_UPLOADS_PLAYLIST_ID",
    "PRISMIC_REPO_NAME",
];

/// Upper bound the videos endpoint accepts for `id=` per call.
pub const MAX_DETAIL_BATCH: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("{key} must be a non-negative integer, got {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Everything a run needs, loaded once from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub youtube_api_key: String,
    pub prismic_api_endpoint: String,
    pub prismic_write_token: String,
    pub prismic_repo_name: String,
    pub prismic_migration_api_key: Option<String>,
    pub import: ImportSettings,
}

/// Tunables consumed by the pipeline itself. Credentials stay in [`Settings`].
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub playlist_id: String,
    pub page_size: usize,
    pub max_pages: usize,
    pub max_videos_to_check: usize,
    pub detail_batch_size: usize,
    pub max_videos_to_import: usize,
    pub api_delay: Duration,
    pub shorts_max_seconds: u64,
    pub custom_type: String,
    pub lang: String,
}

impl ImportSettings {
    pub fn new(playlist_id: impl Into<String>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            page_size: 50,
            max_pages: 3,
            max_videos_to_check: 50,
            detail_batch_size: MAX_DETAIL_BATCH,
            max_videos_to_import: 1,
            api_delay: Duration::from_millis(500),
            shorts_max_seconds: 60,
            custom_type: "videoarticle".to_string(),
            lang: "es-es".to_string(),
        }
    }

    /// Filter path of the dedup key in query predicates.
    pub fn video_id_path(&self) -> String {
        format!("my.{}.youtube_video_id", self.custom_type)
    }
}

impl Settings {
    /// Load from the process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let required = |key: &str| get(key).unwrap_or_default();

        let mut import = ImportSettings::new(required("YOUTUBE_UPLOADS_PLAYLIST_ID"));
        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match get(key) {
                None => Ok(default),
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    key,
                    value: raw.clone(),
                }),
            }
        };

        import.max_videos_to_check =
            number("MAX_VIDEOS_TO_CHECK_YT", import.max_videos_to_check as u64)? as usize;
        import.max_videos_to_import =
            number("MAX_VIDEOS_TO_IMPORT_PRISMIC", import.max_videos_to_import as u64)? as usize;
        import.max_pages = number("YOUTUBE_MAX_PAGES", import.max_pages as u64)? as usize;
        import.api_delay = Duration::from_millis(number(
            "DELAY_FOR_YT_API_MS",
            import.api_delay.as_millis() as u64,
        )?);
        import.shorts_max_seconds = number("SHORTS_MAX_SECONDS", import.shorts_max_seconds)?;
        if let Some(custom_type) = get("PRISMIC_CUSTOM_TYPE") {
            import.custom_type = custom_type;
        }
        if let Some(lang) = get("PRISMIC_LANG") {
            import.lang = lang;
        }

        Ok(Self {
            youtube_api_key: required("YOUTUBE_API_KEY"),
            prismic_api_endpoint: required("PRISMIC_API_ENDPOINT"),
            prismic_write_token: required("PRISMIC_WRITE_TOKEN"),
            prismic_repo_name: required("PRISMIC_REPO_NAME"),
            prismic_migration_api_key: get("PRISMIC_MIGRATION_API_KEY"),
            import,
        })
    }
}

// ── Tests ──
