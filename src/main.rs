mod config;
mod importer;
mod parser;
mod prismic;
mod youtube;

use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use config::Settings;
use prismic::PrismicClient;
use youtube::YouTubeClient;

/// Settings are read from the environment, or from `.env` when present.
#[derive(Parser)]
#[command(name = "yt_importer", about = "Import YouTube uploads into Prismic as video articles")]
struct Cli {
    /// Stage everything but do not submit the migration
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::from_env().context("invalid configuration")?;

    let youtube = YouTubeClient::new(settings.youtube_api_key.clone());
    let prismic = PrismicClient::new(&settings)?;

    info!("=================================================");
    info!("YouTube -> Prismic import ({})", chrono::Utc::now().to_rfc3339());
    info!("  repository:  {}", settings.prismic_repo_name);
    info!("  custom type: {}", settings.import.custom_type);
    if cli.dry_run {
        info!("  dry run: the migration will not be submitted");
    }
    info!("=================================================");

    let result = importer::run(&settings.import, &youtube, &prismic, cli.dry_run).await;

    match &result {
        Ok(summary) => summary.print(),
        Err(e) => tracing::error!("Import aborted: {:#}", e),
    }
    info!(
        "Import finished ({}) in {}",
        chrono::Utc::now().to_rfc3339(),
        format_duration(t0.elapsed())
    );

    result.map(|_| ())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
