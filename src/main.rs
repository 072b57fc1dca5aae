// luogu-badges entry point.
// Logging goes to stderr; RUST_LOG overrides the default info level.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use luogu_badges::AppConfig;
use luogu_badges::luogu::LuoguClient;
use luogu_badges::updater::Updater;

#[derive(Parser)]
#[command(name = "luogu-badges")]
#[command(about = "Refresh Luogu practice badges in a Markdown document")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Refetch every category regardless of cache age.
    #[arg(long, default_value_t = false)]
    force: bool,
    /// Link badge URLs directly instead of mirroring the images.
    #[arg(long, default_value_t = false)]
    no_download: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let client = LuoguClient::new(&config)?;

    let download = config.download_images && !cli.no_download;
    let summary = Updater::new(&config, &client)
        .force(cli.force)
        .download_images(download)
        .run(Utc::now())
        .await?;

    tracing::info!(
        personal = ?summary.personal,
        totals = ?summary.totals,
        images_saved = summary.images_saved,
        document = %config.document_path.display(),
        "update complete"
    );

    Ok(())
}
