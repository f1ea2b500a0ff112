use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use channel_preview_scraper::config::Config;
use channel_preview_scraper::feed::PreviewPageRenderer;
use channel_preview_scraper::post::WhatlangDetector;
use channel_preview_scraper::ChannelScraper;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    // Load and validate configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let window = config.window()?;
    info!(
        channels = config.channels.len(),
        start = %window.start,
        end = ?window.end,
        timezone = %config.timezone,
        "Configuration loaded"
    );

    let mut failed = Vec::new();

    // Channels are scraped one after another
    for channel in &config.channels {
        let renderer = PreviewPageRenderer::new(config.request_timeout)?;
        let mut scraper = ChannelScraper::new(
            &config.preview_base_url,
            channel,
            window,
            config.scrape_options(),
            renderer,
            WhatlangDetector,
        );

        let result = match scraper.scrape().await {
            Ok(result) => result,
            Err(e) => {
                error!(channel = %channel, "Scrape failed: {e}");
                failed.push(channel.clone());
                continue;
            }
        };

        let path = config.output_path(channel);
        let status = result.save_json(&path).await;
        if status.is_saved() {
            info!(channel = %channel, path = %path.display(), "{status}");
        } else {
            warn!(channel = %channel, path = %path.display(), "{status}");
            failed.push(channel.clone());
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("{} channel(s) failed: {}", failed.len(), failed.join(", "));
    }

    info!("All channels scraped");
    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,channel_preview_scraper=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
