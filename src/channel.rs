//! Scraping one channel: load enough history, filter to the window, extract.

use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::feed::{filter_window, FeedRenderer};
use crate::output::ScrapeResult;
use crate::post::extractor::parse_post_id;
use crate::post::{parse_post_date, ExtractOptions, LanguageDetector, PostExtractor, PostHandle};
use crate::window::ScrapeWindow;

/// Default cap on "load older posts" requests per scrape.
pub const DEFAULT_MAX_LOAD_ATTEMPTS: u32 = 500;

/// Per-scrape behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub extract: ExtractOptions,
    /// Give up with [`ScrapeError::HistoryExhausted`] after this many load-more calls.
    pub max_load_attempts: u32,
    /// Log and drop posts with a broken date or id instead of failing the scrape.
    pub skip_malformed_posts: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            extract: ExtractOptions::default(),
            max_load_attempts: DEFAULT_MAX_LOAD_ATTEMPTS,
            skip_malformed_posts: false,
        }
    }
}

/// Scrapes one channel's public feed within a date window.
pub struct ChannelScraper<R, D> {
    window: ScrapeWindow,
    options: ScrapeOptions,
    renderer: R,
    extractor: PostExtractor<D>,
}

impl<R: FeedRenderer, D: LanguageDetector> ChannelScraper<R, D> {
    /// `base_url` is the preview prefix the channel name is appended to,
    /// e.g. `https://t.me/s/`.
    #[must_use]
    pub fn new(
        base_url: &str,
        channel: &str,
        window: ScrapeWindow,
        options: ScrapeOptions,
        renderer: R,
        detector: D,
    ) -> Self {
        let channel_url = format!("{base_url}{}", channel.trim().trim_start_matches('@'));
        Self {
            window,
            options,
            renderer,
            extractor: PostExtractor::new(channel_url, detector, options.extract),
        }
    }

    #[must_use]
    pub fn channel_url(&self) -> &str {
        self.extractor.channel_url()
    }

    #[must_use]
    pub fn window(&self) -> &ScrapeWindow {
        &self.window
    }

    /// Run the scrape.
    ///
    /// # Errors
    ///
    /// Fails if the renderer fails, history runs past the load cap, the window
    /// matches nothing, or (unless skipping is enabled) a post is malformed.
    pub async fn scrape(&mut self) -> Result<ScrapeResult> {
        let channel_url = self.channel_url().to_string();
        info!(
            channel = %channel_url,
            start = %self.window.start,
            end = ?self.window.end,
            "Starting channel scrape"
        );

        self.renderer
            .load(&channel_url)
            .await
            .map_err(ScrapeError::Renderer)?;
        self.load_until_start().await?;

        let mut handles = self.renderer.post_handles();
        if self.options.skip_malformed_posts {
            handles.retain(|handle| well_formed(handle));
        }

        let selected = filter_window(handles, &self.window)?;

        let posts = selected
            .iter()
            .map(|handle| self.extractor.extract(handle))
            .collect::<Result<Vec<_>>>()?;

        info!(channel = %channel_url, posts = posts.len(), "Channel scrape complete");
        Ok(ScrapeResult::new(posts))
    }

    /// Request older posts until the oldest loaded one reaches the window start.
    async fn load_until_start(&mut self) -> Result<()> {
        let mut attempts = 0;

        while let Some(oldest) = self.renderer.oldest_post_date() {
            if oldest <= self.window.start {
                break;
            }
            if attempts >= self.options.max_load_attempts {
                return Err(ScrapeError::HistoryExhausted {
                    attempts,
                    start: self.window.start,
                });
            }
            attempts += 1;

            let loaded = self
                .renderer
                .load_more()
                .await
                .map_err(ScrapeError::Renderer)?;
            if !loaded {
                info!(
                    attempts,
                    oldest = %oldest,
                    "Reached the beginning of channel history"
                );
                break;
            }
            debug!(attempts, oldest = %oldest, "Loaded older posts");
        }

        Ok(())
    }
}

fn well_formed(handle: &impl PostHandle) -> bool {
    if let Err(e) = parse_post_date(handle).and_then(|_| parse_post_id(handle)) {
        warn!("Skipping malformed post: {e}");
        return false;
    }
    true
}
