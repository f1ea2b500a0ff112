//! HTTP renderer for public channel preview pages.
//!
//! The preview page shows the newest posts; scrolling up fetches the page of
//! posts before the oldest visible one, which is what [`load_more`] requests.
//!
//! [`load_more`]: PreviewPageRenderer::load_more

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};
use url::Url;

use super::html::{parse_feed_page, RenderedPost};
use super::FeedRenderer;
use crate::constants::SCRAPER_USER_AGENT;
use crate::post::extractor::parse_post_id;
use crate::post::{parse_post_date, Marker, PostHandle};

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Feed renderer that fetches preview HTML over HTTP.
pub struct PreviewPageRenderer {
    client: reqwest::Client,
    url: Option<Url>,
    /// Loaded posts, oldest first.
    posts: Vec<RenderedPost>,
    seen: HashSet<PostKey>,
}

/// Identity of a loaded post. Posts whose wrapper carries no id fall back to
/// their date and text so a repeated page is still recognized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PostKey {
    Id(u64),
    Anonymous {
        date: Option<String>,
        text: Option<String>,
    },
}

impl PostKey {
    fn of(post: &RenderedPost) -> Self {
        match parse_post_id(post) {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Anonymous {
                date: post.value(Marker::Date, 0),
                text: post.text(Marker::Text, 0),
            },
        }
    }
}

impl PreviewPageRenderer {
    /// Create a renderer with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(SCRAPER_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            url: None,
            posts: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Number of posts loaded so far.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.posts.len()
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<RenderedPost>> {
        debug!(url = %url, "Fetching preview page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("Preview fetch failed with status {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read preview page body")?;
        Ok(parse_feed_page(&body))
    }

    fn oldest_post_id(&self) -> Option<u64> {
        self.posts.iter().find_map(|post| parse_post_id(post).ok())
    }
}

#[async_trait]
impl FeedRenderer for PreviewPageRenderer {
    type Handle = RenderedPost;

    async fn load(&mut self, url: &str) -> Result<()> {
        let url = Url::parse(url).with_context(|| format!("Invalid channel URL: {url}"))?;
        let posts = self.fetch(&url).await?;

        info!(url = %url, posts = posts.len(), "Loaded channel preview");

        self.seen = posts.iter().map(PostKey::of).collect();
        self.posts = posts;
        self.url = Some(url);
        Ok(())
    }

    async fn load_more(&mut self) -> Result<bool> {
        let base = self
            .url
            .as_ref()
            .context("load_more called before load")?;
        let Some(before) = self.oldest_post_id() else {
            return Ok(false);
        };

        let mut url = base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("before", &before.to_string());

        let fetched = self.fetch(&url).await?;
        let older: Vec<RenderedPost> = fetched
            .into_iter()
            .filter(|post| self.seen.insert(PostKey::of(post)))
            .collect();

        debug!(before, new_posts = older.len(), "Loaded older posts");

        // A page with nothing unseen means the feed has no older history.
        if older.is_empty() {
            return Ok(false);
        }
        self.posts.splice(0..0, older);
        Ok(true)
    }

    fn post_handles(&self) -> Vec<RenderedPost> {
        self.posts.iter().rev().cloned().collect()
    }

    fn oldest_post_date(&self) -> Option<DateTime<FixedOffset>> {
        self.posts
            .iter()
            .find_map(|post| parse_post_date(post).ok())
    }
}
