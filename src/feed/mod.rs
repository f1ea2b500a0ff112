//! Loaded channel feeds: the renderer collaborator, its HTML implementation,
//! and date-window filtering.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::post::{parse_post_date, PostHandle};

pub mod filter;
pub mod html;
pub mod preview;

pub use filter::filter_window;
pub use html::{parse_feed_page, RenderedElement, RenderedPost};
pub use preview::PreviewPageRenderer;

/// Something that can load a channel feed and grow it toward older posts.
///
/// Calls are awaited one at a time; implementations own whatever page state
/// they need between calls.
#[async_trait]
pub trait FeedRenderer: Send {
    type Handle: PostHandle + Send;

    /// Load the feed page at `url`, replacing anything loaded before.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or rendered.
    async fn load(&mut self, url: &str) -> anyhow::Result<()>;

    /// Load posts older than the oldest one currently loaded.
    ///
    /// Returns `false` when no older posts exist.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing was loaded yet or the request fails.
    async fn load_more(&mut self) -> anyhow::Result<bool>;

    /// Handles for every loaded post, newest first.
    fn post_handles(&self) -> Vec<Self::Handle>;

    /// Date of the oldest loaded post that has a readable date.
    ///
    /// Called once per load-more round. The default builds every handle;
    /// renderers that keep posts in memory should read them in place.
    fn oldest_post_date(&self) -> Option<DateTime<FixedOffset>> {
        self.post_handles()
            .iter()
            .rev()
            .find_map(|handle| parse_post_date(handle).ok())
    }
}
