//! Shared constants used across the application.

/// User agent sent with preview page requests.
///
/// Preview pages serve the full post markup only to regular browsers.
pub const SCRAPER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Base URL that a channel name is appended to.
pub const DEFAULT_PREVIEW_BASE_URL: &str = "https://t.me/s/";
