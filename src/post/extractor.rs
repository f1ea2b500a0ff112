//! Conversion of one rendered post into a [`PostRecord`].

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use super::lang::LanguageDetector;
use super::record::{PostRecord, VideoMeta};
use super::{Marker, PostHandle};
use crate::error::{Result, ScrapeError};

/// Language reported when detection fails.
pub const UNKNOWN_LANG: &str = "unknown";

static STYLE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"url\(["'](.+?)["']\)"#).unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Which optional field groups to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Photos and videos.
    pub collect_media: bool,
    /// Post text and its language.
    pub collect_text: bool,
    /// Views and the reply/forward/edited flags.
    pub collect_meta: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            collect_media: true,
            collect_text: true,
            collect_meta: true,
        }
    }
}

/// Builds [`PostRecord`]s for posts of one channel.
pub struct PostExtractor<D> {
    channel_url: String,
    detector: D,
    options: ExtractOptions,
}

impl<D: LanguageDetector> PostExtractor<D> {
    #[must_use]
    pub fn new(channel_url: impl Into<String>, detector: D, options: ExtractOptions) -> Self {
        Self {
            channel_url: channel_url.into(),
            detector,
            options,
        }
    }

    #[must_use]
    pub fn channel_url(&self) -> &str {
        &self.channel_url
    }

    /// Extract a fully populated record from `post`.
    ///
    /// # Errors
    ///
    /// Fails only when the post's date or id is missing or malformed; every
    /// other field falls back to its default.
    pub fn extract(&self, post: &impl PostHandle) -> Result<PostRecord> {
        let post_id = parse_post_id(post)?;
        let datetime = parse_post_date(post)?;
        let mut record = PostRecord::new(self.channel_url.clone(), post_id, datetime);

        if self.options.collect_media {
            record.photo_urls = photo_urls(post);
            record.has_photo = !record.photo_urls.is_empty();
            record.videos_meta = videos_meta(post);
            record.has_video = !record.videos_meta.is_empty();
        }

        if self.options.collect_text {
            if let Some(text) = post_text(post) {
                record.lang = self.detect_language(&text);
                record.text = text;
            }
        }

        if self.options.collect_meta {
            record.views = views(post);
            if let Some(link) = marker_link(post, Marker::Reply) {
                record.is_reply = true;
                record.reply_to = link;
            }
            if let Some(link) = marker_link(post, Marker::Forwarded) {
                record.is_forwarded = true;
                record.forwarded_from = link;
            }
            record.is_edited = is_edited_by_meta_text(post);
        }

        trace!(post_id, channel = %self.channel_url, "Extracted post");
        Ok(record)
    }

    fn detect_language(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return UNKNOWN_LANG.to_string();
        }
        match self.detector.detect(text) {
            Ok(code) if !code.is_empty() => code,
            Ok(_) => UNKNOWN_LANG.to_string(),
            Err(e) => {
                debug!("Language detection failed: {e:#}");
                UNKNOWN_LANG.to_string()
            }
        }
    }
}

/// Read and parse the post's required timestamp.
///
/// # Errors
///
/// Returns [`ScrapeError::MissingDate`] when the post has no date value and
/// [`ScrapeError::InvalidPostDate`] when the value is not a timestamp.
pub fn parse_post_date(post: &impl PostHandle) -> Result<DateTime<FixedOffset>> {
    let value = post
        .value(Marker::Date, 0)
        .ok_or(ScrapeError::MissingDate)?;
    let trimmed = value.trim();

    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%:z"))
        .map_err(|_| ScrapeError::InvalidPostDate { value })
}

/// Parse the first run of digits from the post's wrapper id (`channel/123` -> 123).
///
/// # Errors
///
/// Returns [`ScrapeError::MalformedPostId`] when there is no id or it has no digits.
pub fn parse_post_id(post: &impl PostHandle) -> Result<u64> {
    let value = post.value(Marker::Wrapper, 0).unwrap_or_default();
    DIGITS
        .find(&value)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or(ScrapeError::MalformedPostId { value })
}

/// Edited posts carry an extra label in the meta region next to the date, so
/// the meta text and the date text no longer match.
#[must_use]
pub fn is_edited_by_meta_text(post: &impl PostHandle) -> bool {
    match (post.text(Marker::MetaInfo, 0), post.text(Marker::Date, 0)) {
        (Some(meta), Some(date)) => normalize_whitespace(&meta) != normalize_whitespace(&date),
        _ => false,
    }
}

fn marker_link(post: &impl PostHandle, marker: Marker) -> Option<String> {
    post.has(marker)
        .then(|| post.value(marker, 0).unwrap_or_default())
}

fn views(post: &impl PostHandle) -> String {
    post.text(Marker::Views, 0)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

fn post_text(post: &impl PostHandle) -> Option<String> {
    post.has(Marker::Text)
        .then(|| post.text(Marker::Text, 0).unwrap_or_default())
}

fn photo_urls(post: &impl PostHandle) -> Vec<String> {
    (0..post.count(Marker::Photo))
        .map(|i| style_url(post.value(Marker::Photo, i).as_deref()))
        .collect()
}

fn videos_meta(post: &impl PostHandle) -> Vec<VideoMeta> {
    (0..post.count(Marker::Video))
        .map(|i| VideoMeta {
            // Duration labels line up with videos by position; trailing videos
            // without a label get no length.
            length: post
                .text(Marker::VideoDuration, i)
                .map(|text| text.trim().to_string()),
            thumbnail_link: style_url(post.value(Marker::Video, i).as_deref()),
        })
        .collect()
}

/// Pull the image URL out of a `background-image:url("...")` style string.
fn style_url(style: Option<&str>) -> String {
    style
        .and_then(|s| STYLE_URL.captures(s))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
