//! Posts: the handle capability, the extracted record, and the extractor.

pub mod extractor;
pub mod lang;
pub mod record;

pub use extractor::{is_edited_by_meta_text, parse_post_date, ExtractOptions, PostExtractor};
pub use lang::{LanguageDetector, WhatlangDetector};
pub use record::{PostRecord, VideoMeta};

/// Logical sub-elements of a rendered post.
///
/// Renderers map these onto their own markup; the extractor only ever asks
/// for markers, never for selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Wrapping element; its value is the post id string (e.g. `channel/123`).
    Wrapper,
    /// Timestamp element; value is the ISO-8601 timestamp, text the rendered date.
    Date,
    /// Meta-info region around the date (views, "edited" label, date).
    MetaInfo,
    /// View counter.
    Views,
    /// Post body text.
    Text,
    /// Reply preview; value is the link to the replied-to post.
    Reply,
    /// Forward header; value is the link to the original post.
    Forwarded,
    /// Photo; value is the style string carrying the background image.
    Photo,
    /// Video thumbnail; value is the style string carrying the thumbnail image.
    Video,
    /// Video duration label.
    VideoDuration,
}

/// Read-only view of one rendered post.
///
/// Lookups are by logical [`Marker`] and index; `index` counts elements of the
/// same marker in document order.
pub trait PostHandle {
    /// Number of sub-elements carrying `marker`.
    fn count(&self, marker: Marker) -> usize;

    /// Data value (link, timestamp, style, id) of the `index`-th `marker` element.
    fn value(&self, marker: Marker, index: usize) -> Option<String>;

    /// Rendered text of the `index`-th `marker` element.
    fn text(&self, marker: Marker, index: usize) -> Option<String>;

    /// Whether at least one `marker` element exists.
    fn has(&self, marker: Marker) -> bool {
        self.count(marker) > 0
    }
}
