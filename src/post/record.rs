use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Metadata for one video attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMeta {
    /// Rendered duration label such as `0:42`; `None` when the page shows none.
    pub length: Option<String>,
    pub thumbnail_link: String,
}

/// Structured metadata extracted from one post.
///
/// Every field is always present in serialized output; optional parts of a
/// post default to empty strings, `false`, or empty lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub channel_url: String,
    pub post_id: u64,
    pub datetime: DateTime<FixedOffset>,
    pub views: String,
    pub is_reply: bool,
    pub reply_to: String,
    pub is_forwarded: bool,
    pub forwarded_from: String,
    pub is_edited: bool,
    pub text: String,
    /// ISO 639-1 code, `"unknown"` when detection failed, empty when the post
    /// has no text element.
    pub lang: String,
    pub has_photo: bool,
    pub photo_urls: Vec<String>,
    pub has_video: bool,
    pub videos_meta: Vec<VideoMeta>,
}

impl PostRecord {
    /// A record with only the structurally required fields set.
    #[must_use]
    pub fn new(channel_url: impl Into<String>, post_id: u64, datetime: DateTime<FixedOffset>) -> Self {
        Self {
            channel_url: channel_url.into(),
            post_id,
            datetime,
            views: String::new(),
            is_reply: false,
            reply_to: String::new(),
            is_forwarded: false,
            forwarded_from: String::new(),
            is_edited: false,
            text: String::new(),
            lang: String::new(),
            has_photo: false,
            photo_urls: Vec::new(),
            has_video: false,
            videos_meta: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape_is_fully_populated() {
        let datetime = DateTime::parse_from_rfc3339("2023-03-05T10:00:00+02:00").unwrap();
        let record = PostRecord::new("https://t.me/s/example", 42, datetime);
        let value = serde_json::to_value(&record).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 15);
        assert_eq!(value["post_id"], 42);
        assert_eq!(value["datetime"], "2023-03-05T10:00:00+02:00");
        assert_eq!(value["reply_to"], "");
        assert_eq!(value["lang"], "");
        assert_eq!(value["photo_urls"], serde_json::json!([]));
        assert_eq!(value["videos_meta"], serde_json::json!([]));
    }

    #[test]
    fn test_video_length_serializes_as_null() {
        let meta = VideoMeta {
            length: None,
            thumbnail_link: "https://cdn.example.com/thumb.jpg".to_string(),
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert!(value["length"].is_null());
    }
}
