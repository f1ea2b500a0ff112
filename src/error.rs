use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// Errors raised while building a window, loading a feed, or extracting posts.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("the loaded feed contains no posts")]
    EmptyFeed,
    #[error("no loaded post is dated at or after {start}")]
    WindowNotFound { start: DateTime<FixedOffset> },
    #[error("gave up loading older posts after {attempts} attempts; oldest loaded post is still newer than {start}")]
    HistoryExhausted {
        attempts: u32,
        start: DateTime<FixedOffset>,
    },
    #[error("post has no date marker")]
    MissingDate,
    #[error("post date {value:?} is not a valid timestamp")]
    InvalidPostDate { value: String },
    #[error("post id {value:?} contains no digits")]
    MalformedPostId { value: String },
    #[error("cannot parse {value:?} as a date")]
    InvalidDate { value: String },
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("window end {end} is before window start {start}")]
    InvalidWindow {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
    #[error("feed renderer failed: {0:#}")]
    Renderer(#[source] anyhow::Error),
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
