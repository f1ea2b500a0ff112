//! Channel preview scraper library.
//!
//! Scrapes the public web preview of a messaging channel, keeps the posts
//! inside a date window, and turns each one into a structured record that can
//! be saved as JSON.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod channel;
pub mod config;
pub mod constants;
pub mod error;
pub mod feed;
pub mod output;
pub mod post;
pub mod window;

pub use channel::{ChannelScraper, ScrapeOptions};
pub use error::ScrapeError;
pub use output::{SaveStatus, ScrapeResult};
pub use window::ScrapeWindow;
