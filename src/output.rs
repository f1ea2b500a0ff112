//! Scrape results and their JSON file form.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::post::PostRecord;

/// Posts collected by one scrape, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrapeResult {
    posts: Vec<PostRecord>,
}

impl ScrapeResult {
    #[must_use]
    pub fn new(posts: Vec<PostRecord>) -> Self {
        Self { posts }
    }

    #[must_use]
    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    #[must_use]
    pub fn into_posts(self) -> Vec<PostRecord> {
        self.posts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PostRecord> {
        self.posts.iter()
    }

    /// Serialize as an indented JSON array. Non-ASCII text is kept literally.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(buf)
    }

    /// Write the result to `path`, creating parent directories.
    ///
    /// Failures are reported through the returned status rather than an error.
    pub async fn save_json(&self, path: &Path) -> SaveStatus {
        match self.write_json(path).await {
            Ok(()) => {
                info!(path = %path.display(), posts = self.len(), "Saved scrape result");
                SaveStatus::Saved
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to save scrape result: {e:#}");
                SaveStatus::Failed(format!("{e:#}"))
            }
        }
    }

    async fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty().context("Failed to serialize posts")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl<'a> IntoIterator for &'a ScrapeResult {
    type Item = &'a PostRecord;
    type IntoIter = std::slice::Iter<'a, PostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}

/// Read a previously saved result back.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a saved result.
pub async fn load_json(path: &Path) -> Result<ScrapeResult> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Invalid scrape result: {}", path.display()))
}

/// Outcome of [`ScrapeResult::save_json`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed(String),
}

impl SaveStatus {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved => f.write_str("Saved successfully."),
            Self::Failed(reason) => write!(f, "Error saving file: {reason}"),
        }
    }
}
