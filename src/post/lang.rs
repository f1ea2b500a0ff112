//! Pluggable language detection for post text.

use anyhow::{Context, Result};

/// Strategy for guessing the language of a post's text.
///
/// Failures are expected (short or mixed texts, emoji-only posts); callers
/// downgrade any error to an `"unknown"` language instead of propagating it.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`, returning its ISO code.
    ///
    /// # Errors
    ///
    /// Returns an error if no language can be determined.
    fn detect(&self, text: &str) -> Result<String>;
}

/// Trigram-based detector backed by `whatlang`. Returns ISO 639-1 codes.
///
/// Guesses `whatlang` itself marks unreliable are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String> {
        let info = whatlang::detect(text).context("no language detected")?;
        anyhow::ensure!(
            info.is_reliable(),
            "unreliable detection ({}, confidence {:.2})",
            info.lang().code(),
            info.confidence()
        );
        to_639_1(info.lang().code())
            .map(str::to_string)
            .with_context(|| format!("no ISO 639-1 code for {}", info.lang().code()))
    }
}

fn to_639_1(code: &str) -> Option<&'static str> {
    // whatlang reports Mandarin as the individual language; 639-1 only has the macrolanguage.
    if code == "cmn" {
        return Some("zh");
    }
    isolang::Language::from_639_3(code).and_then(|lang| lang.to_639_1())
}
