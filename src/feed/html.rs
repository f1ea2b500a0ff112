//! Snapshot parsing of channel preview pages.
//!
//! Each rendered post is copied into an owned [`RenderedPost`] so handles
//! outlive the parsed document and can be fabricated directly in tests.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::post::{Marker, PostHandle};

static POST_WRAP: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".tgme_widget_message_wrap").expect("Invalid selector"));

/// CSS class of the reply preview; its inner text block is not the post text.
const REPLY_CLASS: &str = "tgme_widget_message_reply";

/// How a marker is found in preview markup and which attribute carries its value.
struct MarkerSpec {
    marker: Marker,
    selector: Selector,
    value_attr: Option<&'static str>,
}

static MARKERS: Lazy<Vec<MarkerSpec>> = Lazy::new(|| {
    let spec = |marker, css: &str, value_attr| MarkerSpec {
        marker,
        selector: Selector::parse(css).expect("Invalid selector"),
        value_attr,
    };
    vec![
        spec(Marker::Wrapper, ".tgme_widget_message", Some("data-post")),
        spec(Marker::Date, "time.time", Some("datetime")),
        spec(Marker::MetaInfo, ".tgme_widget_message_meta", None),
        spec(Marker::Views, ".tgme_widget_message_views", None),
        spec(Marker::Text, ".tgme_widget_message_text", None),
        spec(Marker::Reply, ".tgme_widget_message_reply", Some("href")),
        spec(
            Marker::Forwarded,
            ".tgme_widget_message_forwarded_from_name",
            Some("href"),
        ),
        spec(Marker::Photo, ".tgme_widget_message_photo_wrap", Some("style")),
        spec(Marker::Video, ".tgme_widget_message_video_thumb", Some("style")),
        spec(Marker::VideoDuration, ".message_video_duration", None),
    ]
});

/// One marked sub-element of a rendered post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedElement {
    pub value: Option<String>,
    pub text: Option<String>,
}

/// Owned snapshot of one rendered post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPost {
    elements: HashMap<Marker, Vec<RenderedElement>>,
}

impl RenderedPost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element for `marker`.
    pub fn push(&mut self, marker: Marker, element: RenderedElement) {
        self.elements.entry(marker).or_default().push(element);
    }

    #[must_use]
    pub fn with_element(mut self, marker: Marker, value: Option<&str>, text: Option<&str>) -> Self {
        self.push(
            marker,
            RenderedElement {
                value: value.map(str::to_string),
                text: text.map(str::to_string),
            },
        );
        self
    }

    #[must_use]
    pub fn with_value(mut self, marker: Marker, value: impl Into<String>) -> Self {
        self.push(
            marker,
            RenderedElement {
                value: Some(value.into()),
                text: None,
            },
        );
        self
    }

    #[must_use]
    pub fn with_text(mut self, marker: Marker, text: impl Into<String>) -> Self {
        self.push(
            marker,
            RenderedElement {
                value: None,
                text: Some(text.into()),
            },
        );
        self
    }

    fn element(&self, marker: Marker, index: usize) -> Option<&RenderedElement> {
        self.elements.get(&marker).and_then(|els| els.get(index))
    }
}

impl PostHandle for RenderedPost {
    fn count(&self, marker: Marker) -> usize {
        self.elements.get(&marker).map_or(0, Vec::len)
    }

    fn value(&self, marker: Marker, index: usize) -> Option<String> {
        self.element(marker, index).and_then(|el| el.value.clone())
    }

    fn text(&self, marker: Marker, index: usize) -> Option<String> {
        self.element(marker, index).and_then(|el| el.text.clone())
    }
}

/// Parse every post on a preview page, in page order (oldest first).
#[must_use]
pub fn parse_feed_page(html: &str) -> Vec<RenderedPost> {
    let document = Html::parse_document(html);
    document.select(&POST_WRAP).map(snapshot_post).collect()
}

fn snapshot_post(wrap: ElementRef<'_>) -> RenderedPost {
    let mut post = RenderedPost::new();

    for spec in MARKERS.iter() {
        for element in wrap.select(&spec.selector) {
            if spec.marker == Marker::Text && has_class_ancestor(element, REPLY_CLASS) {
                continue;
            }
            post.push(
                spec.marker,
                RenderedElement {
                    value: spec
                        .value_attr
                        .and_then(|attr| element.value().attr(attr))
                        .map(str::to_string),
                    text: Some(rendered_text(element)),
                },
            );
        }
    }

    post
}

fn has_class_ancestor(element: ElementRef<'_>, class: &str) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().classes().any(|c| c == class))
}

/// Visible text of an element: `<br>` becomes a newline and runs of
/// whitespace collapse to one space, the way a browser renders it.
fn rendered_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            // Source newlines are layout whitespace, not line breaks.
            out.push_str(&text.replace('\n', " "));
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if child_element.value().name() == "br" {
                out.push('\n');
            } else {
                collect_text(child_element, out);
            }
        }
    }
}
