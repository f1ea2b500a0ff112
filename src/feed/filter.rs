//! Date-window filtering over a newest-first feed.

use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::post::{parse_post_date, PostHandle};
use crate::window::ScrapeWindow;

/// Select the posts of `elements` that fall within `window`.
///
/// `elements` must be ordered newest-first with non-increasing dates. The
/// returned run is contiguous in the input and ordered oldest-first.
///
/// # Errors
///
/// - [`ScrapeError::EmptyFeed`] if `elements` is empty.
/// - [`ScrapeError::WindowNotFound`] if no post is dated at or after the start.
/// - Date errors from scanned posts.
///
/// If every post at or after the start is also newer than the end, the result
/// is empty rather than an error.
pub fn filter_window<H: PostHandle>(elements: Vec<H>, window: &ScrapeWindow) -> Result<Vec<H>> {
    if elements.is_empty() {
        return Err(ScrapeError::EmptyFeed);
    }

    // Posts at or after `start` form a prefix; stop at the first older one.
    let mut oldest_boundary = elements.len();
    for (i, element) in elements.iter().enumerate() {
        if parse_post_date(element)? < window.start {
            oldest_boundary = i;
            break;
        }
    }
    if oldest_boundary == 0 {
        return Err(ScrapeError::WindowNotFound {
            start: window.start,
        });
    }

    // Within the prefix, skip posts newer than `end`.
    let mut newest_boundary = 0;
    if let Some(end) = window.end {
        newest_boundary = oldest_boundary;
        for (i, element) in elements[..oldest_boundary].iter().enumerate() {
            if parse_post_date(element)? <= end {
                newest_boundary = i;
                break;
            }
        }
    }

    debug!(
        loaded = elements.len(),
        kept = oldest_boundary - newest_boundary,
        "Filtered feed to date window"
    );

    let mut selected: Vec<H> = elements
        .into_iter()
        .skip(newest_boundary)
        .take(oldest_boundary - newest_boundary)
        .collect();
    selected.reverse();
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::RenderedPost;
    use crate::post::Marker;

    fn post(date: &str) -> RenderedPost {
        RenderedPost::new().with_value(Marker::Date, &format!("{date}T00:00:00+00:00"))
    }

    fn dates(posts: &[RenderedPost]) -> Vec<String> {
        posts
            .iter()
            .map(|p| parse_post_date(p).unwrap().format("%Y-%m-%d").to_string())
            .collect()
    }

    fn feed() -> Vec<RenderedPost> {
        vec![post("2023-03-10"), post("2023-03-05"), post("2023-03-01")]
    }

    #[test]
    fn test_open_ended_window() {
        let window = ScrapeWindow::parse("2023-03-05", None, "UTC").unwrap();
        let result = filter_window(feed(), &window).unwrap();
        assert_eq!(dates(&result), vec!["2023-03-05", "2023-03-10"]);
    }

    #[test]
    fn test_bounded_window() {
        let window = ScrapeWindow::parse("2023-03-05", Some("2023-03-09"), "UTC").unwrap();
        let result = filter_window(feed(), &window).unwrap();
        assert_eq!(dates(&result), vec!["2023-03-05"]);
    }

    #[test]
    fn test_start_before_everything_keeps_all() {
        let window = ScrapeWindow::parse("2023-01-01", None, "UTC").unwrap();
        let result = filter_window(feed(), &window).unwrap();
        assert_eq!(dates(&result), vec!["2023-03-01", "2023-03-05", "2023-03-10"]);
    }

    #[test]
    fn test_single_post_at_start() {
        let window = ScrapeWindow::parse("2023-03-05", None, "UTC").unwrap();
        let result = filter_window(vec![post("2023-03-05")], &window).unwrap();
        assert_eq!(dates(&result), vec!["2023-03-05"]);
    }

    #[test]
    fn test_empty_feed() {
        let window = ScrapeWindow::parse("2023-03-05", None, "UTC").unwrap();
        let err = filter_window(Vec::<RenderedPost>::new(), &window).unwrap_err();
        assert!(matches!(err, ScrapeError::EmptyFeed));
    }

    #[test]
    fn test_window_not_found() {
        let window = ScrapeWindow::parse("2023-04-01", None, "UTC").unwrap();
        let err = filter_window(feed(), &window).unwrap_err();
        assert!(matches!(err, ScrapeError::WindowNotFound { .. }));
    }

    #[test]
    fn test_end_older_than_prefix_is_empty() {
        let feed = vec![post("2023-03-10"), post("2023-03-08"), post("2023-03-01")];
        let window = ScrapeWindow::parse("2023-03-05", Some("2023-03-06"), "UTC").unwrap();
        let result = filter_window(feed, &window).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_end_is_inclusive() {
        let window =
            ScrapeWindow::parse("2023-03-01", Some("2023-03-10 00:00:00"), "UTC").unwrap();
        let result = filter_window(feed(), &window).unwrap();
        assert_eq!(dates(&result), vec!["2023-03-01", "2023-03-05", "2023-03-10"]);
    }

    #[test]
    fn test_result_is_contiguous_run() {
        let feed: Vec<RenderedPost> = (1..=20)
            .rev()
            .map(|day| post(&format!("2023-05-{day:02}")))
            .collect();
        let window = ScrapeWindow::parse("2023-05-07", Some("2023-05-12"), "UTC").unwrap();
        let result = filter_window(feed, &window).unwrap();

        let expected: Vec<String> = (7..=12).map(|day| format!("2023-05-{day:02}")).collect();
        assert_eq!(dates(&result), expected);
    }

    #[test]
    fn test_window_in_other_timezone() {
        // 2023-03-05 00:00 in Kyiv is 2023-03-04 22:00 UTC
        let feed = vec![
            RenderedPost::new().with_value(Marker::Date, "2023-03-04T23:00:00+00:00"),
            RenderedPost::new().with_value(Marker::Date, "2023-03-04T21:00:00+00:00"),
        ];
        let window = ScrapeWindow::parse("2023-03-05", None, "Europe/Kiev").unwrap();
        let result = filter_window(feed, &window).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(
            parse_post_date(&result[0]).unwrap().to_rfc3339(),
            "2023-03-04T23:00:00+00:00"
        );
    }
}
