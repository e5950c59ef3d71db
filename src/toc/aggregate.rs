//! Ordered fetching and merging of TOC pages.
//!
//! Pages are fetched strictly one after another. Reading order depends on it,
//! so there is no page-level parallelism even though the fetches are
//! independent.

use super::{RawChapterEntry, TocPage};
use crate::error::AssemblyError;
use crate::fetch::Fetcher;
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Receives progress after each TOC page.
///
/// Returning `false` asks the run to stop before the next page. An in-flight
/// fetch always completes first.
pub trait ProgressSink {
    fn on_page_complete(&mut self, done: usize, total: usize) -> bool;
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize) -> bool,
{
    fn on_page_complete(&mut self, done: usize, total: usize) -> bool {
        self(done, total)
    }
}

/// Fetches every URL in order and concatenates the extracted entries.
///
/// A failed fetch aborts the whole aggregation; a page with no entries is
/// fine and contributes nothing.
pub async fn aggregate_pages<F, E>(
    fetcher: &F,
    urls: &[String],
    extract: E,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<RawChapterEntry>, AssemblyError>
where
    F: Fetcher + ?Sized,
    E: Fn(&Html, &str) -> Vec<RawChapterEntry>,
{
    let total = urls.len();
    let mut entries = Vec::new();

    for (index, url) in urls.iter().enumerate() {
        let done = index + 1;
        let page = {
            let doc = fetch_document(fetcher, url, done).await?;
            TocPage {
                url: url.clone(),
                raw_entries: extract(&doc, url),
            }
        };

        debug!(url = %page.url, page = done, total, entries = page.raw_entries.len(), "TOC page extracted");
        entries.extend(page.raw_entries);

        if !progress.on_page_complete(done, total) && done < total {
            return Err(AssemblyError::Cancelled { done, total });
        }
    }

    Ok(entries)
}

/// Entries gathered by a follow-next walk.
#[derive(Debug, Default)]
pub struct FollowedToc {
    pub entries: Vec<RawChapterEntry>,
    /// The walk stopped at the page limit while a next page was still linked.
    pub truncated: bool,
}

/// Walks TOC pages through their "next" links, starting at `start_url`.
///
/// Stops when a page has no next link, when the next link points at a page
/// already visited, or after `max_pages` pages. While a next page exists the
/// reported total is one more than the pages done.
pub async fn aggregate_following_next<F, E, N>(
    fetcher: &F,
    start_url: &str,
    max_pages: usize,
    extract: E,
    next_page: N,
    progress: &mut dyn ProgressSink,
) -> Result<FollowedToc, AssemblyError>
where
    F: Fetcher + ?Sized,
    E: Fn(&Html, &str) -> Vec<RawChapterEntry>,
    N: Fn(&Html, &str) -> Option<String>,
{
    let mut followed = FollowedToc::default();
    let mut visited = HashSet::new();
    let mut current = Some(start_url.to_string());
    let mut done = 0;

    while let Some(url) = current.take() {
        visited.insert(url.clone());
        done += 1;

        let (raw_entries, next) = {
            let doc = fetch_document(fetcher, &url, done).await?;
            (extract(&doc, &url), next_page(&doc, &url))
        };

        debug!(url = %url, page = done, entries = raw_entries.len(), "TOC page extracted");
        followed.entries.extend(raw_entries);

        let next = next.filter(|next| !visited.contains(next));
        let next = match next {
            Some(next) if done >= max_pages => {
                warn!(max_pages, skipped = %next, "TOC page limit reached, stopping");
                followed.truncated = true;
                None
            }
            next => next,
        };

        let total = if next.is_some() { done + 1 } else { done };
        if !progress.on_page_complete(done, total) && next.is_some() {
            return Err(AssemblyError::Cancelled { done, total });
        }

        current = next;
    }

    Ok(followed)
}

/// Fetches one page, attaching its URL and page index to any failure.
pub(crate) async fn fetch_document<F>(
    fetcher: &F,
    url: &str,
    page: usize,
) -> Result<Html, AssemblyError>
where
    F: Fetcher + ?Sized,
{
    fetcher
        .fetch(url)
        .await
        .map_err(|source| AssemblyError::Fetch {
            url: url.to_string(),
            page,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use scraper::Selector;
    use std::sync::LazyLock;

    static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.chap").unwrap());
    static NEXT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.next").unwrap());

    fn extract(doc: &Html, _url: &str) -> Vec<RawChapterEntry> {
        doc.select(&LINK)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some(RawChapterEntry::new(href, a.text().collect::<String>()))
            })
            .collect()
    }

    fn next_link(doc: &Html, _url: &str) -> Option<String> {
        doc.select(&NEXT)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    }

    fn page(links: &[&str], next: Option<&str>) -> String {
        let mut html: String = links
            .iter()
            .map(|l| format!(r#"<a class="chap" href="/{l}">{l}</a>"#))
            .collect();
        if let Some(next) = next {
            html.push_str(&format!(r#"<a class="next" href="{next}">»</a>"#));
        }
        html
    }

    fn urls(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("https://toc.test/p{i}")).collect()
    }

    #[tokio::test]
    async fn test_pages_merged_in_order() {
        let fetcher = StaticFetcher::new()
            .page("https://toc.test/p1", &page(&["c1", "c2"], None))
            .page("https://toc.test/p2", &page(&["c3"], None))
            .page("https://toc.test/p3", &page(&["c4", "c5"], None));

        let mut reports = Vec::new();
        let mut sink = |done: usize, total: usize| {
            reports.push((done, total));
            true
        };
        let entries = aggregate_pages(&fetcher, &urls(3), extract, &mut sink)
            .await
            .unwrap();

        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["c1", "c2", "c3", "c4", "c5"]);
        assert_eq!(reports, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(fetcher.requested(), urls(3));
    }

    #[tokio::test]
    async fn test_empty_page_contributes_nothing() {
        let fetcher = StaticFetcher::new()
            .page("https://toc.test/p1", &page(&["c1"], None))
            .page("https://toc.test/p2", "<p>nothing here</p>");

        let entries = aggregate_pages(&fetcher, &urls(2), extract, &mut |_: usize, _: usize| true)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_with_context() {
        let fetcher = StaticFetcher::new()
            .page("https://toc.test/p1", &page(&["c1"], None))
            .failing("https://toc.test/p2")
            .page("https://toc.test/p3", &page(&["c3"], None));

        let err = aggregate_pages(&fetcher, &urls(3), extract, &mut |_: usize, _: usize| true)
            .await
            .unwrap_err();

        match err {
            AssemblyError::Fetch { url, page, .. } => {
                assert_eq!(url, "https://toc.test/p2");
                assert_eq!(page, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_between_pages() {
        let fetcher = StaticFetcher::new()
            .page("https://toc.test/p1", &page(&["c1"], None))
            .page("https://toc.test/p2", &page(&["c2"], None));

        let err = aggregate_pages(&fetcher, &urls(2), extract, &mut |_: usize, _: usize| false)
            .await
            .unwrap_err();
        assert!(matches!(err, AssemblyError::Cancelled { done: 1, total: 2 }));
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_next_walks_until_no_link() {
        let fetcher = StaticFetcher::new()
            .page("https://toc.test/a", &page(&["c1"], Some("https://toc.test/b")))
            .page("https://toc.test/b", &page(&["c2"], Some("https://toc.test/c")))
            .page("https://toc.test/c", &page(&["c3"], None));

        let mut reports = Vec::new();
        let mut sink = |done: usize, total: usize| {
            reports.push((done, total));
            true
        };
        let followed = aggregate_following_next(
            &fetcher,
            "https://toc.test/a",
            10,
            extract,
            next_link,
            &mut sink,
        )
        .await
        .unwrap();

        assert_eq!(followed.entries.len(), 3);
        assert!(!followed.truncated);
        assert_eq!(reports, vec![(1, 2), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_follow_next_stops_on_cycle_and_limit() {
        let fetcher = StaticFetcher::new()
            .page("https://toc.test/a", &page(&["c1"], Some("https://toc.test/b")))
            .page("https://toc.test/b", &page(&["c2"], Some("https://toc.test/a")));

        let cycled = aggregate_following_next(
            &fetcher,
            "https://toc.test/a",
            10,
            extract,
            next_link,
            &mut |_: usize, _: usize| true,
        )
        .await
        .unwrap();
        assert_eq!(cycled.entries.len(), 2);
        assert!(!cycled.truncated);

        let limited = aggregate_following_next(
            &fetcher,
            "https://toc.test/a",
            1,
            extract,
            next_link,
            &mut |_: usize, _: usize| true,
        )
        .await
        .unwrap();
        assert_eq!(limited.entries.len(), 1);
        assert!(limited.truncated);
    }
}
