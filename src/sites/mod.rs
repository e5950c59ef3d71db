//! Site adapter trait and shared extraction helpers.
//!
//! Each adapter maps one site's markup to the engine's common shapes: a
//! [`TocPlan`] and [`StoryInfo`] from the story page, [`RawChapterEntry`]
//! lists from TOC pages, and [`ChapterContent`] from chapter pages. The
//! engine never looks at site markup itself.

mod bachngocsach;
mod docln;
mod metruyenchu;
mod tangthuvien;
mod truyenyy;

pub use bachngocsach::BachngocsachSite;
pub use docln::DoclnSite;
pub use metruyenchu::MetruyenchuSite;
pub use tangthuvien::TangthuvienSite;
pub use truyenyy::TruyenyySite;

use crate::chapter::ChapterContent;
use crate::error::AssemblyError;
use crate::toc::{RawChapterEntry, TocPlan};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use url::Url;

/// Story metadata read from the story page.
///
/// Every field is best effort; a missing element leaves it empty rather than
/// failing the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    /// Genres and tags, in page order without duplicates.
    pub genres: Vec<String>,
    /// Absolute cover image URL.
    pub cover_url: Option<String>,
}

/// Per-site strategy used by the assembly engine.
pub trait SiteAdapter: Send + Sync {
    /// Returns the human-readable name of this site.
    fn name(&self) -> &'static str;

    /// Checks if this adapter can handle the given URL.
    fn can_handle(&self, url: &str) -> bool;

    /// Reads title, author, description, genres and cover from the story page.
    fn extract_story_info(&self, story: &Html, story_url: &str) -> StoryInfo;

    /// Works out the TOC layout from the already-fetched story page.
    fn toc_plan(&self, story: &Html, story_url: &str) -> Result<TocPlan, AssemblyError>;

    /// Extracts chapter entries from one TOC page, in document order.
    fn extract_raw_entries(&self, toc_page: &Html, page_url: &str) -> Vec<RawChapterEntry>;

    /// URL of the following TOC page, for [`TocPlan::FollowNext`] sites.
    ///
    /// Defaults to `None`, which ends the walk after the first page.
    fn next_toc_page(&self, _toc_page: &Html, _page_url: &str) -> Option<String> {
        None
    }

    /// Extracts the title and body segments of a chapter page.
    ///
    /// Missing title or body is an error, never an empty chapter.
    fn extract_chapter(&self, chapter: &Html) -> Result<ChapterContent, AssemblyError>;
}

/// Registry of available site adapters.
pub struct SiteRegistry {
    sites: Vec<Box<dyn SiteAdapter>>,
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteRegistry {
    /// Creates a registry with all built-in adapters.
    pub fn new() -> Self {
        let sites: Vec<Box<dyn SiteAdapter>> = vec![
            Box::new(TangthuvienSite::new()),
            Box::new(TruyenyySite::new()),
            Box::new(DoclnSite::new()),
            Box::new(MetruyenchuSite::new()),
            Box::new(BachngocsachSite::new()),
        ];

        Self { sites }
    }

    /// Finds an adapter that can handle the given URL.
    pub fn find_for_url(&self, url: &str) -> Option<&dyn SiteAdapter> {
        self.sites
            .iter()
            .find(|s| s.can_handle(url))
            .map(|s| s.as_ref())
    }

    /// Returns all registered adapters.
    pub fn all(&self) -> &[Box<dyn SiteAdapter>] {
        &self.sites
    }
}

/// Parses a selector known at compile time.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

/// True if the URL's host is `domain` or a subdomain of it.
pub(crate) fn host_matches(url: &str, domain: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .is_some_and(|host| host == domain || host.ends_with(&format!(".{}", domain)))
}

/// Resolves a possibly relative href against the page it came from.
pub(crate) fn resolve_url(base: &str, href: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Concatenated, trimmed text of an element.
pub(crate) fn element_text(elem: ElementRef) -> String {
    elem.text().collect::<String>().trim().to_string()
}

/// Text of an element, leaving out anything inside `skipped` descendants.
pub(crate) fn text_without(elem: ElementRef, skipped: &str) -> String {
    collect_text(elem, |ancestor| ancestor.value().name() == skipped)
}

/// Text of an element, leaving out every subtree matching `excluded`.
pub(crate) fn text_excluding(elem: ElementRef, excluded: &Selector) -> String {
    let skipped: Vec<ElementRef> = elem.select(excluded).collect();
    collect_text(elem, |ancestor| skipped.iter().any(|s| s.id() == ancestor.id()))
}

/// Concatenates the text under `elem`, leaving out text inside any element
/// below `elem` for which `skip` holds.
fn collect_text(elem: ElementRef, skip: impl Fn(ElementRef) -> bool) -> String {
    let mut text = String::new();

    for node in elem.descendants() {
        if let Node::Text(t) = node.value() {
            let inside_skipped = node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != elem.id())
                .filter_map(ElementRef::wrap)
                .any(&skip);

            if !inside_skipped {
                text.push_str(t);
            }
        }
    }

    text.trim().to_string()
}

/// Non-blank direct text children of an element, trimmed.
pub(crate) fn direct_text_segments(elem: ElementRef) -> Vec<String> {
    elem.children()
        .filter_map(|child| match child.value() {
            Node::Text(t) => Some(t.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Trimmed, non-blank text of each element matching `sel` under `elem`.
pub(crate) fn paragraph_texts(elem: ElementRef, sel: &Selector) -> Vec<String> {
    elem.select(sel)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Text of the first match, failing loudly when it is missing or blank.
pub(crate) fn required_text(doc: &Html, sel: &Selector, what: &str) -> Result<String, AssemblyError> {
    doc.select(sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AssemblyError::MissingElement(what.to_string()))
}

/// Trimmed text of the first match, if present and non-blank.
pub(crate) fn optional_text(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Trimmed, non-blank texts of all matches, first occurrence only.
pub(crate) fn distinct_texts(doc: &Html, sel: &Selector) -> Vec<String> {
    let mut seen = HashSet::new();
    doc.select(sel)
        .map(element_text)
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// `attr` of the first match, resolved against the page URL.
pub(crate) fn attr_url(doc: &Html, sel: &Selector, attr: &str, page_url: &str) -> Option<String> {
    doc.select(sel)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve_url(page_url, href))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_finds_adapters() {
        let registry = SiteRegistry::new();
        let name = |url: &str| registry.find_for_url(url).map(|s| s.name());

        assert_eq!(name("https://truyen.tangthuvien.vn/doc-truyen/abc"), Some("Tangthuvien"));
        assert_eq!(name("https://truyenyy.pro/truyen/abc/"), Some("Truyenyy"));
        assert_eq!(name("https://docln.net/truyen/123-abc"), Some("Docln"));
        assert_eq!(name("https://ln.hako.vn/truyen/123-abc"), Some("Docln"));
        assert_eq!(name("https://metruyencv.com/truyen/abc"), Some("Metruyenchu"));
        assert_eq!(name("https://bachngocsach.com.vn/reader/abc"), Some("Bachngocsach"));
        assert_eq!(name("https://example.com/"), None);
        assert_eq!(name("not a url"), None);
        assert_eq!(registry.all().len(), 5);
    }

    #[test]
    fn test_host_matches_rejects_lookalikes() {
        assert!(host_matches("https://www.docln.net/x", "docln.net"));
        assert!(!host_matches("https://notdocln.net/x", "docln.net"));
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://docln.net/truyen/1-a", "/truyen/1-a/c2-b"),
            "https://docln.net/truyen/1-a/c2-b"
        );
        assert_eq!(
            resolve_url("https://docln.net/truyen/1-a/", "c3"),
            "https://docln.net/truyen/1-a/c3"
        );
        assert_eq!(
            resolve_url("https://docln.net/truyen/1-a", "https://other.test/page"),
            "https://other.test/page"
        );
    }

    #[test]
    fn test_text_without_skips_nested_tag() {
        let doc = Html::parse_fragment(r#"<a id="x">Chương 1 <small>2 ngày trước</small>Mở đầu</a>"#);
        let a = doc.select(&selector("a#x")).next().unwrap();
        assert_eq!(text_without(a, "small"), "Chương 1 Mở đầu");
    }

    #[test]
    fn test_direct_text_segments() {
        let doc = Html::parse_fragment(
            "<div id=\"a\">  one <br> two <script>x()</script><p>nested</p>\n</div>",
        );
        let div = doc.select(&selector("div#a")).next().unwrap();
        assert_eq!(direct_text_segments(div), vec!["one", "two"]);
    }

    #[test]
    fn test_text_excluding_selector() {
        let doc = Html::parse_fragment(
            r#"<div id="s">Tóm tắt <span class="more">Xem thêm</span>truyện.</div>"#,
        );
        let div = doc.select(&selector("div#s")).next().unwrap();
        assert_eq!(text_excluding(div, &selector(".more")), "Tóm tắt truyện.");
    }

    #[test]
    fn test_metadata_helpers() {
        let doc = Html::parse_document(
            r#"<h1> </h1><a class="g">Tiên hiệp</a><a class="g">Huyền huyễn</a><a class="g">Tiên hiệp</a>
            <div class="cover"><img src="/img/a.jpg"></div>"#,
        );
        assert_eq!(optional_text(&doc, &selector("h1")), None);
        assert_eq!(distinct_texts(&doc, &selector("a.g")), vec!["Tiên hiệp", "Huyền huyễn"]);
        assert_eq!(
            attr_url(&doc, &selector("div.cover img"), "src", "https://docln.net/truyen/1"),
            Some("https://docln.net/img/a.jpg".to_string())
        );
    }

    #[test]
    fn test_required_text_fails_loud() {
        let doc = Html::parse_document("<h2>  </h2>");
        let err = required_text(&doc, &selector("h2"), "chapter title").unwrap_err();
        assert!(matches!(err, AssemblyError::MissingElement(w) if w == "chapter title"));
    }
}
