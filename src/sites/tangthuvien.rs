//! Tang Thu Vien (truyen.tangthuvien.vn) adapter.
//!
//! The TOC is served in numbered, 0-based pages of 75 chapters. Volume
//! headings are `li.divider-chap` rows, and every page repeats the heading of
//! the volume it starts in.

use super::{
    SiteAdapter, StoryInfo, attr_url, distinct_texts, element_text, host_matches, optional_text,
    required_text, resolve_url, selector, text_without,
};
use crate::chapter::ChapterContent;
use crate::error::AssemblyError;
use crate::toc::urls::PAGE_PLACEHOLDER;
use crate::toc::{
    PageCountSignal, PageIndexBase, PaginationControls, PaginationLabels, RawChapterEntry,
    TocPlan, TocUrlTemplate,
};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

const DOMAIN: &str = "truyen.tangthuvien.vn";

const LABELS: PaginationLabels = PaginationLabels {
    last_page: "Trang cuối",
    next: "»",
};

/// Blank line separating paragraphs in the chapter body.
static BLANK_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());

/// CSS selectors used for parsing.
struct Selectors {
    story_title: Selector,
    author: Selector,
    genre: Selector,
    description: Selector,
    cover: Selector,
    story_id: Selector,
    pagination: Selector,
    last_page_link: Selector,
    anchor: Selector,
    toc_row: Selector,
    chapter_title: Selector,
    chapter_body: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            story_title: selector(".book-info h1"),
            author: selector("div.book-information div.book-info a[href*='/tac-gia']"),
            genre: selector("p.tag a:last-child"),
            description: selector("div.book-intro"),
            cover: selector("div.book-img img"),
            story_id: selector("input#story_id_hidden"),
            pagination: selector("ul.pagination"),
            last_page_link: selector("li:last-child a"),
            anchor: selector("a"),
            toc_row: selector("ul.cf li"),
            chapter_title: selector("div.content .chapter h2"),
            chapter_body: selector("div.box-chap"),
        }
    }
}

/// Adapter for truyen.tangthuvien.vn.
pub struct TangthuvienSite {
    selectors: Selectors,
}

impl Default for TangthuvienSite {
    fn default() -> Self {
        Self::new()
    }
}

impl TangthuvienSite {
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }

    fn page_count_signal(&self, story: &Html) -> PageCountSignal {
        let Some(pagination) = story.select(&self.selectors.pagination).next() else {
            return PageCountSignal::Absent;
        };

        let last = pagination.select(&self.selectors.last_page_link).next();
        let anchors: Vec<String> = pagination
            .select(&self.selectors.anchor)
            .map(element_text)
            .collect();

        PageCountSignal::Pagination {
            controls: PaginationControls {
                last_label: last.map(element_text).unwrap_or_default(),
                last_action: last.and_then(|a| a.value().attr("onclick").map(str::to_string)),
                anchor_count: anchors.len(),
                numbered_pages: anchors.iter().filter_map(|t| t.parse().ok()).collect(),
            },
            labels: LABELS,
        }
    }
}

impl SiteAdapter for TangthuvienSite {
    fn name(&self) -> &'static str {
        "Tangthuvien"
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, DOMAIN)
    }

    fn extract_story_info(&self, story: &Html, story_url: &str) -> StoryInfo {
        StoryInfo {
            title: optional_text(story, &self.selectors.story_title),
            author: optional_text(story, &self.selectors.author),
            description: optional_text(story, &self.selectors.description),
            genres: distinct_texts(story, &self.selectors.genre),
            cover_url: attr_url(story, &self.selectors.cover, "src", story_url),
        }
    }

    fn toc_plan(&self, story: &Html, _story_url: &str) -> Result<TocPlan, AssemblyError> {
        let story_id = story
            .select(&self.selectors.story_id)
            .next()
            .and_then(|input| input.value().attr("value"))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AssemblyError::MissingElement("story id".to_string()))?;

        let template = TocUrlTemplate::parse(
            &format!(
                "https://{}/doc-truyen/page/{}?web=1&limit=75&page={}",
                DOMAIN, story_id, PAGE_PLACEHOLDER
            ),
            PageIndexBase::Zero,
        )?;

        Ok(TocPlan::Paginated {
            template,
            signal: self.page_count_signal(story),
        })
    }

    fn extract_raw_entries(&self, toc_page: &Html, page_url: &str) -> Vec<RawChapterEntry> {
        let mut pending_divider: Option<String> = None;
        let mut entries = Vec::new();

        for row in toc_page.select(&self.selectors.toc_row) {
            if row.value().has_class("divider-chap", scraper::CaseSensitivity::CaseSensitive) {
                pending_divider = Some(element_text(row));
                continue;
            }

            let Some(link) = row.select(&self.selectors.anchor).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };

            let mut entry = RawChapterEntry::new(resolve_url(page_url, href), element_text(link));
            if let Some(label) = pending_divider.take() {
                entry = entry.with_divider(label);
            }
            entries.push(entry);
        }

        entries
    }

    fn extract_chapter(&self, chapter: &Html) -> Result<ChapterContent, AssemblyError> {
        let title = required_text(chapter, &self.selectors.chapter_title, "chapter title")?;
        let body = chapter
            .select(&self.selectors.chapter_body)
            .next()
            .ok_or_else(|| AssemblyError::MissingElement("chapter content".to_string()))?;

        let text = text_without(body, "script");
        let paragraphs = BLANK_LINE_REGEX
            .split(&text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ChapterContent { title, paragraphs })
    }
}
