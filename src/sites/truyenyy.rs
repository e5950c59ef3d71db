//! TruyenYY (truyenyy.pro) adapter.
//!
//! TOC pages are 1-based with 40 chapters each; the page count comes from the
//! chapter total shown on the story page.

use super::{
    SiteAdapter, StoryInfo, attr_url, distinct_texts, element_text, host_matches, optional_text,
    paragraph_texts, required_text, resolve_url, selector,
};
use crate::chapter::ChapterContent;
use crate::error::AssemblyError;
use crate::toc::urls::PAGE_PLACEHOLDER;
use crate::toc::{PageCountSignal, PageIndexBase, RawChapterEntry, TocPlan, TocUrlTemplate};
use scraper::{CaseSensitivity, Html, Selector};

const DOMAIN: &str = "truyenyy.pro";

/// Chapters listed per TOC page.
const PAGE_SIZE: u32 = 40;

/// CSS selectors used for parsing.
struct Selectors {
    story_title: Selector,
    author: Selector,
    genre: Selector,
    description: Selector,
    cover: Selector,
    canonical_url: Selector,
    chapter_total: Selector,
    toc_link: Selector,
    chapter_title: Selector,
    chapter_subtitle: Selector,
    chapter_body: Selector,
    paragraph: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            story_title: selector("div.novel-info .name"),
            author: selector("div.novel-info .author a"),
            genre: selector("ul.tag-list a:nth-child(1)"),
            description: selector("#id_novel_summary"),
            cover: selector("div.novel-info img"),
            canonical_url: selector("[property='og:url']"),
            chapter_total: selector(".novel-info .info ul.numbers li:nth-child(1)"),
            toc_link: selector("table.table a"),
            chapter_title: selector("h1.chap-title span"),
            chapter_subtitle: selector("h2.heading-font"),
            chapter_body: selector("div#inner_chap_content_1"),
            paragraph: selector("p"),
        }
    }
}

/// Adapter for truyenyy.pro.
pub struct TruyenyySite {
    selectors: Selectors,
}

impl Default for TruyenyySite {
    fn default() -> Self {
        Self::new()
    }
}

impl TruyenyySite {
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }
}

/// Upper-cases the first character only.
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl SiteAdapter for TruyenyySite {
    fn name(&self) -> &'static str {
        "Truyenyy"
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
            // Covers are lazy-loaded.
            cover_url: attr_url(story, &self.selectors.cover, "data-src", story_url),
        }
    }

    fn toc_plan(&self, story: &Html, _story_url: &str) -> Result<TocPlan, AssemblyError> {
        let base = story
            .select(&self.selectors.canonical_url)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AssemblyError::MissingElement("base URL (og:url)".to_string()))?;
        let base = base.trim_end_matches('/');

        let template = TocUrlTemplate::parse(
            &format!("{}/danh-sach-chuong/?p={}", base, PAGE_PLACEHOLDER),
            PageIndexBase::One,
        )?;

        let signal = match story.select(&self.selectors.chapter_total).next() {
            Some(total) => PageCountSignal::ItemCount {
                text: element_text(total),
                page_size: PAGE_SIZE,
            },
            None => PageCountSignal::Absent,
        };

        Ok(TocPlan::Paginated { template, signal })
    }

    fn extract_raw_entries(&self, toc_page: &Html, page_url: &str) -> Vec<RawChapterEntry> {
        // The chapter-number link precedes its title link; the title link
        // carries both.
        let mut previous_text = String::new();
        let mut entries = Vec::new();

        for link in toc_page.select(&self.selectors.toc_link) {
            let mut text = element_text(link);
            let is_title = link
                .value()
                .has_class("table-chap-title", CaseSensitivity::CaseSensitive);

            if is_title {
                text = format!("{}: {}", previous_text, text);
                if let Some(href) = link.value().attr("href") {
                    entries.push(RawChapterEntry::new(resolve_url(page_url, href), text.clone()));
                }
            }
            previous_text = text;
        }

        entries
    }

    fn extract_chapter(&self, chapter: &Html) -> Result<ChapterContent, AssemblyError> {
        let main_title = required_text(chapter, &self.selectors.chapter_title, "chapter title")?;
        let subtitle = chapter
            .select(&self.selectors.chapter_subtitle)
            .next()
            .map(element_text)
            .filter(|s| !s.is_empty())
            .map(|s| capitalize_first(&s));

        let title = match subtitle {
            Some(subtitle) => format!("{}: {}", main_title, subtitle),
            None => main_title,
        };

        let body = chapter
            .select(&self.selectors.chapter_body)
            .next()
            .ok_or_else(|| AssemblyError::MissingElement("chapter content".to_string()))?;

        let mut paragraphs = paragraph_texts(body, &self.selectors.paragraph);
        if paragraphs.is_empty() {
            let text = element_text(body);
            if !text.is_empty() {
                paragraphs.push(text);
            }
        }

        Ok(ChapterContent { title, paragraphs })
    }
}
