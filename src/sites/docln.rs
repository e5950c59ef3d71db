//! Hako / DocLN (docln.net, ln.hako.vn) adapter.

use super::{
    SiteAdapter, StoryInfo, distinct_texts, element_text, host_matches, optional_text,
    paragraph_texts, required_text, resolve_url, selector, text_excluding,
};
use crate::chapter::ChapterContent;
use crate::error::AssemblyError;
use crate::toc::{RawChapterEntry, TocPlan};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

const DOMAINS: [&str; 2] = ["docln.net", "ln.hako.vn"];

/// `url(...)` inside an inline `background-image` style.
static BACKGROUND_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).unwrap());

/// CSS selectors used for parsing.
struct Selectors {
    story_title: Selector,
    author: Selector,
    genre: Selector,
    summary: Selector,
    summary_more: Selector,
    cover: Selector,
    volume: Selector,
    volume_title: Selector,
    chapter_item: Selector,
    anchor: Selector,
    chapter_title: Selector,
    chapter_body: Selector,
    paragraph: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            story_title: selector("div.top-part span.series-name a"),
            author: selector("div.top-part div.info-item span.info-value"),
            genre: selector("a.series-gerne-item"),
            summary: selector(".summary-wrapper"),
            summary_more: selector(".summary-more"),
            cover: selector("div.top-part div.series-cover [style*=background-image]"),
            volume: selector(".volume-list"),
            volume_title: selector("header.sect-header span.sect-title"),
            chapter_item: selector("ul.list-chapters li"),
            anchor: selector("a"),
            chapter_title: selector("div.title-top h4.title-item"),
            chapter_body: selector("#chapter-content"),
            paragraph: selector("p"),
        }
    }
}

/// Adapter for docln.net and its ln.hako.vn mirror.
///
/// The whole TOC, grouped by volume, sits on the story page.
pub struct DoclnSite {
    selectors: Selectors,
}

impl Default for DoclnSite {
    fn default() -> Self {
        Self::new()
    }
}

impl DoclnSite {
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }
}

/// Image URL from an inline `background-image: url(...)` style.
fn background_image_url(style: &str) -> Option<&str> {
    BACKGROUND_URL_REGEX
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|url| !url.is_empty())
}

impl SiteAdapter for DoclnSite {
    fn name(&self) -> &'static str {
        "Docln"
    }

    fn can_handle(&self, url: &str) -> bool {
        DOMAINS.iter().any(|domain| host_matches(url, domain))
    }

    fn extract_story_info(&self, story: &Html, story_url: &str) -> StoryInfo {
        let summaries: Vec<String> = story
            .select(&self.selectors.summary)
            .map(|wrapper| text_excluding(wrapper, &self.selectors.summary_more))
            .filter(|text| !text.is_empty())
            .collect();

        let cover_url = story
            .select(&self.selectors.cover)
            .next()
            .and_then(|div| div.value().attr("style"))
            .and_then(background_image_url)
            .map(|url| resolve_url(story_url, url));

        StoryInfo {
            title: optional_text(story, &self.selectors.story_title),
            author: optional_text(story, &self.selectors.author),
            description: (!summaries.is_empty()).then(|| summaries.join("\n\n")),
            genres: distinct_texts(story, &self.selectors.genre),
            cover_url,
        }
    }

    fn toc_plan(&self, _story: &Html, _story_url: &str) -> Result<TocPlan, AssemblyError> {
        Ok(TocPlan::Inline)
    }

    fn extract_raw_entries(&self, toc_page: &Html, page_url: &str) -> Vec<RawChapterEntry> {
        let mut entries = Vec::new();

        for volume in toc_page.select(&self.selectors.volume) {
            // Volumes without a heading are not real sections.
            let Some(header) = volume.select(&self.selectors.volume_title).next() else {
                continue;
            };
            let volume_name = element_text(header);
            let mut first_in_volume = true;

            for item in volume.select(&self.selectors.chapter_item) {
                let Some(link) = item.select(&self.selectors.anchor).next() else {
                    continue;
                };
                let Some(href) = link.value().attr("href").filter(|href| !href.is_empty()) else {
                    continue;
                };

                let mut entry = RawChapterEntry::new(resolve_url(page_url, href), element_text(link));
                // Link-less rows are skipped above, so the heading lands on the
                // first chapter that is actually emitted.
                if first_in_volume {
                    entry = entry.with_divider(volume_name.as_str());
                    first_in_volume = false;
                }
                entries.push(entry);
            }
        }

        entries
    }

    fn extract_chapter(&self, chapter: &Html) -> Result<ChapterContent, AssemblyError> {
        let title = required_text(chapter, &self.selectors.chapter_title, "chapter title")?;
        let body = chapter
            .select(&self.selectors.chapter_body)
            .next()
            .ok_or_else(|| AssemblyError::MissingElement("chapter content".to_string()))?;

        Ok(ChapterContent {
            title,
            paragraphs: paragraph_texts(body, &self.selectors.paragraph),
        })
    }
}
