//! Metruyenchu (metruyencv.com) adapter.

use super::{
    SiteAdapter, StoryInfo, attr_url, direct_text_segments, distinct_texts, host_matches,
    optional_text, required_text, resolve_url, selector, text_without,
};
use crate::chapter::ChapterContent;
use crate::error::AssemblyError;
use crate::toc::{RawChapterEntry, TocPlan};
use scraper::{Html, Selector};

const DOMAIN: &str = "metruyencv.com";

/// CSS selectors used for parsing.
struct Selectors {
    story_title: Selector,
    author: Selector,
    genre: Selector,
    description: Selector,
    cover: Selector,
    toc_link: Selector,
    chapter_title: Selector,
    chapter_body: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            story_title: selector("div.page-content div.media h1"),
            author: selector("div.page-content div.media a[href*='tac-gia']"),
            genre: selector(
                "div.page-content div.media a[href*='?genre='], div.page-content div.media a[href*='?tag=']",
            ),
            description: selector("#nav-intro .content p"),
            cover: selector("div.page-content div.media .nh-thumb img"),
            toc_link: selector("div#chapter-list a"),
            chapter_title: selector("#js-read__body .h1"),
            chapter_body: selector("#article"),
        }
    }
}

/// Adapter for metruyencv.com. The TOC is a single list on the story page.
pub struct MetruyenchuSite {
    selectors: Selectors,
}

impl Default for MetruyenchuSite {
    fn default() -> Self {
        Self::new()
    }
}

impl MetruyenchuSite {
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }
}

impl SiteAdapter for MetruyenchuSite {
    fn name(&self) -> &'static str {
        "Metruyenchu"
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

    fn toc_plan(&self, _story: &Html, _story_url: &str) -> Result<TocPlan, AssemblyError> {
        Ok(TocPlan::Inline)
    }

    fn extract_raw_entries(&self, toc_page: &Html, page_url: &str) -> Vec<RawChapterEntry> {
        toc_page
            .select(&self.selectors.toc_link)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                // <small> holds the publish date.
                let title = text_without(link, "small");
                Some(RawChapterEntry::new(resolve_url(page_url, href), title))
            })
            .collect()
    }

    fn extract_chapter(&self, chapter: &Html) -> Result<ChapterContent, AssemblyError> {
        let title = required_text(chapter, &self.selectors.chapter_title, "chapter title")?;
        let body = chapter
            .select(&self.selectors.chapter_body)
            .next()
            .ok_or_else(|| AssemblyError::MissingElement("chapter content".to_string()))?;

        // Body text lives in bare text nodes between <br>s; nested elements
        // are alerts and ads.
        Ok(ChapterContent {
            title,
            paragraphs: direct_text_segments(body),
        })
    }
}
