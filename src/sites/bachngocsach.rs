//! Bach Ngoc Sach (bachngocsach.com.vn) adapter.
//!
//! The TOC lives on a separate `muc-luc` page whose pages link to each other
//! only through a "next" control.

use super::{
    SiteAdapter, StoryInfo, attr_url, distinct_texts, element_text, host_matches, optional_text,
    paragraph_texts, required_text, resolve_url, selector,
};
use crate::chapter::ChapterContent;
use crate::error::AssemblyError;
use crate::toc::{RawChapterEntry, TocPlan};
use scraper::{Html, Selector};

const DOMAIN: &str = "bachngocsach.com.vn";

/// CSS selectors used for parsing.
struct Selectors {
    story_title: Selector,
    author: Selector,
    genre: Selector,
    description: Selector,
    cover: Selector,
    toc_link: Selector,
    chapter_name: Selector,
    next_page: Selector,
    chapter_title: Selector,
    chapter_body: Selector,
    paragraph: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            story_title: selector("h1#truyen-title"),
            author: selector("#tacgia a"),
            genre: selector("#theloai a"),
            description: selector("div#gioithieu .block-content"),
            cover: selector("div#anhbia img"),
            toc_link: selector("#mucluc-list .chuong-item a"),
            chapter_name: selector("span.chuong-name"),
            next_page: selector(".listpage span.right a"),
            chapter_title: selector("h1#chuong-title"),
            chapter_body: selector("#noi-dung"),
            paragraph: selector("p"),
        }
    }
}

/// Adapter for bachngocsach.com.vn.
pub struct BachngocsachSite {
    selectors: Selectors,
}

impl Default for BachngocsachSite {
    fn default() -> Self {
        Self::new()
    }
}

impl BachngocsachSite {
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }
}

impl SiteAdapter for BachngocsachSite {
    fn name(&self) -> &'static str {
        "Bachngocsach"
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

    fn toc_plan(&self, _story: &Html, story_url: &str) -> Result<TocPlan, AssemblyError> {
        let base = story_url.split('#').next().unwrap_or(story_url);
        let base = base.trim_end_matches('/');
        Ok(TocPlan::FollowNext {
            start_url: format!("{}/muc-luc?page=all", base),
        })
    }

    fn extract_raw_entries(&self, toc_page: &Html, page_url: &str) -> Vec<RawChapterEntry> {
        toc_page
            .select(&self.selectors.toc_link)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                let title = link
                    .select(&self.selectors.chapter_name)
                    .next()
                    .map(element_text)
                    .unwrap_or_else(|| element_text(link));
                Some(RawChapterEntry::new(resolve_url(page_url, href), title))
            })
            .collect()
    }

    fn next_toc_page(&self, toc_page: &Html, page_url: &str) -> Option<String> {
        toc_page
            .select(&self.selectors.next_page)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(|href| resolve_url(page_url, href))
    }

    fn extract_chapter(&self, chapter: &Html) -> Result<ChapterContent, AssemblyError> {
        let title = required_text(chapter, &self.selectors.chapter_title, "chapter title")?;
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
