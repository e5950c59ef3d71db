//! Chapter content assembly.
//!
//! Chapter bodies often open by repeating their own heading. The heading is
//! already rendered from the title, so the repeat is dropped.

use crate::error::AssemblyError;
use crate::fetch::Fetcher;
use crate::sites::SiteAdapter;
use crate::toc::aggregate::fetch_document;
use crate::toc::{ChapterEntry, comparison_form};
use serde::Serialize;
use tracing::debug;

/// Title and body segments of one chapter page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterContent {
    pub title: String,
    pub paragraphs: Vec<String>,
}

/// Drops the first body segment when it repeats the chapter title.
///
/// The comparison ignores case, whitespace and colons, and accepts
/// containment either way. Only the first segment is ever removed; a title
/// repeated mid-chapter is real content. Blank comparison forms never match.
pub fn strip_title_segment(title: &str, mut segments: Vec<String>) -> Vec<String> {
    let Some(first) = segments.first() else {
        return segments;
    };

    let title_form = comparison_form(title);
    let first_form = comparison_form(first);
    if title_form.is_empty() || first_form.is_empty() {
        return segments;
    }

    if first_form.contains(&title_form) || title_form.contains(&first_form) {
        debug!(segment = %first, "dropping repeated chapter heading");
        segments.remove(0);
    }
    segments
}

/// Fetches a chapter page and returns its content without the repeated
/// heading.
pub async fn download_chapter<F>(
    fetcher: &F,
    site: &dyn SiteAdapter,
    entry: &ChapterEntry,
) -> Result<ChapterContent, AssemblyError>
where
    F: Fetcher + ?Sized,
{
    let content = {
        let doc = fetch_document(fetcher, &entry.source_url, 1).await?;
        site.extract_chapter(&doc)?
    };

    let paragraphs = strip_title_segment(&content.title, content.paragraphs);
    Ok(ChapterContent {
        title: content.title,
        paragraphs,
    })
}
