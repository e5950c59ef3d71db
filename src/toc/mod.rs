//! Table-of-contents engine.
//!
//! Turns one or many TOC pages into a single ordered chapter sequence:
//! page-count resolution, URL enumeration, ordered aggregation, divider
//! de-duplication and title normalization.

pub mod aggregate;
pub mod assemble;
pub mod divider;
pub mod page_count;
pub mod title;
pub mod urls;

pub use aggregate::{FollowedToc, ProgressSink, aggregate_following_next, aggregate_pages};
pub use assemble::{AssemblyState, ChapterListAssembler};
pub use divider::DividerTracker;
pub use page_count::{PageCountSignal, PaginationControls, PaginationLabels, resolve_page_count};
pub use title::{comparison_form, normalize_title};
pub use urls::{PageIndexBase, TocUrlTemplate};

use serde::Serialize;

/// One chapter in its final, normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterEntry {
    /// Absolute URL of the chapter page; the entry's identity.
    pub source_url: String,

    /// Display title.
    pub title: String,
}

/// A section or volume heading attached to the first chapter under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividerMarker {
    pub label: String,
}

/// A chapter as emitted by a site extractor, before the merge pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChapterEntry {
    pub source_url: String,
    pub title: String,
    pub divider: Option<DividerMarker>,
}

impl RawChapterEntry {
    pub fn new(source_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            title: title.into(),
            divider: None,
        }
    }

    /// Attaches a divider label; a blank label attaches nothing.
    pub fn with_divider(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        let label = label.trim();
        if !label.is_empty() {
            self.divider = Some(DividerMarker {
                label: label.to_string(),
            });
        }
        self
    }
}

impl From<RawChapterEntry> for ChapterEntry {
    fn from(raw: RawChapterEntry) -> Self {
        ChapterEntry {
            source_url: raw.source_url,
            title: raw.title,
        }
    }
}

/// Entries extracted from a single fetched TOC page.
#[derive(Debug, Clone)]
pub struct TocPage {
    pub url: String,
    pub raw_entries: Vec<RawChapterEntry>,
}

/// How a site's TOC is laid out, derived from the story page.
#[derive(Debug, Clone)]
pub enum TocPlan {
    /// Numbered TOC pages; the count comes from the signal.
    Paginated {
        template: TocUrlTemplate,
        signal: PageCountSignal,
    },

    /// TOC pages linked only by a "next" control.
    FollowNext { start_url: String },

    /// The story page itself is the whole TOC.
    Inline,
}
