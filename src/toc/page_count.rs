//! TOC page-count resolution.
//!
//! Site adapters read whatever their pagination markup exposes into a
//! [`PageCountSignal`]; [`resolve_page_count`] turns it into a page count.
//! The heuristics are guesses tied to each site's markup: a restyled control
//! yields a wrong count without any detection. Ambiguity never fails, it falls
//! back to a single page.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::warn;

static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Labels a site uses on its pagination control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationLabels {
    /// Visible text of the "last page" control, e.g. `Trang cuối`.
    pub last_page: &'static str,
    /// Visible text of a bare "next" control, e.g. `»`.
    pub next: &'static str,
}

/// What was read off a pagination control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationControls {
    /// Trimmed text of the last link in the control.
    pub last_label: String,
    /// The last link's action attribute (`onclick`), if any.
    pub last_action: Option<String>,
    /// Number of anchors in the control.
    pub anchor_count: usize,
    /// Page numbers shown as link labels.
    pub numbered_pages: BTreeSet<u32>,
}

/// Page-count evidence extracted from one TOC page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCountSignal {
    /// A pagination control was found.
    Pagination {
        controls: PaginationControls,
        labels: PaginationLabels,
    },

    /// A "total items" figure was found.
    ItemCount { text: String, page_size: u32 },

    /// Nothing usable.
    Absent,
}

/// Returns the number of TOC pages to fetch, always at least 1 and never
/// fewer than the distinct numbered links visible.
pub fn resolve_page_count(signal: &PageCountSignal) -> u32 {
    let resolved = match signal {
        PageCountSignal::Pagination { controls, labels } => {
            let numbered = controls.numbered_pages.len() as u32;
            from_pagination(controls, labels).unwrap_or(0).max(numbered)
        }
        PageCountSignal::ItemCount { text, page_size } => from_item_count(text, *page_size),
        PageCountSignal::Absent => 1,
    };

    if resolved == 0 {
        warn!(?signal, "could not determine TOC page count, assuming one page");
        return 1;
    }
    resolved
}

fn from_pagination(controls: &PaginationControls, labels: &PaginationLabels) -> Option<u32> {
    if controls.last_label == labels.last_page {
        // The action carries the 0-based index of the last page.
        let action = controls.last_action.as_deref()?;
        let last_index = first_number(action)?;
        last_index.checked_add(1)
    } else if controls.last_label == labels.next {
        u32::try_from(controls.anchor_count).ok()
    } else {
        None
    }
}

fn from_item_count(text: &str, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    first_number(text).map_or(0, |total| total.div_ceil(page_size))
}

fn first_number(text: &str) -> Option<u32> {
    NUMBER_REGEX.find(text)?.as_str().parse().ok()
}
