//! Section-marker de-duplication across merged TOC pages.
//!
//! Sites that paginate their TOC re-emit the current volume heading at the top
//! of every page, so a volume spanning three pages shows up three times. Only
//! the first occurrence of a label is kept in the titles.

use super::RawChapterEntry;
use std::collections::HashSet;

/// Tracks which divider labels have already been emitted in one run.
#[derive(Debug, Default)]
pub struct DividerTracker {
    seen: HashSet<String>,
}

impl DividerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds divider markers into titles, in order.
    ///
    /// The first entry under an unseen label becomes `"[<label>] - <title>"`;
    /// repeats keep their plain title. Markers are consumed either way.
    pub fn apply(&mut self, entries: Vec<RawChapterEntry>) -> Vec<RawChapterEntry> {
        entries
            .into_iter()
            .map(|mut entry| {
                if let Some(marker) = entry.divider.take()
                    && self.seen.insert(marker.label.clone())
                {
                    entry.title = format!("[{}] - {}", marker.label, entry.title);
                }
                entry
            })
            .collect()
    }

    /// Number of distinct labels seen so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(entries: &[RawChapterEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_repeated_divider_prefixes_first_only() {
        let entries = vec![
            RawChapterEntry::new("/c1", "Chương 1").with_divider("Volume 1"),
            RawChapterEntry::new("/c2", "Chương 2"),
            RawChapterEntry::new("/c3", "Chương 3").with_divider("Volume 1"),
        ];

        let out = DividerTracker::new().apply(entries);
        assert_eq!(
            titles(&out),
            vec!["[Volume 1] - Chương 1", "Chương 2", "Chương 3"]
        );
        assert!(out.iter().all(|e| e.divider.is_none()));
    }

    #[test]
    fn test_distinct_dividers_each_prefixed() {
        let entries = vec![
            RawChapterEntry::new("/c1", "c1").with_divider("Quyển 1"),
            RawChapterEntry::new("/c2", "c2").with_divider("Quyển 2"),
            RawChapterEntry::new("/c3", "c3").with_divider("Quyển 1"),
        ];

        let mut tracker = DividerTracker::new();
        let out = tracker.apply(entries);
        assert_eq!(titles(&out), vec!["[Quyển 1] - c1", "[Quyển 2] - c2", "c3"]);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_order_and_urls_unchanged() {
        let entries = vec![
            RawChapterEntry::new("/b", "b"),
            RawChapterEntry::new("/a", "a").with_divider("V"),
            RawChapterEntry::new("/a", "a again"),
        ];

        let out = DividerTracker::new().apply(entries);
        let urls: Vec<&str> = out.iter().map(|e| e.source_url.as_str()).collect();
        assert_eq!(urls, vec!["/b", "/a", "/a"]);
    }

    #[test]
    fn test_state_carries_across_calls() {
        let mut tracker = DividerTracker::new();
        tracker.apply(vec![RawChapterEntry::new("/c1", "c1").with_divider("V1")]);

        let out = tracker.apply(vec![RawChapterEntry::new("/c9", "c9").with_divider("V1")]);
        assert_eq!(out[0].title, "c9");
    }
}
