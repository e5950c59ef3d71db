//! Top-level chapter-list assembly for one story.

use super::aggregate::{ProgressSink, aggregate_following_next, aggregate_pages, fetch_document};
use super::{ChapterEntry, DividerTracker, RawChapterEntry, TocPlan, TocUrlTemplate};
use super::{normalize_title, resolve_page_count};
use crate::error::AssemblyError;
use crate::fetch::Fetcher;
use crate::sites::{SiteAdapter, StoryInfo};
use scraper::Html;
use tracing::{debug, info, warn};

/// Default bound on TOC pages fetched in one run.
const DEFAULT_MAX_TOC_PAGES: usize = 200;

/// Where an assembler is in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    Idle,
    ResolvingPageCount,
    EnumeratingUrls,
    Aggregating,
    Deduplicating,
    Normalizing,
    Done,
    Failed,
}

/// TOC layout resolved from the story page.
enum ResolvedToc {
    /// Entries already extracted from the story page.
    Inline(Vec<RawChapterEntry>),
    Paginated { template: TocUrlTemplate, pages: u32 },
    FollowNext { start_url: String },
}

/// Runs story page → TOC pages → divider pass → title pass, once.
///
/// ```text
/// Idle → ResolvingPageCount → EnumeratingUrls → Aggregating
///      → Deduplicating → Normalizing → Done
/// ```
/// Any failure ends in `Failed`. An instance is single-use.
pub struct ChapterListAssembler<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    site: &'a dyn SiteAdapter,
    max_toc_pages: usize,
    state: AssemblyState,
    dividers: DividerTracker,
    story: Option<StoryInfo>,
    truncated: bool,
}

impl<'a, F: Fetcher + ?Sized> ChapterListAssembler<'a, F> {
    pub fn new(fetcher: &'a F, site: &'a dyn SiteAdapter) -> Self {
        Self {
            fetcher,
            site,
            max_toc_pages: DEFAULT_MAX_TOC_PAGES,
            state: AssemblyState::Idle,
            dividers: DividerTracker::new(),
            story: None,
            truncated: false,
        }
    }

    /// Caps the TOC pages fetched: the resolved count for paginated TOCs,
    /// the walk length for follow-next TOCs. At least 1.
    pub fn with_max_toc_pages(mut self, max_toc_pages: usize) -> Self {
        self.max_toc_pages = max_toc_pages.max(1);
        self
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    /// Metadata read from the story page, once it has been fetched.
    pub fn story_info(&self) -> Option<&StoryInfo> {
        self.story.as_ref()
    }

    /// True when the TOC was cut at the page limit, so chapters past it are
    /// missing from the result.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Assembles the chapter list for the story at `story_url`.
    ///
    /// On failure no chapters are returned, not even those from pages that
    /// were fetched before the failing one.
    pub async fn run(
        &mut self,
        story_url: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<ChapterEntry>, AssemblyError> {
        if self.state != AssemblyState::Idle {
            return Err(AssemblyError::AlreadyRun);
        }

        match self.execute(story_url, progress).await {
            Ok(chapters) => {
                self.transition(AssemblyState::Done);
                info!(site = self.site.name(), chapters = chapters.len(), "chapter list assembled");
                Ok(chapters)
            }
            Err(e) => {
                self.transition(AssemblyState::Failed);
                Err(e)
            }
        }
    }

    async fn execute(
        &mut self,
        story_url: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<ChapterEntry>, AssemblyError> {
        let fetcher = self.fetcher;
        let site = self.site;
        let extract = move |doc: &Html, url: &str| site.extract_raw_entries(doc, url);

        self.transition(AssemblyState::ResolvingPageCount);
        let resolved = {
            let story = fetch_document(fetcher, story_url, 0).await?;
            self.story = Some(site.extract_story_info(&story, story_url));
            match site.toc_plan(&story, story_url)? {
                TocPlan::Inline => ResolvedToc::Inline(extract(&story, story_url)),
                TocPlan::Paginated { template, signal } => ResolvedToc::Paginated {
                    template,
                    pages: resolve_page_count(&signal),
                },
                TocPlan::FollowNext { start_url } => ResolvedToc::FollowNext { start_url },
            }
        };

        self.transition(AssemblyState::EnumeratingUrls);
        let raw = match resolved {
            ResolvedToc::Inline(entries) => {
                self.transition(AssemblyState::Aggregating);
                progress.on_page_complete(1, 1);
                entries
            }
            ResolvedToc::Paginated { template, pages } => {
                let limit = u32::try_from(self.max_toc_pages).unwrap_or(u32::MAX);
                let pages = if pages > limit {
                    warn!(resolved = pages, limit, "TOC page count exceeds limit, truncating");
                    self.truncated = true;
                    limit
                } else {
                    pages
                };
                let urls = template.enumerate(pages);
                debug!(pages, "TOC pages enumerated");
                self.transition(AssemblyState::Aggregating);
                aggregate_pages(fetcher, &urls, extract, progress).await?
            }
            ResolvedToc::FollowNext { start_url } => {
                self.transition(AssemblyState::Aggregating);
                let followed = aggregate_following_next(
                    fetcher,
                    &start_url,
                    self.max_toc_pages,
                    extract,
                    move |doc: &Html, url: &str| site.next_toc_page(doc, url),
                    progress,
                )
                .await?;
                self.truncated = followed.truncated;
                followed.entries
            }
        };

        self.transition(AssemblyState::Deduplicating);
        let merged = self.dividers.apply(raw);
        debug!(entries = merged.len(), sections = self.dividers.len(), "dividers merged");

        self.transition(AssemblyState::Normalizing);
        Ok(merged
            .into_iter()
            .map(|entry| {
                let mut chapter = ChapterEntry::from(entry);
                chapter.title = normalize_title(&chapter.title);
                chapter
            })
            .collect())
    }

    fn transition(&mut self, next: AssemblyState) {
        debug!(from = ?self.state, to = ?next, "assembly state");
        self.state = next;
    }
}
