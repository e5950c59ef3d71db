//! Mucluc - chapter list builder for Vietnamese web novel sites.
//!
//! This library provides functionality for:
//! - Assembling an ordered, de-duplicated chapter list from paginated TOCs
//! - Per-site adapters (Tangthuvien, Truyenyy, Docln, Metruyenchu, Bachngocsach)
//! - Reading story metadata (title, author, genres) from the story page
//! - Downloading a single chapter's text with its repeated heading removed

pub mod chapter;
pub mod config;
pub mod console;
pub mod error;
pub mod fetch;
pub mod sites;
pub mod toc;

// Re-export commonly used types
pub use chapter::{ChapterContent, download_chapter};
pub use config::Config;
pub use console::Console;
pub use error::{AssemblyError, ConfigError, FetchError};
pub use fetch::{Fetcher, HttpFetcher};
pub use sites::{SiteAdapter, SiteRegistry, StoryInfo};
pub use toc::{AssemblyState, ChapterEntry, ChapterListAssembler, ProgressSink};
