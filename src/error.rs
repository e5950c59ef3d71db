//! Error types for mucluc.
//!
//! Uses `thiserror` for structured error definitions that carry enough
//! context (URL, page index) for the caller to show a precise message.

use thiserror::Error;

/// Failure reported by a [`Fetcher`](crate::fetch::Fetcher).
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP status {status}")]
    Status { status: u16 },
}

/// Main error type for chapter-list assembly and chapter extraction.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// A TOC or chapter page could not be fetched
    #[error("Failed to fetch page {page} ({url}): {source}")]
    Fetch {
        url: String,
        /// 1-based page index within the run; 0 for the story page.
        page: usize,
        #[source]
        source: FetchError,
    },

    /// A required element is absent from the page
    #[error("Element not found: {0}")]
    MissingElement(String),

    /// The progress sink asked to stop
    #[error("Cancelled after {done} of {total} TOC pages")]
    Cancelled { done: usize, total: usize },

    /// The assembler instance has already been used
    #[error("Assembler has already run")]
    AlreadyRun,

    /// A TOC URL template without a page placeholder
    #[error("Invalid TOC URL template: {0}")]
    InvalidTemplate(String),

    /// No site adapter handles this URL
    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}
