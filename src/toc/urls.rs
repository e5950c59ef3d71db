//! TOC page URL enumeration.

use crate::error::AssemblyError;

/// Placeholder replaced by the page index.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Whether a site numbers its TOC pages from 0 or from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageIndexBase {
    Zero,
    One,
}

/// A TOC URL with a `{page}` slot, e.g.
/// `https://example.com/toc?page={page}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocUrlTemplate {
    prefix: String,
    suffix: String,
    base: PageIndexBase,
}

impl TocUrlTemplate {
    /// Parses a template; it must contain exactly one `{page}`.
    pub fn parse(template: &str, base: PageIndexBase) -> Result<Self, AssemblyError> {
        let (prefix, suffix) = template
            .split_once(PAGE_PLACEHOLDER)
            .ok_or_else(|| AssemblyError::InvalidTemplate(template.to_string()))?;

        if suffix.contains(PAGE_PLACEHOLDER) {
            return Err(AssemblyError::InvalidTemplate(template.to_string()));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            base,
        })
    }

    /// URL of the page at `position` (0 = first page).
    pub fn url_for(&self, position: u32) -> String {
        let index = match self.base {
            PageIndexBase::Zero => position,
            PageIndexBase::One => position + 1,
        };
        format!("{}{}{}", self.prefix, index, self.suffix)
    }

    /// Exactly `page_count` URLs in page order.
    pub fn enumerate(&self, page_count: u32) -> Vec<String> {
        (0..page_count).map(|position| self.url_for(position)).collect()
    }
}
