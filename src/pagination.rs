//! Page-based slicing for listing operations.

use serde::Serialize;
use thiserror::Error;

/// Error returned for out-of-range paging parameters.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// Limit is outside `1..=MAX_LIMIT`.
    #[error("limit must be between 1 and {max}")]
    LimitOutOfRange {
        /// Largest accepted limit.
        max: u32,
    },
}

/// A validated page number and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Largest accepted page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Creates a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` is zero or `limit` is outside
    /// `1..=MAX_LIMIT`.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(PageRequestError::LimitOutOfRange {
                max: Self::MAX_LIMIT,
            });
        }
        Ok(Self { page, limit })
    }

    /// Returns the one-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Returns how many items precede this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page).saturating_sub(1) * u64::from(self.limit)
    }

    /// Slices an already ordered collection down to this page.
    #[must_use]
    pub fn slice<T>(self, items: Vec<T>) -> Page<T> {
        let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let page_items = items.into_iter().skip(skip).take(take).collect();
        Page::new(page_items, self, total)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// One page of results plus navigation totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Items across all pages.
    pub total: u64,
    /// Number of pages.
    pub pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Assembles a page from its items and the overall total.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let pages = total.div_ceil(u64::from(request.limit));
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
            pages,
            has_next: u64::from(request.page) < pages,
            has_prev: request.page > 1,
        }
    }
}
