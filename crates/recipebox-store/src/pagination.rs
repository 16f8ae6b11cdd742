//! Page requests and pagination metadata.

use serde::Serialize;

use crate::error::{Result, StoreError};

/// Largest accepted page size.
pub const MAX_PER_PAGE: u32 = 100;
/// Page size used when the caller gives none.
pub const DEFAULT_PER_PAGE: u32 = 10;
/// Largest accepted page number, bounding the OFFSET a request can cause.
pub const MAX_PAGE: u32 = 10_000;

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Validates `page` (1 to 10 000) and `per_page` (1 to 100).
    pub fn new(page: u32, per_page: u32) -> Result<Self> {
        if !(1..=MAX_PAGE).contains(&page) {
            return Err(StoreError::InvalidPage(format!(
                "page must be between 1 and {MAX_PAGE}"
            )));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(StoreError::InvalidPage(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        Ok(Self { page, per_page })
    }

    /// Parses raw query-string values, applying defaults for missing ones.
    pub fn parse(page: Option<&str>, per_page: Option<&str>) -> Result<Self> {
        let page = parse_number(page, 1, "page")?;
        let per_page = parse_number(per_page, DEFAULT_PER_PAGE, "per_page")?;
        Self::new(page, per_page)
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Returns the LIMIT for this page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.per_page
    }

    /// Returns the OFFSET for this page.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        (self.page - 1) * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

fn parse_number(raw: Option<&str>, default: u32, what: &str) -> Result<u32> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| StoreError::InvalidPage(format!("{what} must be a number, got '{raw}'"))),
    }
}

/// Pagination metadata for a listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Total matching rows across all pages.
    pub total: i64,
    /// Number of pages needed for `total` rows.
    pub total_pages: i64,
}

impl Pagination {
    /// Computes metadata for `request` given the total row count.
    #[must_use]
    pub fn new(request: &PageRequest, total: i64) -> Self {
        let per_page = i64::from(request.per_page);
        let total = total.max(0);
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Pagination metadata.
    pub pagination: Pagination,
}
