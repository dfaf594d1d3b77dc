//! Page size and page number handling

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Pagination configuration
///
/// Out-of-range input is clamped instead of rejected: a page size below 1
/// falls back to [`DEFAULT_PAGE_SIZE`], one above [`MAX_PAGE_SIZE`] is capped,
/// and pages start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: u32,
    page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}

impl Pagination {
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = if page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else if page_size > MAX_PAGE_SIZE as i64 {
            MAX_PAGE_SIZE
        } else {
            page_size as u32
        };
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page.clamp(1, u32::MAX as i64) as u32;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Rows skipped before the current page, `None` on the first page
    pub fn offset(&self) -> Option<u64> {
        (self.page > 1).then(|| self.page_size as u64 * (self.page as u64 - 1))
    }

    pub fn to_sql(&self) -> String {
        match self.offset() {
            Some(offset) => format!("LIMIT {} OFFSET {}", self.page_size, offset),
            None => format!("LIMIT {}", self.page_size),
        }
    }
}
