//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of products to display per page.
    pub page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            page_size: 3,
        }
    }
}

impl PaginationConfig {
    /// The number of pages needed to show `item_count` items.
    ///
    /// An empty result set still has one (empty) page.
    pub fn page_count(&self, item_count: u64) -> u64 {
        if self.page_size == 0 {
            return 1;
        }

        item_count.div_ceil(self.page_size).max(1)
    }

    /// The number of rows to skip to get to `page`, where pages start at one.
    ///
    /// Saturates at [u64::MAX] instead of overflowing.
    pub fn offset(&self, page: u64) -> u64 {
        page.saturating_sub(1).saturating_mul(self.page_size)
    }
}
