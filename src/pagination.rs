//! Offset-based pagination shared by repository queries and responses.

use serde::{Deserialize, Serialize};

/// Page size applied when the client asks for a page without a limit.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Parameters selecting a single page of results. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }
}

/// Pagination block echoed back in list responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paginated {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl Paginated {
    /// Derive the response block from the requested page and the total
    /// matching row count. `pages` rounds up and is at least 1.
    pub fn new(pagination: Pagination, total: usize) -> Self {
        let limit = pagination.per_page.max(1);
        Self {
            page: pagination.page.max(1),
            limit,
            total,
            pages: total.div_ceil(limit).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_page_count_up() {
        let paginated = Paginated::new(Pagination::new(1, 10), 25);
        assert_eq!(paginated.pages, 3);
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let paginated = Paginated::new(Pagination::new(1, 10), 0);
        assert_eq!(paginated.pages, 1);
        assert_eq!(paginated.total, 0);
    }
}
