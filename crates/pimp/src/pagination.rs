//! Page arithmetic for listing pages.

use serde::Serialize;

/// How many page links to show on either side of the current page.
const WINDOW: usize = 2;

/// Position within a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page, 1-based and within `1..=total_pages`.
    pub page: usize,
    /// Items per page.
    pub per_page: usize,
    /// Total number of items.
    pub total: usize,
}

impl Pagination {
    /// Build a pagination, clamping `page` into range.
    #[must_use]
    pub fn new(page: usize, per_page: usize, total: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page).max(1);
        Self {
            page: page.clamp(1, total_pages),
            per_page,
            total,
        }
    }

    /// Number of pages; at least 1 even for empty listings.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// Row offset of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }

    /// Previous page number, if any.
    #[must_use]
    pub fn prev(&self) -> Option<usize> {
        (self.page > 1).then(|| self.page - 1)
    }

    /// Next page number, if any.
    #[must_use]
    pub fn next(&self) -> Option<usize> {
        (self.page < self.total_pages()).then(|| self.page + 1)
    }

    /// Page numbers to link, centered on the current page.
    #[must_use]
    pub fn window(&self) -> Vec<usize> {
        let last = self.total_pages();
        let start = self.page.saturating_sub(WINDOW).max(1);
        let end = (self.page + WINDOW).min(last);
        (start..=end).collect()
    }

    /// 1-based index of the first item shown, 0 when empty.
    #[must_use]
    pub fn first_item(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based index of the last item shown.
    #[must_use]
    pub fn last_item(&self) -> usize {
        (self.offset() + self.per_page).min(self.total)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Where this page sits.
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Transform the items, keeping the position.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
