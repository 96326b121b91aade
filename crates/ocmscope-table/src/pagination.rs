/// Page sizes offered by the pager
pub const PAGE_SIZES: [usize; 5] = [10, 20, 50, 75, 100];

/// Page size used when nothing valid was persisted
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One-based page cursor over a row list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// Index of the first item on the current page; page 0 reads as page 1
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Items on the current page
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = start.saturating_add(self.per_page).min(items.len());
        &items[start..end]
    }

    /// Number of pages for `total` items (at least one)
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.per_page.max(1)).max(1)
    }

    /// Jump to a page, clamped to the valid range
    pub fn set_page(&mut self, page: usize, total: usize) {
        self.page = page.clamp(1, self.page_count(total));
    }

    pub fn next_page(&mut self, total: usize) {
        self.set_page(self.page + 1, total);
    }

    pub fn prev_page(&mut self, total: usize) {
        self.set_page(self.page.saturating_sub(1), total);
    }

    /// Change the page size; always returns to the first page
    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    /// The offered page size following the current one, wrapping around
    pub fn next_page_size(&self) -> usize {
        PAGE_SIZES
            .iter()
            .copied()
            .find(|size| *size > self.per_page)
            .unwrap_or(PAGE_SIZES[0])
    }

    /// Pager label such as "11 - 20 of 42"
    pub fn range_label(&self, total: usize) -> String {
        if total == 0 {
            return "0 - 0 of 0".to_string();
        }
        let start = self.offset().min(total);
        let end = start.saturating_add(self.per_page).min(total);
        format!("{} - {} of {}", start + 1, end, total)
    }
}
