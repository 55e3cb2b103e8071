//! Shared pagination types for list-returning ports.

/// 1-based page request with a bounded page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

/// Largest accepted page size; larger requests are clamped.
pub const MAX_PER_PAGE: u32 = 100;

impl PageRequest {
    /// Build a request, clamping `page` to at least 1 and `per_page` into
    /// `1..=MAX_PER_PAGE`.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// The 1-based page number.
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// SQL offset for this page.
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// SQL limit for this page.
    pub const fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 50)
    }
}

/// One page of results plus the totals needed to render pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: i64,
    /// The request that produced this page.
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Number of pages implied by `total` and the page size.
    pub const fn pages(&self) -> i64 {
        let per_page = self.request.per_page() as i64;
        (self.total + per_page - 1).div_euclid(per_page)
    }

    /// Map the items while keeping the pagination envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 1, 1)]
    #[case(3, 25, 3, 25)]
    #[case(2, 1_000, 2, MAX_PER_PAGE)]
    fn request_is_clamped(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] expected_page: u32,
        #[case] expected_per_page: u32,
    ) {
        let request = PageRequest::new(page, per_page);
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.per_page(), expected_per_page);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let request = PageRequest::new(3, 20);
        assert_eq!(request.offset(), 40);
        assert_eq!(request.limit(), 20);
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    fn page_count_rounds_up(#[case] total: i64, #[case] per_page: u32, #[case] pages: i64) {
        let page: Page<()> = Page {
            items: Vec::new(),
            total,
            request: PageRequest::new(1, per_page),
        };
        assert_eq!(page.pages(), pages);
    }
}
