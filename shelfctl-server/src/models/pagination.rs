//! Pagination for library item listings

/// Maximum items per page
const MAX_PER_PAGE: u32 = 100;

/// Default items per page
const DEFAULT_PER_PAGE: u32 = 20;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (max 100)
    pub per_page: u32,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to minimum of 1
    /// - Per page is clamped to 1..=100
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Build from optional GraphQL arguments, where negative values mean "unset".
    pub fn from_args(page: Option<i32>, per_page: Option<i32>) -> Self {
        let to_u32 = |v: Option<i32>| v.and_then(|v| u32::try_from(v).ok());
        Self::new(
            to_u32(page).unwrap_or(1),
            to_u32(per_page).unwrap_or(DEFAULT_PER_PAGE),
        )
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.per_page
    }

    /// Slice an in-memory, already-sorted collection.
    pub fn slice<T>(&self, items: Vec<T>) -> Paginated<T> {
        let total = items.len() as i64;
        let items = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect();
        Paginated {
            items,
            total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus the total count across all pages
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Paginated<T> {
    /// An empty page for the given pagination.
    pub fn empty(page: Pagination) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: page.page,
            per_page: page.per_page,
        }
    }

    /// Calculate total number of pages.
    pub fn total_pages(&self) -> u32 {
        let total = u64::try_from(self.total).unwrap_or(0);
        let per_page = u64::from(self.per_page.max(1));
        (total.div_ceil(per_page) as u32).max(1)
    }

    /// Check if there's a next page.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there's a previous page.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Convert the items, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_calculation() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(2, 10).offset(), 10);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
    }

    #[test]
    fn clamps_arguments() {
        assert_eq!(Pagination::new(0, 10).page, 1);
        assert_eq!(Pagination::new(1, 0).per_page, 1);
        assert_eq!(Pagination::new(1, 999).per_page, 100);
    }

    #[test]
    fn from_graphql_args() {
        assert_eq!(Pagination::from_args(None, None), Pagination::default());
        assert_eq!(Pagination::from_args(Some(-3), Some(-1)), Pagination::default());
        assert_eq!(Pagination::from_args(Some(2), Some(5)), Pagination::new(2, 5));
    }

    #[test]
    fn slices_in_memory() {
        let page = Pagination::new(2, 2).slice(vec![1, 2, 3, 4, 5]);
        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_prev());

        let past_end = Pagination::new(4, 2).slice(vec![1, 2, 3]);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 3);
    }

    #[test]
    fn total_pages_of_empty() {
        let empty: Paginated<()> = Paginated::empty(Pagination::default());
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());
        assert!(!empty.has_prev());
    }
}
