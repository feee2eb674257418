use serde::Serialize;

/// One window over an ordered result list. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T: Clone> Page<T> {
    /// Slice `items` into the requested page, clamping the page number into `1..=total_pages`.
    /// An empty list still reports one (empty) page.
    pub fn slice(items: &[T], page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);

        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total_items);
        let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

        Self {
            items,
            page,
            total_pages,
            total_items,
        }
    }
}

impl<T> Page<T> {
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_reports_single_page() {
        let page = Page::<u8>::slice(&[], 3, 9);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn last_page_holds_remainder() {
        let items: Vec<u32> = (1..=20).collect();
        let page = Page::slice(&items, 3, 9);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![19, 20]);
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let items: Vec<u32> = (1..=10).collect();
        assert_eq!(Page::slice(&items, 0, 9).page, 1);
        let page = Page::slice(&items, 99, 9);
        assert_eq!(page.page, 2);
        assert_eq!(page.items, vec![10]);
    }
}
