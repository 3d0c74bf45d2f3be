//! Splitting report items into fixed-capacity pages.
//!
//! The running counters shown in each page footer are carried in a
//! [`PaginationState`] computed for that page alone, so any page can be
//! rendered without knowing how earlier pages were drawn.

/// Content blocks per page before a break is forced.
pub const PAGE_CAPACITY: usize = 7;

/// Counters for one page of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// 1-based page number.
    pub page_number: usize,
    /// Items rendered on this page and all earlier ones.
    pub cumulative_rendered: usize,
    /// Items in the whole document.
    pub total_items: usize,
}

impl PaginationState {
    /// State for `page_number` (1-based) of a document with `total_items`
    /// items laid out `capacity` per page.
    #[must_use]
    pub fn for_page(page_number: usize, total_items: usize, capacity: usize) -> Self {
        Self {
            page_number,
            cumulative_rendered: page_number.saturating_mul(capacity).min(total_items),
            total_items,
        }
    }

    /// Whether this is the final page.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.cumulative_rendered >= self.total_items
    }

    /// Footer counter, e.g. `"7 de 15 sensores | Página 1"`.
    #[must_use]
    pub fn footer_text(&self) -> String {
        format!(
            "{} de {} sensores | Página {}",
            self.cumulative_rendered, self.total_items, self.page_number
        )
    }
}

/// A page's share of the items together with its counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a, T> {
    /// Items placed on this page, at most the capacity.
    pub items: &'a [T],
    /// Counters for this page.
    pub state: PaginationState,
}

/// Splits `items` into pages of at most `capacity` items. An empty slice
/// yields no pages.
#[must_use]
pub fn paginate<T>(items: &[T], capacity: usize) -> Vec<Page<'_, T>> {
    let capacity = capacity.max(1);
    items
        .chunks(capacity)
        .enumerate()
        .map(|(i, chunk)| Page {
            items: chunk,
            state: PaginationState::for_page(i + 1, items.len(), capacity),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_items_make_three_pages() {
        let items: Vec<u32> = (0..15).collect();
        let pages = paginate(&items, PAGE_CAPACITY);
        let sizes: Vec<usize> = pages.iter().map(|p| p.items.len()).collect();
        assert_eq!(sizes, [7, 7, 1]);

        let footers: Vec<String> = pages.iter().map(|p| p.state.footer_text()).collect();
        assert_eq!(
            footers,
            [
                "7 de 15 sensores | Página 1",
                "14 de 15 sensores | Página 2",
                "15 de 15 sensores | Página 3",
            ]
        );
        assert!(pages[2].state.is_last());
        assert!(!pages[1].state.is_last());
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_page() {
        let items: Vec<u32> = (0..14).collect();
        let pages = paginate(&items, PAGE_CAPACITY);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].state.cumulative_rendered, 14);
    }

    #[test]
    fn single_item_single_page() {
        let pages = paginate(&["only"], PAGE_CAPACITY);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].state.footer_text(), "1 de 1 sensores | Página 1");
    }

    #[test]
    fn empty_input_has_no_pages() {
        assert!(paginate::<u8>(&[], PAGE_CAPACITY).is_empty());
    }

    #[test]
    fn items_keep_their_order() {
        let items: Vec<u32> = (0..9).collect();
        let pages = paginate(&items, PAGE_CAPACITY);
        assert_eq!(pages[1].items, &[7, 8]);
    }
}
