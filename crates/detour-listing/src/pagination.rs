use detour_core::Redirect;
use serde::{Deserialize, Serialize};

pub const ITEMS_PER_PAGE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageMove {
    Previous,
    Next,
    First,
    Last,
}

/// Index of the last page for `total` items; an empty list has one page.
pub fn max_page(total: usize) -> usize {
    total.saturating_sub(1) / ITEMS_PER_PAGE
}

/// The page `page_move` leads to from `current`, kept in range.
pub fn move_page(current: usize, page_move: PageMove, total: usize) -> usize {
    let last = max_page(total);
    match page_move {
        PageMove::Previous => current.saturating_sub(1),
        PageMove::Next => (current + 1).min(last),
        PageMove::First => 0,
        PageMove::Last => last,
    }
    .min(last)
}

/// The visible slice of the filtered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub redirects: Vec<Redirect>,
    /// 1-based position of the first visible redirect; 0 for an empty list.
    pub first: usize,
    pub last: usize,
    pub total: usize,
    pub current_page: usize,
    pub has_more_pages: bool,
}

impl PageView {
    pub fn of(filtered: &[Redirect], current_page: usize) -> Self {
        let total = filtered.len();
        let start = (current_page * ITEMS_PER_PAGE).min(total);
        let end = ((current_page + 1) * ITEMS_PER_PAGE).min(total);

        Self {
            redirects: filtered[start..end].to_vec(),
            first: if total == 0 { 0 } else { start + 1 },
            last: end,
            total,
            current_page,
            has_more_pages: max_page(total) > current_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
