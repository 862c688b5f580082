/// One page of a listing plus the navigation around it.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_page: usize,
    pub next_page: usize,
}

pub struct Paginator<'a, T> {
    item_list: &'a [T],
    page_size: usize,
    page_count: usize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn from(item_list: &'a [T], page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let page_count = item_list.len().div_ceil(page_size);

        Paginator {
            item_list,
            page_size,
            page_count,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Requested pages outside `1..=page_count` are clamped into it. An empty
    /// list yields an empty page 1.
    pub fn get_page(&self, page: i64) -> Page<'a, T> {
        let last_page = self.page_count.max(1) as i64;
        let current_page = page.clamp(1, last_page) as usize;

        let start = ((current_page - 1) * self.page_size).min(self.item_list.len());
        let end = (current_page * self.page_size).min(self.item_list.len());

        Page {
            items: &self.item_list[start..end],
            current_page,
            total_pages: self.page_count,
            has_prev: current_page > 1,
            has_next: current_page < self.page_count,
            prev_page: current_page.saturating_sub(1),
            next_page: current_page + 1,
        }
    }
}
