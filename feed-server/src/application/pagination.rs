//! Page-number pagination over already-ordered sequences.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub number: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub num_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Offset/limit of one page inside a sequence of `total` items.
///
/// Pages are 1-based; page 0 is read as page 1. A page past the end has a
/// zero limit rather than being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
    pub meta: PageMeta,
}

impl PageWindow {
    pub fn new(total: u64, page_size: u32, page_number: u32) -> Self {
        let page_size = page_size.max(1);
        let number = page_number.max(1);
        let size = u64::from(page_size);
        let offset = u64::from(number - 1) * size;
        let limit = total.saturating_sub(offset).min(size);

        Self {
            offset,
            limit,
            meta: PageMeta {
                number,
                page_size,
                total_count: total,
                num_pages: total.div_ceil(size),
                has_next: offset + size < total,
                has_previous: number > 1 && total > 0,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, meta: PageMeta) -> Self {
        Self { items, meta }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.meta.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.meta.has_previous
    }
}

/// Cuts one page out of `sequence` without reordering it.
pub fn paginate<T>(sequence: Vec<T>, page_size: u32, page_number: u32) -> Page<T> {
    let window = PageWindow::new(sequence.len() as u64, page_size, page_number);
    let items = sequence
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();
    Page::new(items, window.meta)
}

/// Reads a `?page=` value: anything that is not a positive integer means page 1.
pub fn parse_page_number(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}
