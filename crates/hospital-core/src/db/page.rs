//! Fixed-size pagination for list views.

use serde::{Deserialize, Serialize};

use super::{DbError, DbResult};

/// Records per list page.
pub const PAGE_SIZE: u32 = 10;

/// One page of an ordered listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub num_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            num_pages: self.num_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Bounds of a requested page within `total_count` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub page: u32,
    pub num_pages: u32,
    pub total_count: u64,
}

impl PageWindow {
    /// Page 1 is always valid, even for an empty listing.
    pub fn new(page: u32, total_count: u64) -> DbResult<Self> {
        let num_pages = total_count.div_ceil(PAGE_SIZE as u64).max(1);
        let num_pages = u32::try_from(num_pages).map_err(|_| DbError::InvalidPage(page))?;

        if page == 0 || page > num_pages {
            return Err(DbError::InvalidPage(page));
        }

        Ok(Self {
            page,
            num_pages,
            total_count,
        })
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * PAGE_SIZE as i64
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            page: self.page,
            page_size: PAGE_SIZE,
            total_count: self.total_count,
            num_pages: self.num_pages,
            has_next: self.page < self.num_pages,
            has_previous: self.page > 1,
        }
    }
}
