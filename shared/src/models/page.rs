//! Paging, sorting and the paged list envelope

use serde::{Deserialize, Serialize};

use crate::validation::{self, Normalize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Paging and sorting parameters shared by every list endpoint
///
/// Filters are separate per-resource structs extracted from the same query
/// string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

impl Normalize for PageQuery {
    fn normalize(&mut self) {
        validation::trim_opt(&mut self.sort_by);
        validation::trim_opt(&mut self.sort_direction);
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total,
            page,
            page_size,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.page_size == 0 {
            return 0;
        }
        let size = i64::from(self.page_size);
        (self.total + size - 1) / size
    }
}

/// `{ "count": n }` body of the count endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}
