//! Pagination request and response envelope

use serde::Serialize;

use crate::config::PaginationConfig;

/// Resolved page window for a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Clamp caller-supplied values into the configured bounds.
    pub fn new(page: Option<u32>, limit: Option<u32>, config: &PaginationConfig) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(config.default_limit)
            .min(config.max_limit);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

/// `{ "data": [...], "pagination": {...} }`
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> PagedResponse<T> {
    pub fn new(page: Page<T>, request: PageRequest) -> Self {
        let limit = request.limit.max(1) as i64;
        Self {
            data: page.items,
            pagination: PageMeta {
                page: request.page,
                limit: request.limit,
                total: page.total,
                total_pages: (page.total + limit - 1) / limit,
            },
        }
    }
}
