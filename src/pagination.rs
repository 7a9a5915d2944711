//! Page-number pagination
//!
//! `page` starts at 1; `page_size` falls back to the configured default and
//! is silently capped at the configured maximum.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 6,
            max_page_size: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Parse raw `page` / `page_size` query values
    pub fn parse(
        page: Option<&str>,
        page_size: Option<&str>,
        config: &PaginationConfig,
    ) -> DomainResult<Self> {
        let page = match page {
            None | Some("") => 1,
            Some(raw) => match raw.parse::<u32>() {
                Ok(p) if p >= 1 => p,
                _ => return Err(DomainError::validation("page", "must be a positive integer")),
            },
        };
        let page_size = match page_size {
            None | Some("") => config.default_page_size,
            Some(raw) => match raw.parse::<u32>() {
                Ok(s) if s >= 1 => s.min(config.max_page_size),
                _ => {
                    return Err(DomainError::validation(
                        "page_size",
                        "must be a positive integer",
                    ));
                }
            },
        };
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Page<T> {
    /// Total matches across all pages
    pub count: u64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page; a page past the end is `NotFound` except page 1.
    pub fn new(results: Vec<T>, count: u64, req: PageRequest) -> DomainResult<Self> {
        let last_page = count.div_ceil(u64::from(req.page_size)).max(1);
        if u64::from(req.page) > last_page {
            return Err(DomainError::not_found("Invalid page"));
        }
        let next = (u64::from(req.page) < last_page).then_some(req.page + 1);
        let previous = (req.page > 1).then(|| req.page - 1);
        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
