//! Page-based pagination shared by list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Largest skip MongoDB accepts (skip is a signed 64-bit integer on the wire)
pub const MAX_SKIP: u64 = i64::MAX as u64;

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

/// Sort direction parsed from a `field` / `-field` sort expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// MongoDB sort value (`1` / `-1`)
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// Pagination options read from the query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageOptions {
    /// 1-based page number
    #[serde(default = "default_page")]
    #[param(default = 1, minimum = 1)]
    pub page: u64,

    /// Items per page
    #[serde(default = "default_limit")]
    #[param(default = 10, minimum = 1, maximum = 100)]
    pub limit: u64,

    /// Sort expression: `field` for ascending, `-field` for descending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[param(example = "-created_at")]
    pub sort: Option<String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: None,
        }
    }
}

impl PageOptions {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Check the bounds: `page >= 1`, `1 <= limit <= 100` and a skip that fits in an `i64`.
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be greater than or equal to 1".to_string());
        }
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Err(format!("limit must be between 1 and {MAX_LIMIT}"));
        }
        let skip = (self.page - 1).checked_mul(self.limit);
        if !skip.is_some_and(|skip| skip <= MAX_SKIP) {
            return Err("page is out of range".to_string());
        }
        match &self.sort {
            Some(sort) if sort.trim().trim_start_matches('-').is_empty() => {
                Err("sort must name a field".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Number of documents to skip, capped at [`MAX_SKIP`]
    pub fn skip(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(MAX_SKIP)
    }

    /// Split `sort` into field and direction.
    pub fn sort_spec(&self) -> Option<(&str, SortDirection)> {
        let sort = self.sort.as_deref()?.trim();
        match sort.strip_prefix('-') {
            Some(field) if !field.is_empty() => Some((field, SortDirection::Descending)),
            Some(_) => None,
            None if sort.is_empty() => None,
            None => Some((sort, SortDirection::Ascending)),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matching documents across all pages
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, options: &PageOptions) -> Self {
        let total_pages = if options.limit == 0 {
            0
        } else {
            total.div_ceil(options.limit)
        };

        Self {
            items,
            total,
            page: options.page,
            limit: options.limit,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
