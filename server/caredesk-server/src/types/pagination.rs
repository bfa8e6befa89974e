//! Pagination for list endpoints

use crate::error::{ApiError, ApiResponse, PaginationInfo, ResponseMetadata};
use database_layer::ListQuery;
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `page` (1-based) and `pageSize` query parameters
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PaginationParams {
    /// Split the paging parameters out of a raw query map, leaving the
    /// remaining entries as equality filters
    pub fn take_from(query: &mut HashMap<String, String>) -> Result<Self, ApiError> {
        let mut parse = |key: &str| -> Result<Option<u32>, ApiError> {
            query
                .remove(key)
                .map(|raw| {
                    raw.parse::<u32>()
                        .map_err(|_| ApiError::validation(format!("{key} must be a positive integer")))
                })
                .transpose()
        };
        Ok(Self {
            page: parse("page")?,
            page_size: parse("pageSize")?,
        })
    }

    /// Get the page number (defaults to 1, minimum 1)
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get the page size (defaults to 20, clamped between 1 and 100)
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.page_size())
    }

    pub fn apply(&self, query: ListQuery) -> ListQuery {
        query.paginate(self.page_size(), self.offset())
    }

    pub fn total_pages(&self, total_count: u64) -> u64 {
        if total_count == 0 {
            return 1;
        }
        total_count.div_ceil(u64::from(self.page_size()))
    }

    pub fn to_metadata(&self, total_count: u64) -> ResponseMetadata {
        let total_pages = self.total_pages(total_count);
        ResponseMetadata {
            pagination: Some(PaginationInfo {
                page: self.page(),
                page_size: self.page_size(),
                total_pages,
                has_next: u64::from(self.page()) < total_pages,
                has_previous: self.page() > 1,
            }),
            total_count: Some(total_count),
        }
    }

    /// Wrap data with pagination metadata
    pub fn wrap_response<T>(&self, data: T, total_count: u64) -> ApiResponse<T> {
        crate::error::api_success_with_meta(data, self.to_metadata(total_count))
    }
}
