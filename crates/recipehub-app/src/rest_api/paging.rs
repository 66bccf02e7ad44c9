use crate::error::{ApiError, ApiResult};
use garde::Validate;
use recipehub_dal::{
    recipe::{RecipeFilter, StatusFilter},
    Batch, ListingParams,
};
use serde::{Deserialize, Serialize};

pub mod parsers;

pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters of recipe listings
#[derive(Debug, Clone, Default, Validate, Deserialize)]
pub struct RecipeQuery {
    #[garde(range(min = 1))]
    pub page: Option<u32>,
    #[garde(range(min = 1, max = 100))]
    pub per_page: Option<u32>,
    #[garde(length(max = 255))]
    pub search: Option<String>,
    #[garde(length(max = 100))]
    pub category: Option<String>,
    #[garde(length(max = 20))]
    pub status: Option<String>,
    #[garde(length(max = 100))]
    pub orderby: Option<String>,
    #[garde(length(max = 10))]
    pub order: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl RecipeQuery {
    pub fn page_size(&self, default_page_size: u32) -> u32 {
        self.per_page
            .unwrap_or(default_page_size)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn listing_params(&self, default_page_size: u32) -> ApiResult<ListingParams> {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size(default_page_size);
        let offset = (i64::from(page) - 1) * i64::from(page_size);
        let order =
            parsers::parse_ordering(self.orderby.as_deref(), self.order.as_deref())?;
        Ok(ListingParams::new(offset, page_size.into()).with_order(vec![order]))
    }

    /// Requested status scope, `default` when the parameter is missing
    pub fn status_filter(&self, default: StatusFilter) -> ApiResult<StatusFilter> {
        match non_empty(&self.status) {
            None => Ok(default),
            Some(status) => status
                .parse()
                .map_err(|_| ApiError::InvalidQuery(format!("Invalid status {status}"))),
        }
    }

    pub fn filter(&self, status: StatusFilter) -> RecipeFilter {
        RecipeFilter {
            status,
            category: non_empty(&self.category),
            search: non_empty(&self.search),
            created_by: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub total: u64,
    pub rows: Vec<T>,
}

impl<T> Page<T>
where
    T: Serialize,
{
    pub fn from_batch(batch: Batch<T>, page_size: u32) -> Self {
        let page_size = u64::from(page_size.max(1));
        let offset = u64::try_from(batch.offset).unwrap_or_default();
        Self {
            page: offset / page_size + 1,
            page_size,
            total_pages: batch.total.div_ceil(page_size),
            total: batch.total,
            rows: batch.rows,
        }
    }
}
