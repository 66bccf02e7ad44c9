use recipehub_dal::Order;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_ORDER_FIELD: &str = "created_at";

/// Turns `orderby` and `order` query values into an ordering, newest first by default
pub fn parse_ordering(orderby: Option<&str>, order: Option<&str>) -> ApiResult<Order> {
    let field_name = match orderby.map(str::trim) {
        None | Some("") => DEFAULT_ORDER_FIELD,
        Some(name) if name.len() > 100 => {
            return Err(ApiError::InvalidQuery("Ordering name too long".to_string()))
        }
        Some(name) => name,
    };

    let descending = match order.map(|o| o.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("desc") => true,
        Some("asc") => false,
        Some(other) => {
            return Err(ApiError::InvalidQuery(format!(
                "Invalid order direction {other}, use asc or desc"
            )))
        }
    };

    let order = if descending {
        Order::Desc(field_name.to_string())
    } else {
        Order::Asc(field_name.to_string())
    };
    Ok(order)
}

/// Splits a combined `field:direction` sort value as used by the page selectors
pub fn split_sort(sort: &str) -> (Option<&str>, Option<&str>) {
    match sort.trim().split_once(':') {
        Some((field, direction)) => (Some(field), Some(direction)),
        None if sort.trim().is_empty() => (None, None),
        None => (Some(sort.trim()), None),
    }
}
