use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::raw::{QueryValue, RawQuery};

/// Largest offset a window reports. Stores take offsets as signed 64-bit.
pub const MAX_SKIP: u64 = i64::MAX as u64;

/// Offset window for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    /// 1-based page number
    pub current_page: u64,
    pub page_size: u64,
    /// Records skipped before this page, `page_size * (current_page - 1)`
    pub skip: u64,
    /// Maximum records on this page, always `page_size`
    pub limit: u64,
}

impl PageWindow {
    /// Window for `current_page`, clamped to at least the first page.
    ///
    /// `skip` saturates at [`MAX_SKIP`], which lands past the end of any
    /// result set.
    pub fn new(current_page: u64, page_size: NonZeroU64) -> Self {
        let current_page = current_page.max(1);
        let page_size = page_size.get();
        Self {
            current_page,
            page_size,
            skip: page_size.saturating_mul(current_page - 1).min(MAX_SKIP),
            limit: page_size,
        }
    }

    pub fn first(page_size: NonZeroU64) -> Self {
        Self::new(1, page_size)
    }

    /// Window selected by the `page_key` parameter of `raw`.
    pub fn from_query(raw: &RawQuery, page_key: &str, page_size: NonZeroU64) -> Self {
        Self::new(parse_page(raw.get(page_key)), page_size)
    }
}

/// Page number requested by a client.
///
/// Missing, non-numeric, zero and negative values all select page 1.
pub fn parse_page(value: Option<&QueryValue>) -> u64 {
    value
        .and_then(QueryValue::as_text)
        .and_then(|text| text.trim().parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .map_or(1, |page| page as u64)
}
