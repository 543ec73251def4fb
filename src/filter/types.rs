use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

/// Query string accepted by every list endpoint.
///
/// `size` and `page` stay as raw strings so unparsable values fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub size: Option<String>,
    pub page: Option<String>,
}

impl ListParams {
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn status(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn page_request(&self, api: &ApiConfig) -> PageRequest {
        let max = api.max_page_size.max(1);
        let size = parse_positive(self.size.as_deref())
            .unwrap_or(api.default_page_size)
            .clamp(1, max);
        let number = parse_positive(self.page.as_deref()).unwrap_or(1);
        PageRequest { number, size }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).filter(|v| *v > 0)
}

/// 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
}

impl PageRequest {
    /// Rows before this page, capped at what the driver accepts (`i64::MAX`).
    pub fn skip(&self) -> u64 {
        (self.number - 1)
            .saturating_mul(self.size)
            .min(i64::MAX as u64)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    pub fn total_pages(&self, total_rows: u64) -> u64 {
        total_rows.div_ceil(self.size)
    }
}

/// Paged list envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_rows: u64,
    pub total_pages: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, total_rows: u64, data: Vec<T>) -> Self {
        Self {
            total_rows,
            total_pages: request.total_pages(total_rows),
            page_number: request.number,
            page_size: request.size,
            data,
        }
    }
}
