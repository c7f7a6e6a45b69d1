use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::TranslatorConfig;
use crate::Document;

/// Leading integer prefix of `raw`, the way a lenient form parser reads it:
/// surrounding whitespace and a sign are allowed, trailing garbage is ignored.
///
/// `"3"` → 3, `" 12abc"` → 12, `"-4"` → -4, `"abc"` / `""` → `None`.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (neg, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // saturate instead of overflowing on absurdly long inputs
    let n = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if neg { -n } else { n })
}

/// Resolved page window. Both fields are always ≥ 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Build a window from raw `page`/`limit` values.
    ///
    /// Missing, non-numeric and non-positive values fall back to `1` and
    /// `cfg.default_limit`; `limit` is clamped to `cfg.max_limit`.
    pub fn from_params(page: Option<&str>, limit: Option<&str>, cfg: &TranslatorConfig) -> Self {
        let page = page
            .and_then(parse_int_prefix)
            .filter(|n| *n > 0)
            .map_or(1, |n| n as u64);
        let max = cfg.max_limit.max(1);
        let limit = limit
            .and_then(parse_int_prefix)
            .filter(|n| *n > 0)
            .map_or(cfg.default_limit, |n| n as u64)
            .clamp(1, max);
        Self { page, limit }
    }

    /// `(page - 1) * limit`
    pub fn start_index(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// `page * limit`
    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination {
            next: (self.end_index() < total).then(|| PageLink {
                page: self.page + 1,
                limit: self.limit,
            }),
            prev: (self.page > 1).then(|| PageLink {
                page: self.page - 1,
                limit: self.limit,
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

/// List response: `{success, count, pagination, data}`.
///
/// `count` is the number of items in `data`, not the total match count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope<T = Document> {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<T>,
}

impl<T> ResultEnvelope<T> {
    pub fn assemble(data: Vec<T>, window: &PageWindow, total: u64) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination: window.pagination(total),
            data,
        }
    }

    /// Map items while keeping count and pagination (Document → DTO).
    pub fn map_data<U>(self, f: impl FnMut(T) -> U) -> ResultEnvelope<U> {
        ResultEnvelope {
            success: self.success,
            count: self.count,
            pagination: self.pagination,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

impl ResultEnvelope<Document> {
    pub fn into_json(self) -> Value {
        serde_json::json!({
            "success": self.success,
            "count": self.count,
            "pagination": self.pagination,
            "data": self.data,
        })
    }
}
