use serde::{Deserialize, Serialize};

/// A 1-based page request. Both values are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub page: u64,
    pub limit: u64,
}

impl PageSpec {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 10;

    /// Lenient parse of the raw `page` and `limit` parameters. Each value
    /// falls back to its default on its own when absent, non-numeric or not
    /// positive.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: positive(page).unwrap_or(Self::DEFAULT_PAGE),
            limit: positive(limit).unwrap_or(Self::DEFAULT_LIMIT),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn with_max_limit(self, max: u64) -> Self {
        Self {
            limit: self.limit.min(max.max(1)),
            ..self
        }
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

fn positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as u64)
}
