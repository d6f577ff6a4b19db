//! Page window over an ordered case listing

use serde::{Deserialize, Serialize};

/// Maximum page size served by any query
pub const MAX_LIMIT: u32 = 1000;

/// Page size when the caller does not ask for one
pub const DEFAULT_LIMIT: u32 = 20;

/// Limit/offset window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl PageRequest {
    /// Create a window with the limit clamped to `1..=MAX_LIMIT`.
    pub fn new(limit: u32, offset: u64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// Window for a 1-indexed page number. Page 0 is treated as page 1.
    pub fn from_page(page: u32, limit: u32) -> Self {
        let limit = limit.clamp(1, MAX_LIMIT);
        let offset = u64::from(page.max(1) - 1) * u64::from(limit);
        Self { limit, offset }
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Get OFFSET value.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Apply the window to an already ordered slice.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset)
            .unwrap_or(usize::MAX)
            .min(items.len());
        let end = start.saturating_add(self.limit as usize).min(items.len());
        &items[start..end]
    }

    /// `has_more` heuristic: a full page suggests another one follows.
    pub fn is_full(&self, returned: usize) -> bool {
        returned == self.limit as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
