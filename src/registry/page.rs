//! Page Request
//!
//! Offset/limit pagination for the upload registry.

use serde::{Deserialize, Serialize};

/// Page size used when the caller gives none.
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 24;

// == Page Request ==
/// A validated slice request: `offset` items skipped, at most `limit` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Applies defaults and clamps `limit` to [`MAX_PAGE_SIZE`].
    pub fn new(offset: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            offset: offset.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
        }
    }

    /// Inclusive `(start, stop)` indices for `LRANGE`, or None for an empty page.
    pub fn range(&self) -> Option<(isize, isize)> {
        if self.limit == 0 {
            return None;
        }
        let start = isize::try_from(self.offset).ok()?;
        let stop = start.checked_add(self.limit as isize - 1)?;
        Some((start, stop))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageRequest::default();
        assert_eq!(page.offset, 0);
        assert_eq!(page.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(page.range(), Some((0, 5)));
    }

    #[test]
    fn test_limit_clamped() {
        let page = PageRequest::new(Some(3), Some(500));
        assert_eq!(page.limit, MAX_PAGE_SIZE);
        assert_eq!(page.range(), Some((3, 26)));
    }

    #[test]
    fn test_zero_limit_is_empty() {
        assert_eq!(PageRequest::new(Some(0), Some(0)).range(), None);
    }

    #[test]
    fn test_huge_offset_is_empty() {
        assert_eq!(PageRequest::new(Some(usize::MAX), Some(6)).range(), None);
    }
}
