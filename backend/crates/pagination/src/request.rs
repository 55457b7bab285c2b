//! Validated offset/limit page requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size applied when the caller omits `limit`.
pub const DEFAULT_LIMIT: u32 = 25;

/// Largest page size any caller can request; higher values are clamped.
pub const MAX_LIMIT: u32 = 100;

/// Errors returned when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// A zero limit would return an empty page forever.
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// Validated offset/limit pair for a paginated read.
///
/// Limits are clamped to [`MAX_LIMIT`] rather than rejected, so a client
/// asking for too much simply receives the largest permitted page. A zero
/// limit is rejected because it can never make progress.
///
/// # Examples
/// ```
/// use pagination::{PageRequest, DEFAULT_LIMIT, MAX_LIMIT};
///
/// let defaulted = PageRequest::from_params(None, None)?;
/// assert_eq!(defaulted.offset(), 0);
/// assert_eq!(defaulted.limit(), DEFAULT_LIMIT);
///
/// let clamped = PageRequest::from_params(Some(10), Some(10_000))?;
/// assert_eq!(clamped.offset(), 10);
/// assert_eq!(clamped.limit(), MAX_LIMIT);
/// # Ok::<(), pagination::PageRequestError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    offset: u64,
    limit: u32,
}

impl PageRequest {
    /// Build a request from optional query parameters.
    ///
    /// Missing values fall back to offset `0` and [`DEFAULT_LIMIT`]; limits
    /// above [`MAX_LIMIT`] are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::ZeroLimit`] when an explicit limit of `0`
    /// is supplied.
    pub fn from_params(offset: Option<u64>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        let clamped = match limit {
            Some(0) => return Err(PageRequestError::ZeroLimit),
            Some(value) => value.min(MAX_LIMIT),
            None => DEFAULT_LIMIT,
        };
        Ok(Self {
            offset: offset.unwrap_or(0),
            limit: clamped,
        })
    }

    /// First item index of the requested page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Maximum number of items in the requested page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Offset of the page that follows this one.
    #[must_use]
    pub const fn next_offset(&self) -> u64 {
        self.offset.saturating_add(self.limit as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}
