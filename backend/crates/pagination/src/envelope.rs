//! Response envelope for one page of items.

use serde::{Deserialize, Serialize};

use crate::request::PageRequest;
use crate::token::PageToken;

/// One page of items plus the coordinates it was cut from.
///
/// `next` is present only when further items exist beyond this page, so
/// clients can detect the final page without comparing counts themselves.
///
/// # Examples
/// ```
/// use pagination::{PageEnvelope, PageRequest};
///
/// let request = PageRequest::from_params(Some(0), Some(2))?;
/// let envelope = PageEnvelope::new(vec!["a", "b"], &request, 5);
/// assert_eq!(envelope.items.len(), 2);
/// assert_eq!(envelope.total, 5);
/// assert!(envelope.next.is_some());
/// # Ok::<(), pagination::PageRequestError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Items in this page, in listing order.
    pub items: Vec<T>,
    /// Offset the page starts at.
    pub offset: u64,
    /// Limit the page was cut with.
    pub limit: u32,
    /// Total number of items across all pages at snapshot time.
    pub total: u64,
    /// Continuation token for the next page, absent on the final page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageToken>,
}

impl<T> PageEnvelope<T> {
    /// Wrap a page of items cut with `request` from a listing of `total`
    /// items.
    #[must_use]
    pub fn new(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        let next_offset = request.next_offset();
        let next = (next_offset < total).then(|| PageToken::encode(next_offset));
        Self {
            items,
            offset: request.offset(),
            limit: request.limit(),
            total,
            next,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::token::PageToken;

    fn request(offset: u64, limit: u32) -> PageRequest {
        PageRequest::from_params(Some(offset), Some(limit)).expect("valid params")
    }

    #[rstest]
    fn emits_continuation_token_when_more_items_exist(
        #[values((0, 2, 5, true), (4, 2, 5, false), (0, 5, 5, false))] case: (
            u64,
            u32,
            u64,
            bool,
        ),
    ) {
        let (offset, limit, total, expect_next) = case;
        let envelope = PageEnvelope::new(vec![(); limit as usize], &request(offset, limit), total);
        assert_eq!(envelope.next.is_some(), expect_next);
    }

    #[rstest]
    fn continuation_token_points_at_next_offset() {
        let envelope = PageEnvelope::new(vec!["x", "y"], &request(2, 2), 10);
        let token = envelope.next.expect("next token");
        let decoded = PageToken::decode(token.as_str()).expect("decodes");
        assert_eq!(decoded.offset(), 4);
    }

    #[rstest]
    fn serializes_without_next_on_final_page() {
        let envelope = PageEnvelope::new(vec![1, 2], &request(0, 25), 2);
        let json = serde_json::to_value(&envelope).expect("serializes");
        assert!(json.get("next").is_none());
        assert_eq!(json["total"], 2);
    }
}
