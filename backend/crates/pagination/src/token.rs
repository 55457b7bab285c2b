//! Opaque continuation tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned when decoding a [`PageToken`] supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageTokenDecodeError {
    /// The token was not valid base64url.
    #[error("page token is not valid base64url")]
    InvalidEncoding,
    /// The decoded payload did not match the expected token structure.
    #[error("page token payload is malformed")]
    MalformedPayload,
}

/// Payload serialized into the token. Kept private so the wire format can
/// evolve without leaking into the public API.
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    #[serde(rename = "o")]
    offset: u64,
}

/// Opaque continuation token pointing at the next page offset.
///
/// Encoded as base64url(compact JSON). Clients must not parse it; servers
/// round-trip it through [`PageToken::encode`] and [`PageToken::decode`].
///
/// # Examples
/// ```
/// use pagination::PageToken;
///
/// let token = PageToken::encode(75);
/// let decoded = PageToken::decode(token.as_str())?;
/// assert_eq!(decoded.offset(), 75);
/// # Ok::<(), pagination::PageTokenDecodeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    /// Encode the given offset into an opaque token.
    #[must_use]
    pub fn encode(offset: u64) -> Self {
        let payload = TokenPayload { offset };
        // Serializing a struct of plain integers cannot fail.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        Self(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a client-supplied token back into an offset carrier.
    ///
    /// # Errors
    ///
    /// Returns [`PageTokenDecodeError::InvalidEncoding`] for non-base64url
    /// input and [`PageTokenDecodeError::MalformedPayload`] when the decoded
    /// bytes are not a recognized token payload.
    pub fn decode(raw: &str) -> Result<DecodedPageToken, PageTokenDecodeError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|_| PageTokenDecodeError::InvalidEncoding)?;
        let payload: TokenPayload = serde_json::from_slice(&bytes)
            .map_err(|_| PageTokenDecodeError::MalformedPayload)?;
        Ok(DecodedPageToken {
            offset: payload.offset,
        })
    }

    /// Borrow the encoded token text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of decoding a [`PageToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPageToken {
    offset: u64,
}

impl DecodedPageToken {
    /// Offset of the page the token points at.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0)]
    #[case(75)]
    #[case(u64::MAX)]
    fn round_trips_offsets(#[case] offset: u64) {
        let token = PageToken::encode(offset);
        let decoded = PageToken::decode(token.as_str()).expect("round trip");
        assert_eq!(decoded.offset(), offset);
    }

    #[rstest]
    fn rejects_non_base64_input() {
        let error = PageToken::decode("not//valid!").expect_err("invalid encoding");
        assert_eq!(error, PageTokenDecodeError::InvalidEncoding);
    }

    #[rstest]
    fn rejects_foreign_payloads() {
        let foreign = URL_SAFE_NO_PAD.encode(br#"{"unexpected":true}"#);
        let error = PageToken::decode(&foreign).expect_err("malformed payload");
        assert_eq!(error, PageTokenDecodeError::MalformedPayload);
    }

    #[rstest]
    fn token_text_is_url_safe() {
        let token = PageToken::encode(123_456);
        assert!(
            token
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
