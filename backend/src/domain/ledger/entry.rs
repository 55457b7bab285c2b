//! Ledger entry entities and their value types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

use super::reason::ChipReason;
use super::validation::LedgerValidationError;

/// Maximum accepted length for a source reference.
pub(crate) const SOURCE_REF_MAX: usize = 128;

/// Append-order sequence number assigned by the ledger store.
///
/// Sequences are strictly increasing across the whole ledger and start at 1;
/// [`EntrySeq::ORIGIN`] sits below every real sequence and is the initial
/// projection watermark.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct EntrySeq(u64);

impl EntrySeq {
    /// Watermark below every assigned sequence.
    pub const ORIGIN: Self = Self(0);

    /// Wrap a store-assigned sequence number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw sequence number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntrySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed, non-zero chip amount.
///
/// Positive amounts credit the user, negative amounts debit. Zero is
/// rejected at construction so a no-op entry can never reach the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ChipAmount(i64);

impl ChipAmount {
    /// Validate and construct a [`ChipAmount`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerValidationError::ZeroAmount`] for a zero amount.
    pub fn new(value: i64) -> Result<Self, LedgerValidationError> {
        if value == 0 {
            return Err(LedgerValidationError::ZeroAmount);
        }
        Ok(Self(value))
    }

    /// The signed chip delta.
    pub fn get(self) -> i64 {
        self.0
    }

    /// Whether this amount credits the user.
    pub fn is_credit(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ChipAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ChipAmount> for i64 {
    fn from(value: ChipAmount) -> Self {
        value.0
    }
}

impl TryFrom<i64> for ChipAmount {
    type Error = LedgerValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque identifier of the object that triggered an entry.
///
/// Examples: a prompt id, the referee id of a referral, a badge id. Together
/// with the user id and reason it forms the ledger's idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceRef(String);

impl SourceRef {
    /// Validate and construct a [`SourceRef`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerValidationError::EmptySourceRef`] for blank input and
    /// [`LedgerValidationError::SourceRefTooLong`] past the length cap.
    pub fn new(value: impl Into<String>) -> Result<Self, LedgerValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(LedgerValidationError::EmptySourceRef);
        }
        if raw.trim() != raw {
            return Err(LedgerValidationError::EmptySourceRef);
        }
        if raw.len() > SOURCE_REF_MAX {
            return Err(LedgerValidationError::SourceRefTooLong { max: SOURCE_REF_MAX });
        }
        Ok(Self(raw))
    }

    /// Borrow the reference as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for SourceRef {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SourceRef> for String {
    fn from(value: SourceRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for SourceRef {
    type Error = LedgerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated append request, before the store assigns identity and order.
///
/// Construction enforces the source-reference rule: every reason except
/// `admin_adjustment` must name its triggering object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    user_id: UserId,
    amount: ChipAmount,
    reason: ChipReason,
    source_ref: Option<SourceRef>,
    created_by: UserId,
}

impl NewLedgerEntry {
    /// Validate and construct a new append request.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerValidationError::MissingSourceRef`] when `reason`
    /// requires a source reference and none was provided.
    pub fn new(
        user_id: UserId,
        amount: ChipAmount,
        reason: ChipReason,
        source_ref: Option<SourceRef>,
        created_by: UserId,
    ) -> Result<Self, LedgerValidationError> {
        if reason.requires_source_ref() && source_ref.is_none() {
            return Err(LedgerValidationError::MissingSourceRef { reason });
        }
        Ok(Self {
            user_id,
            amount,
            reason,
            source_ref,
            created_by,
        })
    }

    /// The credited or debited user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The signed chip delta.
    pub fn amount(&self) -> ChipAmount {
        self.amount
    }

    /// Why the entry exists.
    pub fn reason(&self) -> ChipReason {
        self.reason
    }

    /// Identifier of the triggering object, when the reason has one.
    pub fn source_ref(&self) -> Option<&SourceRef> {
        self.source_ref.as_ref()
    }

    /// The actor that caused the entry.
    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }
}

/// Immutable ledger fact with store-assigned identity and order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    entry_id: Uuid,
    seq: EntrySeq,
    request: NewLedgerEntry,
    created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Seal a validated append request with store-assigned identity.
    ///
    /// Called by ledger store adapters at append time; the invariants of the
    /// request carry over unchanged.
    pub fn record(
        request: NewLedgerEntry,
        entry_id: Uuid,
        seq: EntrySeq,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entry_id,
            seq,
            request,
            created_at,
        }
    }

    /// Unique entry identifier.
    pub fn entry_id(&self) -> Uuid {
        self.entry_id
    }

    /// Store-assigned append sequence.
    pub fn seq(&self) -> EntrySeq {
        self.seq
    }

    /// The credited or debited user.
    pub fn user_id(&self) -> &UserId {
        self.request.user_id()
    }

    /// The signed chip delta.
    pub fn amount(&self) -> ChipAmount {
        self.request.amount()
    }

    /// Why the entry exists.
    pub fn reason(&self) -> ChipReason {
        self.request.reason()
    }

    /// Identifier of the triggering object, when the reason has one.
    pub fn source_ref(&self) -> Option<&SourceRef> {
        self.request.source_ref()
    }

    /// When the store made the entry durable.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The actor that caused the entry.
    pub fn created_by(&self) -> &UserId {
        self.request.created_by()
    }
}

/// Raw entry fields as loaded from storage.
///
/// Adapters convert rows into this shape and then validate through
/// [`TryFrom`] so that only well-formed facts reach the domain.
#[derive(Debug, Clone)]
pub struct LedgerEntryRecord {
    /// Unique entry identifier.
    pub entry_id: Uuid,
    /// Store-assigned append sequence.
    pub seq: EntrySeq,
    /// The credited or debited user.
    pub user_id: UserId,
    /// Signed chip delta.
    pub amount: i64,
    /// Why the entry exists.
    pub reason: ChipReason,
    /// Identifier of the triggering object.
    pub source_ref: Option<String>,
    /// When the store made the entry durable.
    pub created_at: DateTime<Utc>,
    /// The actor that caused the entry.
    pub created_by: UserId,
}

impl TryFrom<LedgerEntryRecord> for LedgerEntry {
    type Error = LedgerValidationError;

    fn try_from(record: LedgerEntryRecord) -> Result<Self, Self::Error> {
        let LedgerEntryRecord {
            entry_id,
            seq,
            user_id,
            amount,
            reason,
            source_ref,
            created_at,
            created_by,
        } = record;

        let amount = ChipAmount::new(amount)?;
        let source_ref = source_ref.map(SourceRef::new).transpose()?;
        let request = NewLedgerEntry::new(user_id, amount, reason, source_ref, created_by)?;
        Ok(Self::record(request, entry_id, seq, created_at))
    }
}
