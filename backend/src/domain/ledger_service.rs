//! Chip ledger domain service.
//!
//! Implements the append → project → evaluate unit behind
//! [`ChipLedgerCommand`] and [`BalanceQuery`]. All mutation for one user is
//! serialized through a per-user async mutex held for the whole unit, so a
//! badge-reward follow-up can never interleave with an unrelated append for
//! the same user. Appends for different users share nothing but the store.

use std::collections::HashMap;
use std::sync::{Mutex as StdMutex, PoisonError};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;
use uuid::Uuid;

use crate::domain::badge::{BadgeDefinition, UserBadge};
use crate::domain::badge_engine::BadgeRuleEngine;
use crate::domain::ledger::{
    ChipAmount, ChipReason, LedgerValidationError, NewLedgerEntry, SourceRef,
};
use crate::domain::ports::{
    AppendOutcome, BadgeCatalogRepository, BalancePayload, BalanceQuery, ChipLedgerCommand,
    LedgerRepository, LedgerRepositoryError, ProjectionRepository, ProjectionRepositoryError,
    RecordChipEventRequest, RecordChipEventResponse, UnlockedBadgePayload, UserBadgeRepository,
    UserDirectory, UserDirectoryError,
};
use crate::domain::projection::BalanceProjection;
use crate::domain::{Error, UserId};

/// Bounded attempts for appends that race a concurrent sequence writer.
const MAX_CONFLICT_RETRIES: u32 = 3;

/// Per-user mutual exclusion registry.
///
/// Lock handles are created on first touch and kept for the life of the
/// service; the registry itself is guarded by a plain mutex held only long
/// enough to clone a handle out.
#[derive(Default)]
struct UserLockRegistry {
    locks: StdMutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl UserLockRegistry {
    fn handle(&self, user_id: &UserId) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(*user_id.as_uuid()).or_default().clone()
    }
}

fn map_ledger_error(error: LedgerRepositoryError) -> Error {
    match error {
        LedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ledger store unavailable: {message}"))
        }
        LedgerRepositoryError::Query { message } => {
            Error::internal(format!("ledger store error: {message}"))
        }
        LedgerRepositoryError::Corrupt { message } => {
            Error::internal(format!("ledger store returned corrupt data: {message}"))
        }
        LedgerRepositoryError::Conflict { message } => Error::conflict(format!(
            "ledger append kept racing concurrent writers: {message}"
        )),
    }
}

fn map_projection_error(error: ProjectionRepositoryError) -> Error {
    match error {
        ProjectionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("projection store unavailable: {message}"))
        }
        ProjectionRepositoryError::Query { message } => {
            Error::internal(format!("projection store error: {message}"))
        }
    }
}

fn map_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Unavailable { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
    }
}

fn map_validation_error(error: LedgerValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

/// Chip ledger service implementing the command and balance driving ports.
#[derive(Clone)]
pub struct ChipLedgerService<L, P, C, B, D> {
    ledger: Arc<L>,
    projections: Arc<P>,
    engine: BadgeRuleEngine<C, B>,
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
    locks: Arc<UserLockRegistry>,
}

impl<L, P, C, B, D> ChipLedgerService<L, P, C, B, D> {
    /// Create a service over the given adapters.
    pub fn new(
        ledger: Arc<L>,
        projections: Arc<P>,
        engine: BadgeRuleEngine<C, B>,
        directory: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            projections,
            engine,
            directory,
            clock,
            locks: Arc::new(UserLockRegistry::default()),
        }
    }
}

impl<L, P, C, B, D> ChipLedgerService<L, P, C, B, D>
where
    L: LedgerRepository,
    P: ProjectionRepository,
    C: BadgeCatalogRepository,
    B: UserBadgeRepository,
    D: UserDirectory,
{
    fn validate(request: &RecordChipEventRequest) -> Result<NewLedgerEntry, Error> {
        if request.reason == ChipReason::AdminAdjustment && !request.actor.is_admin() {
            return Err(Error::forbidden("admin adjustments require the admin role"));
        }
        if !request.actor.is_admin() && request.actor.id != request.user_id {
            return Err(Error::forbidden(
                "members may only record events for their own account",
            ));
        }

        let amount = ChipAmount::new(request.amount).map_err(map_validation_error)?;
        let source_ref = request
            .source_ref
            .clone()
            .map(SourceRef::new)
            .transpose()
            .map_err(map_validation_error)?;
        NewLedgerEntry::new(
            request.user_id.clone(),
            amount,
            request.reason,
            source_ref,
            request.actor.id.clone(),
        )
        .map_err(map_validation_error)
    }

    async fn require_known_user(&self, user_id: &UserId) -> Result<(), Error> {
        let known = self
            .directory
            .exists(user_id)
            .await
            .map_err(map_directory_error)?;
        if known {
            Ok(())
        } else {
            Err(Error::not_found(format!("unknown user {user_id}")))
        }
    }

    /// Append with bounded retries against concurrent sequence races.
    async fn append_with_retry(&self, entry: NewLedgerEntry) -> Result<AppendOutcome, Error> {
        let mut attempt = 0_u32;
        loop {
            match self.ledger.append(entry.clone()).await {
                Ok(outcome) => return Ok(outcome),
                Err(LedgerRepositoryError::Conflict { message }) => {
                    attempt += 1;
                    if attempt >= MAX_CONFLICT_RETRIES {
                        return Err(map_ledger_error(LedgerRepositoryError::Conflict {
                            message,
                        }));
                    }
                }
                Err(other) => return Err(map_ledger_error(other)),
            }
        }
    }

    /// Load a user's projection and fold in any durable entries past its
    /// watermark.
    ///
    /// Catch-up makes the projector self-healing: entries that became
    /// durable without a projection save (a crash mid-unit) are folded the
    /// next time the user is touched, so rebuild equivalence holds for the
    /// stored state too.
    async fn load_caught_up(&self, user_id: &UserId) -> Result<(BalanceProjection, bool), Error> {
        let mut projection = self
            .projections
            .find(user_id)
            .await
            .map_err(map_projection_error)?
            .unwrap_or_else(|| BalanceProjection::new(user_id.clone()));

        let missed = self
            .ledger
            .list_for_user(user_id, Some(projection.last_entry_seq()))
            .await
            .map_err(map_ledger_error)?;
        let mut changed = false;
        for entry in &missed {
            changed |= projection.fold(entry);
        }
        Ok((projection, changed))
    }

    /// Award every currently-unlockable badge once.
    ///
    /// Returns whether any chip reward was credited, i.e. whether the
    /// projection moved and another evaluation could observe new state.
    async fn award_pass(
        &self,
        projection: &mut BalanceProjection,
        awarded_by: &UserId,
        unlocked: &mut Vec<UnlockedBadgePayload>,
    ) -> Result<bool, Error> {
        let newly = self.engine.newly_unlockable(projection).await?;
        let mut credited = false;

        for badge in newly {
            credited |= self
                .award_badge(projection, awarded_by, &badge, unlocked)
                .await?;
        }
        Ok(credited)
    }

    /// Credit one badge's reward through the ledger, fold it, and record the
    /// earned fact.
    ///
    /// Ordering matters: the reward entry must be durable before the earned
    /// fact exists, so a failure between the two leaves a retryable state
    /// (the badge unlocks again on the caller's retry and the reward append
    /// deduplicates on its badge-id source reference).
    async fn award_badge(
        &self,
        projection: &mut BalanceProjection,
        awarded_by: &UserId,
        badge: &BadgeDefinition,
        unlocked: &mut Vec<UnlockedBadgePayload>,
    ) -> Result<bool, Error> {
        let mut credited = false;
        if badge.chips_reward() > 0 {
            let amount =
                ChipAmount::new(i64::from(badge.chips_reward())).map_err(map_validation_error)?;
            let source_ref =
                SourceRef::new(badge.badge_id().to_string()).map_err(map_validation_error)?;
            let reward = NewLedgerEntry::new(
                projection.user_id().clone(),
                amount,
                ChipReason::BadgeReward,
                Some(source_ref),
                awarded_by.clone(),
            )
            .map_err(map_validation_error)?;

            let outcome = self.append_with_retry(reward).await?;
            credited = projection.fold(outcome.entry());
        }

        let inserted = self
            .engine
            .record_earned(&UserBadge {
                user_id: projection.user_id().clone(),
                badge_id: badge.badge_id(),
                earned_at: self.clock.utc(),
            })
            .await?;
        if inserted {
            unlocked.push(UnlockedBadgePayload {
                badge_id: badge.badge_id(),
                name: badge.name().to_owned(),
                chips_reward: badge.chips_reward(),
            });
        }
        Ok(credited)
    }

    /// Replay the full ledger for a user into a fresh projection and store
    /// it, returning the result.
    ///
    /// Used for recovery and drift detection; the result must equal the
    /// incrementally maintained projection for the same ledger contents.
    pub async fn rebuild(&self, user_id: &UserId) -> Result<BalanceProjection, Error> {
        let lock = self.locks.handle(user_id);
        let _guard = lock.lock().await;

        let entries = self
            .ledger
            .list_for_user(user_id, None)
            .await
            .map_err(map_ledger_error)?;
        let projection = BalanceProjection::rebuild(user_id.clone(), &entries);
        self.projections
            .save(&projection)
            .await
            .map_err(map_projection_error)?;
        Ok(projection)
    }
}

#[async_trait]
impl<L, P, C, B, D> ChipLedgerCommand for ChipLedgerService<L, P, C, B, D>
where
    L: LedgerRepository,
    P: ProjectionRepository,
    C: BadgeCatalogRepository,
    B: UserBadgeRepository,
    D: UserDirectory,
{
    async fn record_chip_event(
        &self,
        request: RecordChipEventRequest,
    ) -> Result<RecordChipEventResponse, Error> {
        let entry = Self::validate(&request)?;
        self.require_known_user(&request.user_id).await?;

        let lock = self.locks.handle(&request.user_id);
        let _guard = lock.lock().await;

        let outcome = self.append_with_retry(entry).await?;
        let entry_id = outcome.entry().entry_id();

        if outcome.is_duplicate() {
            // The original request already projected this entry and reported
            // its unlocks; answer from current state without re-crediting.
            let (projection, _) = self.load_caught_up(&request.user_id).await?;
            return Ok(RecordChipEventResponse {
                entry_id,
                balance: projection.balance(),
                tier: projection.tier(),
                duplicate: true,
                newly_unlocked_badges: Vec::new(),
            });
        }

        let (mut projection, _) = self.load_caught_up(&request.user_id).await?;
        let awarded_by = request.actor.id.clone();
        let mut unlocked = Vec::new();

        // First pass evaluates the append itself; the bounded second pass
        // only runs when a reward credit moved the projection again.
        let rewarded = self
            .award_pass(&mut projection, &awarded_by, &mut unlocked)
            .await?;
        if rewarded {
            let rewarded_again = self
                .award_pass(&mut projection, &awarded_by, &mut unlocked)
                .await?;
            if rewarded_again {
                let residual = self.engine.newly_unlockable(&projection).await?;
                if !residual.is_empty() {
                    warn!(
                        user_id = %request.user_id,
                        deferred = residual.len(),
                        "badge cascade truncated at the one-cycle cap; remaining unlocks deferred to the next append"
                    );
                }
            }
        }

        self.projections
            .save(&projection)
            .await
            .map_err(map_projection_error)?;

        Ok(RecordChipEventResponse {
            entry_id,
            balance: projection.balance(),
            tier: projection.tier(),
            duplicate: false,
            newly_unlocked_badges: unlocked,
        })
    }
}

#[async_trait]
impl<L, P, C, B, D> BalanceQuery for ChipLedgerService<L, P, C, B, D>
where
    L: LedgerRepository,
    P: ProjectionRepository,
    C: BadgeCatalogRepository,
    B: UserBadgeRepository,
    D: UserDirectory,
{
    async fn get_balance(&self, user_id: &UserId) -> Result<BalancePayload, Error> {
        self.require_known_user(user_id).await?;

        // Read-only catch-up: folding in memory keeps the answer current
        // without writing outside the per-user lock.
        let (projection, _) = self.load_caught_up(user_id).await?;
        Ok(BalancePayload {
            balance: projection.balance(),
            tier: projection.tier(),
        })
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
