//! In-process referral edge store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{AttributionOutcome, ReferralRepository, ReferralRepositoryError};
use crate::domain::referral::ReferralEdge;

use super::lock_unpoisoned;

/// In-process [`ReferralRepository`] keyed by referee: first attribution
/// wins.
#[derive(Default)]
pub struct InMemoryReferralRepository {
    edges: Mutex<HashMap<Uuid, ReferralEdge>>,
}

impl InMemoryReferralRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReferralRepository for InMemoryReferralRepository {
    async fn attribute(
        &self,
        edge: ReferralEdge,
    ) -> Result<AttributionOutcome, ReferralRepositoryError> {
        let mut edges = lock_unpoisoned(&self.edges);
        let key = *edge.referee_id().as_uuid();
        if let Some(existing) = edges.get(&key) {
            return Ok(AttributionOutcome::AlreadyAttributed(existing.clone()));
        }
        edges.insert(key, edge.clone());
        Ok(AttributionOutcome::Recorded(edge))
    }

    async fn find_by_referee(
        &self,
        referee_id: &UserId,
    ) -> Result<Option<ReferralEdge>, ReferralRepositoryError> {
        Ok(lock_unpoisoned(&self.edges)
            .get(referee_id.as_uuid())
            .cloned())
    }

    async fn mark_credited(
        &self,
        referee_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<ReferralEdge>, ReferralRepositoryError> {
        let mut edges = lock_unpoisoned(&self.edges);
        match edges.get_mut(referee_id.as_uuid()) {
            Some(edge) => {
                edge.mark_credited(at);
                Ok(Some(edge.clone()))
            }
            None => Ok(None),
        }
    }
}
