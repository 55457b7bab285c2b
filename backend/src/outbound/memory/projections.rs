//! In-process projection store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{ProjectionRepository, ProjectionRepositoryError};
use crate::domain::projection::BalanceProjection;

use super::lock_unpoisoned;

/// In-process [`ProjectionRepository`].
#[derive(Default)]
pub struct InMemoryProjectionRepository {
    projections: Mutex<HashMap<Uuid, BalanceProjection>>,
}

impl InMemoryProjectionRepository {
    /// Create an empty projection store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectionRepository for InMemoryProjectionRepository {
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<BalanceProjection>, ProjectionRepositoryError> {
        let projections = lock_unpoisoned(&self.projections);
        Ok(projections.get(user_id.as_uuid()).cloned())
    }

    async fn save(
        &self,
        projection: &BalanceProjection,
    ) -> Result<(), ProjectionRepositoryError> {
        let mut projections = lock_unpoisoned(&self.projections);
        projections.insert(*projection.user_id().as_uuid(), projection.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<BalanceProjection>, ProjectionRepositoryError> {
        let projections = lock_unpoisoned(&self.projections);
        Ok(projections.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::ledger::EntrySeq;

    #[rstest]
    #[tokio::test]
    async fn save_then_find_round_trips() {
        let repo = InMemoryProjectionRepository::new();
        let user = UserId::random();
        let projection = BalanceProjection::from_parts(
            user.clone(),
            150,
            1,
            0,
            EntrySeq::new(2),
            chrono::Utc::now(),
        );

        repo.save(&projection).await.expect("save");
        let found = repo.find(&user).await.expect("find");
        assert_eq!(found, Some(projection));
    }

    #[rstest]
    #[tokio::test]
    async fn save_overwrites_previous_state() {
        let repo = InMemoryProjectionRepository::new();
        let user = UserId::random();
        let older = BalanceProjection::from_parts(
            user.clone(),
            100,
            0,
            0,
            EntrySeq::new(1),
            chrono::Utc::now(),
        );
        let newer = BalanceProjection::from_parts(
            user.clone(),
            300,
            0,
            1,
            EntrySeq::new(2),
            chrono::Utc::now(),
        );

        repo.save(&older).await.expect("save older");
        repo.save(&newer).await.expect("save newer");

        let all = repo.list_all().await.expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all.first().map(BalanceProjection::balance), Some(300));
    }

    #[rstest]
    #[tokio::test]
    async fn find_unknown_user_reads_none() {
        let repo = InMemoryProjectionRepository::new();
        assert_eq!(repo.find(&UserId::random()).await.expect("find"), None);
    }
}
