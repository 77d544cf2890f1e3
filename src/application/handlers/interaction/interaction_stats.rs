//! Aggregated swipe and match counts for one user.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::matching::{InteractionStats, MatchingError};
use crate::ports::{InteractionRepository, MatchRepository};

/// Query for a user's interaction statistics.
#[derive(Debug, Clone)]
pub struct InteractionStatsQuery {
    pub user_id: UserId,
}

/// Swipe counts plus the user's match total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionStatsResult {
    pub stats: InteractionStats,
    pub matches: u64,
}

/// Handler for interaction statistics.
pub struct InteractionStatsHandler {
    interactions: Arc<dyn InteractionRepository>,
    matches: Arc<dyn MatchRepository>,
}

impl InteractionStatsHandler {
    pub fn new(
        interactions: Arc<dyn InteractionRepository>,
        matches: Arc<dyn MatchRepository>,
    ) -> Self {
        Self {
            interactions,
            matches,
        }
    }

    pub async fn handle(
        &self,
        query: InteractionStatsQuery,
    ) -> Result<InteractionStatsResult, MatchingError> {
        let (stats, matches) = tokio::try_join!(
            self.interactions.stats_for_user(&query.user_id),
            self.matches.count_for_user(&query.user_id)
        )?;

        Ok(InteractionStatsResult { stats, matches })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{user, MockInteractionRepository, MockMatchRepository};

    #[tokio::test]
    async fn combines_swipe_and_match_counts() {
        let interactions = MockInteractionRepository {
            stats: InteractionStats {
                sent_interest: 4,
                sent_pass: 2,
                received_interest: 7,
                received_pass: 1,
            },
            ..Default::default()
        };
        let matches = MockMatchRepository {
            match_count: 3,
            ..Default::default()
        };
        let handler = InteractionStatsHandler::new(Arc::new(interactions), Arc::new(matches));

        let result = handler
            .handle(InteractionStatsQuery { user_id: user("u1") })
            .await
            .unwrap();

        assert_eq!(result.stats.sent_interest, 4);
        assert_eq!(result.stats.received_interest, 7);
        assert_eq!(result.matches, 3);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_infrastructure() {
        let interactions = MockInteractionRepository {
            fail: true,
            ..Default::default()
        };
        let handler = InteractionStatsHandler::new(
            Arc::new(interactions),
            Arc::new(MockMatchRepository::default()),
        );

        let err = handler
            .handle(InteractionStatsQuery { user_id: user("u1") })
            .await
            .unwrap_err();

        assert!(matches!(err, MatchingError::Infrastructure(_)));
    }
}
