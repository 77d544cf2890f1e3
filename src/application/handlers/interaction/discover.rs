//! Lists discovery candidates for a user's feed.

use std::sync::Arc;

use crate::application::entitlement_gate::EntitlementGate;
use crate::domain::foundation::UserId;
use crate::domain::matching::{MatchingError, ProfileSummary, ProfileType};
use crate::ports::{InteractionRepository, ProfileDirectory};

/// Most candidates returned in one page.
pub const MAX_DISCOVER_LIMIT: u32 = 50;

/// Default page size when the caller does not ask for one.
pub const DEFAULT_DISCOVER_LIMIT: u32 = 20;

/// Query for a user's discovery feed.
#[derive(Debug, Clone)]
pub struct DiscoverQuery {
    pub user_id: UserId,

    /// Premium-only narrowing to a single profile kind.
    pub kind_filter: Option<ProfileType>,

    pub limit: u32,
}

/// Candidates for the user's feed.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverResult {
    pub candidates: Vec<ProfileSummary>,
}

/// Handler for the discovery feed.
pub struct DiscoverHandler {
    interactions: Arc<dyn InteractionRepository>,
    profiles: Arc<dyn ProfileDirectory>,
    gate: Arc<EntitlementGate>,
}

impl DiscoverHandler {
    pub fn new(
        interactions: Arc<dyn InteractionRepository>,
        profiles: Arc<dyn ProfileDirectory>,
        gate: Arc<EntitlementGate>,
    ) -> Self {
        Self {
            interactions,
            profiles,
            gate,
        }
    }

    pub async fn handle(&self, query: DiscoverQuery) -> Result<DiscoverResult, MatchingError> {
        // 1. The caller must have a profile; its kind fixes the targets.
        let caller = self
            .profiles
            .resolve(&query.user_id)
            .await?
            .ok_or_else(|| MatchingError::profile_not_found(query.user_id.clone()))?;
        let targets = caller.profile_type.discover_targets();

        // 2. Narrowing to one kind is a premium feature, and the kind
        //    must be one the caller could see anyway.
        let kinds: Vec<ProfileType> = match query.kind_filter {
            Some(kind) => {
                self.gate
                    .require_premium(&query.user_id, "discover_filter")
                    .await?;
                if !caller.profile_type.can_discover(kind) {
                    return Err(MatchingError::validation(
                        "kind",
                        format!("{} profiles cannot discover {}", caller.profile_type, kind),
                    ));
                }
                vec![kind]
            }
            None => targets.to_vec(),
        };

        // 3. Hide the caller and everyone they already swiped on.
        let mut exclude = self.interactions.swiped_ids(&query.user_id).await?;
        exclude.push(query.user_id.clone());

        let limit = query.limit.clamp(1, MAX_DISCOVER_LIMIT);
        let candidates = self
            .profiles
            .list_candidates(&kinds, &exclude, limit)
            .await?;

        Ok(DiscoverResult { candidates })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{
        user, MockInteractionRepository, MockProfileDirectory, MockSubscriptionRepository,
    };
    use crate::domain::foundation::{PlanId, SubscriptionId, Timestamp};
    use crate::domain::subscription::Subscription;

    fn summary(user_id: &UserId, profile_type: ProfileType) -> ProfileSummary {
        ProfileSummary {
            user_id: user_id.clone(),
            profile_type,
            display_name: user_id.to_string(),
            sport_id: None,
            location: None,
        }
    }

    fn handler(
        interactions: MockInteractionRepository,
        profiles: MockProfileDirectory,
        subscriptions: MockSubscriptionRepository,
    ) -> DiscoverHandler {
        let interactions = Arc::new(interactions);
        let subscriptions = Arc::new(subscriptions);
        let gate = Arc::new(EntitlementGate::new(interactions.clone(), subscriptions));
        DiscoverHandler::new(interactions, Arc::new(profiles), gate)
    }

    fn query(user_id: &UserId) -> DiscoverQuery {
        DiscoverQuery {
            user_id: user_id.clone(),
            kind_filter: None,
            limit: DEFAULT_DISCOVER_LIMIT,
        }
    }

    #[tokio::test]
    async fn athlete_sees_teams_and_agents() {
        let athlete = user("athlete-1");
        let profiles = MockProfileDirectory {
            profiles: vec![summary(&athlete, ProfileType::Athlete)],
            candidates: vec![
                summary(&user("team-1"), ProfileType::Team),
                summary(&user("agent-1"), ProfileType::Agent),
                summary(&user("athlete-2"), ProfileType::Athlete),
            ],
            ..Default::default()
        };
        let handler = handler(
            MockInteractionRepository::default(),
            profiles,
            MockSubscriptionRepository::default(),
        );

        let result = handler.handle(query(&athlete)).await.unwrap();

        let kinds: Vec<_> = result.candidates.iter().map(|c| c.profile_type).collect();
        assert!(kinds.contains(&ProfileType::Team));
        assert!(kinds.contains(&ProfileType::Agent));
        assert!(!kinds.contains(&ProfileType::Athlete));
    }

    #[tokio::test]
    async fn already_swiped_users_are_excluded() {
        let team = user("team-1");
        let seen = user("athlete-1");
        let interactions = MockInteractionRepository {
            swiped: vec![seen.clone()],
            ..Default::default()
        };
        let profiles = MockProfileDirectory {
            profiles: vec![summary(&team, ProfileType::Team)],
            candidates: vec![
                summary(&seen, ProfileType::Athlete),
                summary(&user("athlete-2"), ProfileType::Athlete),
            ],
            ..Default::default()
        };
        let handler = handler(interactions, profiles, MockSubscriptionRepository::default());

        let result = handler.handle(query(&team)).await.unwrap();

        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].user_id, user("athlete-2"));
    }

    #[tokio::test]
    async fn kind_filter_requires_premium() {
        let athlete = user("athlete-1");
        let profiles = MockProfileDirectory {
            profiles: vec![summary(&athlete, ProfileType::Athlete)],
            ..Default::default()
        };
        let handler = handler(
            MockInteractionRepository::default(),
            profiles,
            MockSubscriptionRepository::default(),
        );

        let mut q = query(&athlete);
        q.kind_filter = Some(ProfileType::Team);
        let err = handler.handle(q).await.unwrap_err();

        assert!(matches!(err, MatchingError::PremiumRequired { .. }));
    }

    #[tokio::test]
    async fn premium_user_can_narrow_to_one_kind() {
        let athlete = user("athlete-1");
        let now = Timestamp::now();
        let mut sub = Subscription::create_pending(
            SubscriptionId::new(),
            athlete.clone(),
            PlanId::new(),
            now,
        );
        sub.activate(None, None, now).unwrap();
        let profiles = MockProfileDirectory {
            profiles: vec![summary(&athlete, ProfileType::Athlete)],
            candidates: vec![
                summary(&user("team-1"), ProfileType::Team),
                summary(&user("agent-1"), ProfileType::Agent),
            ],
            ..Default::default()
        };
        let handler = handler(
            MockInteractionRepository::default(),
            profiles,
            MockSubscriptionRepository::with_subscription(sub),
        );

        let mut q = query(&athlete);
        q.kind_filter = Some(ProfileType::Team);
        let result = handler.handle(q).await.unwrap();

        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].profile_type, ProfileType::Team);
    }

    #[tokio::test]
    async fn filter_outside_discoverable_kinds_is_rejected() {
        let athlete = user("athlete-1");
        let now = Timestamp::now();
        let mut sub = Subscription::create_pending(
            SubscriptionId::new(),
            athlete.clone(),
            PlanId::new(),
            now,
        );
        sub.activate(None, None, now).unwrap();
        let profiles = MockProfileDirectory {
            profiles: vec![summary(&athlete, ProfileType::Athlete)],
            ..Default::default()
        };
        let handler = handler(
            MockInteractionRepository::default(),
            profiles,
            MockSubscriptionRepository::with_subscription(sub),
        );

        let mut q = query(&athlete);
        q.kind_filter = Some(ProfileType::Athlete);
        let err = handler.handle(q).await.unwrap_err();

        assert!(matches!(err, MatchingError::Validation { .. }));
    }

    #[tokio::test]
    async fn caller_without_profile_is_not_found() {
        let handler = handler(
            MockInteractionRepository::default(),
            MockProfileDirectory::default(),
            MockSubscriptionRepository::default(),
        );

        let err = handler.handle(query(&user("ghost"))).await.unwrap_err();
        assert!(matches!(err, MatchingError::ProfileNotFound(_)));
    }
}
