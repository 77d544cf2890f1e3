//! In-memory port implementations shared by handler tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::matching::{
    ContactCard, InteractionRecord, InteractionStats, MatchRecord, MatchState, ProfileSummary,
    ProfileType,
};
use crate::domain::matching::CanonicalPair;
use crate::domain::subscription::{Plan, Subscription, SubscriptionError, SubscriptionStatus};
use crate::ports::{
    CheckoutRequest, CheckoutSession, GatewayError, InsertOutcome, InteractionRepository,
    MatchRepository, PaymentGateway, PlanRepository, ProfileDirectory, SubscriptionChange,
    SubscriptionRepository, TransitionOutcome,
};
use crate::ports::EndDateChange;

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn store_unavailable() -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, "store unavailable")
}

#[derive(Default)]
pub struct MockInteractionRepository {
    pub inserted: Mutex<Vec<InteractionRecord>>,
    pub insert_outcome: Option<InsertOutcome>,
    pub reverse_interest: bool,
    pub recent_count: u64,
    pub swiped: Vec<UserId>,
    pub stats: InteractionStats,
    pub fail: bool,
}

#[async_trait]
impl InteractionRepository for MockInteractionRepository {
    async fn insert(&self, record: &InteractionRecord) -> Result<InsertOutcome, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        self.inserted.lock().unwrap().push(record.clone());
        Ok(self.insert_outcome.unwrap_or(InsertOutcome::Inserted))
    }

    async fn reverse_interest_exists(
        &self,
        _swiper: &UserId,
        _swiped: &UserId,
    ) -> Result<bool, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        Ok(self.reverse_interest)
    }

    async fn count_since_by_swiper(
        &self,
        _swiper: &UserId,
        _since: Timestamp,
    ) -> Result<u64, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        Ok(self.recent_count)
    }

    async fn swiped_ids(&self, _swiper: &UserId) -> Result<Vec<UserId>, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        Ok(self.swiped.clone())
    }

    async fn stats_for_user(&self, _user: &UserId) -> Result<InteractionStats, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        Ok(self.stats)
    }
}

#[derive(Default)]
pub struct MockMatchRepository {
    pub created: Mutex<Vec<MatchRecord>>,
    pub existing: Vec<MatchRecord>,
    pub match_count: u64,
    pub fail: bool,
}

#[async_trait]
impl MatchRepository for MockMatchRepository {
    async fn create_if_absent(
        &self,
        pair: &CanonicalPair,
        created_at: Timestamp,
    ) -> Result<MatchRecord, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        if let Some(existing) = self.existing.iter().find(|m| &m.pair == pair) {
            return Ok(existing.clone());
        }
        let record = MatchRecord::new(pair.clone(), created_at);
        self.created.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_active_for_user(&self, user: &UserId) -> Result<Vec<MatchRecord>, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        Ok(self
            .existing
            .iter()
            .filter(|m| m.state == MatchState::Active && m.involves(user))
            .cloned()
            .collect())
    }

    async fn count_for_user(&self, _user: &UserId) -> Result<u64, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        Ok(self.match_count)
    }
}

#[derive(Default)]
pub struct MockSubscriptionRepository {
    pub subscriptions: Mutex<Vec<Subscription>>,
    pub inserted: Mutex<Vec<Subscription>>,
    pub deleted: Mutex<Vec<SubscriptionId>>,
    pub attached: Mutex<Vec<(SubscriptionId, String)>>,
    pub transitions: Mutex<Vec<SubscriptionChange>>,
    pub fail: bool,
}

impl MockSubscriptionRepository {
    pub fn with_subscription(subscription: Subscription) -> Self {
        let repo = Self::default();
        repo.subscriptions.lock().unwrap().push(subscription);
        repo
    }

    fn unavailable() -> SubscriptionError {
        SubscriptionError::infrastructure("subscription store unavailable")
    }

    fn apply_change(subscription: &mut Subscription, change: &SubscriptionChange) {
        subscription.status = change.status;
        match change.end_date {
            EndDateChange::Keep => {}
            EndDateChange::ExtendTo(target) => {
                subscription.end_date = subscription.end_date.max(target);
            }
            EndDateChange::ClampTo(target) => {
                if subscription.end_date > target {
                    subscription.end_date = target;
                }
            }
        }
        if let Some(sub_ref) = &change.provider_subscription_ref {
            subscription.provider_subscription_ref = Some(sub_ref.clone());
        }
        if let Some(cust_ref) = &change.provider_customer_ref {
            subscription.provider_customer_ref = Some(cust_ref.clone());
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<(), SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if subscriptions
            .iter()
            .any(|s| s.user_id == subscription.user_id && s.is_open())
        {
            return Err(SubscriptionError::already_exists(
                subscription.user_id.clone(),
            ));
        }
        subscriptions.push(subscription.clone());
        self.inserted.lock().unwrap().push(subscription.clone());
        Ok(())
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<(), SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let before = subscriptions.len();
        subscriptions.retain(|s| &s.id != id);
        if subscriptions.len() == before {
            return Err(SubscriptionError::not_found(id.clone()));
        }
        self.deleted.lock().unwrap().push(id.clone());
        Ok(())
    }

    async fn attach_session_ref(
        &self,
        id: &SubscriptionId,
        session_ref: &str,
    ) -> Result<(), SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let subscription = subscriptions
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| SubscriptionError::not_found(id.clone()))?;
        subscription.checkout_session_ref = Some(session_ref.to_string());
        self.attached
            .lock()
            .unwrap()
            .push((id.clone(), session_ref.to_string()));
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.id == id)
            .cloned())
    }

    async fn find_open_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| &s.user_id == user_id && s.is_open())
            .cloned())
    }

    async fn find_latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| &s.user_id == user_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn find_by_session_ref(
        &self,
        session_ref: &str,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.checkout_session_ref.as_deref() == Some(session_ref))
            .cloned())
    }

    async fn find_by_provider_ref(
        &self,
        provider_ref: &str,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.provider_subscription_ref.as_deref() == Some(provider_ref))
            .cloned())
    }

    async fn transition(
        &self,
        id: &SubscriptionId,
        expected: &[SubscriptionStatus],
        change: SubscriptionChange,
    ) -> Result<TransitionOutcome, SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let Some(index) = subscriptions.iter().position(|s| &s.id == id) else {
            return Ok(TransitionOutcome::Stale);
        };
        if !expected.contains(&subscriptions[index].status) {
            return Ok(TransitionOutcome::Stale);
        }
        // One open subscription per user, as the store's partial unique
        // index enforces. Reopening a row next to a newer open one is
        // reported as stale, matching the adapter's mapping.
        if change.status.is_open() {
            let user_id = subscriptions[index].user_id.clone();
            let conflict = subscriptions
                .iter()
                .any(|s| s.user_id == user_id && &s.id != id && s.is_open());
            if conflict {
                return Ok(TransitionOutcome::Stale);
            }
        }
        let subscription = &mut subscriptions[index];
        Self::apply_change(subscription, &change);
        self.transitions.lock().unwrap().push(change);
        Ok(TransitionOutcome::Applied(subscription.clone()))
    }

    async fn mark_all_expired(&self, now: Timestamp) -> Result<u64, SubscriptionError> {
        if self.fail {
            return Err(Self::unavailable());
        }
        let mut count = 0;
        for subscription in self.subscriptions.lock().unwrap().iter_mut() {
            if subscription.is_lapsed(now) {
                subscription.status = SubscriptionStatus::Expired;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[derive(Default)]
pub struct MockPlanRepository {
    pub plans: Vec<Plan>,
    pub fail: bool,
}

#[async_trait]
impl PlanRepository for MockPlanRepository {
    async fn find_by_id(
        &self,
        id: &crate::domain::foundation::PlanId,
    ) -> Result<Option<Plan>, SubscriptionError> {
        if self.fail {
            return Err(SubscriptionError::infrastructure("plan store unavailable"));
        }
        Ok(self.plans.iter().find(|p| &p.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Plan>, SubscriptionError> {
        if self.fail {
            return Err(SubscriptionError::infrastructure("plan store unavailable"));
        }
        Ok(self.plans.clone())
    }
}

#[derive(Default)]
pub struct MockProfileDirectory {
    pub profiles: Vec<ProfileSummary>,
    pub contacts: Vec<ContactCard>,
    pub candidates: Vec<ProfileSummary>,
    pub fail: bool,
}

#[async_trait]
impl ProfileDirectory for MockProfileDirectory {
    async fn resolve(&self, user: &UserId) -> Result<Option<ProfileSummary>, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        Ok(self.profiles.iter().find(|p| &p.user_id == user).cloned())
    }

    async fn contact_card(&self, user: &UserId) -> Result<Option<ContactCard>, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        Ok(self.contacts.iter().find(|c| &c.user_id == user).cloned())
    }

    async fn list_candidates(
        &self,
        kinds: &[ProfileType],
        exclude: &[UserId],
        limit: u32,
    ) -> Result<Vec<ProfileSummary>, DomainError> {
        if self.fail {
            return Err(store_unavailable());
        }
        Ok(self
            .candidates
            .iter()
            .filter(|p| kinds.contains(&p.profile_type) && !exclude.contains(&p.user_id))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MockPaymentGateway {
    pub checkout_requests: Mutex<Vec<CheckoutRequest>>,
    pub cancelled: Mutex<Vec<String>>,
    pub session: Option<CheckoutSession>,
    pub fail_cancel: bool,
}

impl MockPaymentGateway {
    pub fn with_session() -> Self {
        Self {
            session: Some(CheckoutSession {
                id: "cs_test_123".to_string(),
                url: "https://pay.example.com/cs_test_123".to_string(),
                expires_at: 1735689600,
            }),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        self.checkout_requests.lock().unwrap().push(request);
        self.session
            .clone()
            .ok_or_else(|| GatewayError::provider("checkout session rejected"))
    }

    async fn cancel_subscription(&self, subscription_ref: &str) -> Result<(), GatewayError> {
        if self.fail_cancel {
            return Err(GatewayError::network("provider unreachable"));
        }
        self.cancelled
            .lock()
            .unwrap()
            .push(subscription_ref.to_string());
        Ok(())
    }
}
