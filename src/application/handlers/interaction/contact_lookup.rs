//! Reveals a user's contact details to premium subscribers.

use std::sync::Arc;

use crate::application::entitlement_gate::EntitlementGate;
use crate::domain::foundation::UserId;
use crate::domain::matching::{ContactCard, MatchingError};
use crate::ports::ProfileDirectory;

/// Query for another user's contact details.
#[derive(Debug, Clone)]
pub struct ContactLookupQuery {
    pub requester: UserId,
    pub subject: UserId,
}

/// The subject's contact card.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactLookupResult {
    pub contact: ContactCard,
}

/// Handler for premium contact lookup.
pub struct ContactLookupHandler {
    profiles: Arc<dyn ProfileDirectory>,
    gate: Arc<EntitlementGate>,
}

impl ContactLookupHandler {
    pub fn new(profiles: Arc<dyn ProfileDirectory>, gate: Arc<EntitlementGate>) -> Self {
        Self { profiles, gate }
    }

    pub async fn handle(
        &self,
        query: ContactLookupQuery,
    ) -> Result<ContactLookupResult, MatchingError> {
        // 1. Contact details are premium-only.
        self.gate
            .require_premium(&query.requester, "contact_details")
            .await?;

        // 2. Look up the subject.
        let contact = self
            .profiles
            .contact_card(&query.subject)
            .await?
            .ok_or_else(|| MatchingError::profile_not_found(query.subject.clone()))?;

        Ok(ContactLookupResult { contact })
    }
}
