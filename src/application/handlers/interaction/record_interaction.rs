//! Records a swipe and creates a match on mutual interest.

use std::sync::Arc;

use tracing::info;

use crate::application::entitlement_gate::{EntitlementGate, DAILY_INTERACTION_LIMIT};
use crate::domain::foundation::{InteractionId, UserId};
use crate::domain::matching::{CanonicalPair, InteractionRecord, MatchingError, SwipeAction};
use crate::ports::{InsertOutcome, InteractionRepository, MatchRepository, ProfileDirectory};

/// Command to record one user swiping on another.
#[derive(Debug, Clone)]
pub struct RecordInteractionCommand {
    pub swiper_user_id: UserId,
    pub swiped_user_id: UserId,
    pub action: SwipeAction,
}

/// Result of recording an interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInteractionResult {
    pub interaction_id: InteractionId,

    /// True when this swipe completed a mutual-interest match.
    pub match_created: bool,

    /// Swipes left in the window after this one. `None` means unlimited.
    pub remaining: Option<u32>,

    pub is_premium: bool,
}

/// Handler for recording interactions.
pub struct RecordInteractionHandler {
    interactions: Arc<dyn InteractionRepository>,
    matches: Arc<dyn MatchRepository>,
    profiles: Arc<dyn ProfileDirectory>,
    gate: Arc<EntitlementGate>,
}

impl RecordInteractionHandler {
    pub fn new(
        interactions: Arc<dyn InteractionRepository>,
        matches: Arc<dyn MatchRepository>,
        profiles: Arc<dyn ProfileDirectory>,
        gate: Arc<EntitlementGate>,
    ) -> Self {
        Self {
            interactions,
            matches,
            profiles,
            gate,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordInteractionCommand,
    ) -> Result<RecordInteractionResult, MatchingError> {
        // 1. Build the record; self-swipes are rejected here.
        let record = InteractionRecord::new(
            cmd.swiper_user_id.clone(),
            cmd.swiped_user_id.clone(),
            cmd.action,
        )?;

        // 2. Enforce the sliding-window allowance. Premium is unlimited.
        let allowance = self.gate.check_allowance(&cmd.swiper_user_id).await?;
        if !allowance.allowed {
            return Err(MatchingError::rate_limited(DAILY_INTERACTION_LIMIT));
        }

        // 3. Resolve both profiles concurrently.
        let (swiper, swiped) = tokio::try_join!(
            self.profiles.resolve(&cmd.swiper_user_id),
            self.profiles.resolve(&cmd.swiped_user_id)
        )?;
        let swiper =
            swiper.ok_or_else(|| MatchingError::profile_not_found(cmd.swiper_user_id.clone()))?;
        let swiped =
            swiped.ok_or_else(|| MatchingError::profile_not_found(cmd.swiped_user_id.clone()))?;

        // 4. Both sides must belong to the same sport when both declare one.
        if let (Some(a), Some(b)) = (&swiper.sport_id, &swiped.sport_id) {
            if a != b {
                return Err(MatchingError::sport_mismatch(a.to_string(), b.to_string()));
            }
        }

        // 5. Insert. The ordered-pair unique index decides duplicates.
        match self.interactions.insert(&record).await? {
            InsertOutcome::Inserted => {}
            InsertOutcome::Duplicate => {
                return Err(MatchingError::duplicate_interaction(
                    cmd.swiper_user_id.clone(),
                    cmd.swiped_user_id.clone(),
                ));
            }
        }

        // 6. Mutual interest creates the match. create_if_absent returns
        //    the stored row either way, so a concurrent mutual swipe
        //    yields one row and both swipers see the match.
        let mut match_created = false;
        if record.is_interest()
            && self
                .interactions
                .reverse_interest_exists(&cmd.swiper_user_id, &cmd.swiped_user_id)
                .await?
        {
            let pair =
                CanonicalPair::new(cmd.swiper_user_id.clone(), cmd.swiped_user_id.clone())?;
            self.matches.create_if_absent(&pair, record.created_at).await?;
            match_created = true;
        }

        info!(
            swiper = %cmd.swiper_user_id,
            swiped = %cmd.swiped_user_id,
            action = %cmd.action,
            match_created,
            "Recorded interaction"
        );

        // 7. Report the allowance left after this swipe.
        Ok(RecordInteractionResult {
            interaction_id: record.id,
            match_created,
            remaining: allowance.remaining.map(|r| r.saturating_sub(1)),
            is_premium: allowance.is_premium,
        })
    }
}
