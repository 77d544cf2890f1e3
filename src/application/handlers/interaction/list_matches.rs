//! Lists a user's active matches with the counterpart's profile.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::{MatchId, Timestamp, UserId};
use crate::domain::matching::{MatchingError, ProfileSummary};
use crate::ports::{MatchRepository, ProfileDirectory};

/// Query for a user's match list.
#[derive(Debug, Clone)]
pub struct ListMatchesQuery {
    pub user_id: UserId,
}

/// One match joined with the other user's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedProfile {
    pub match_id: MatchId,
    pub matched_at: Timestamp,
    pub profile: ProfileSummary,
}

/// The user's active matches, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ListMatchesResult {
    pub matches: Vec<MatchedProfile>,
}

/// Handler for listing matches.
pub struct ListMatchesHandler {
    matches: Arc<dyn MatchRepository>,
    profiles: Arc<dyn ProfileDirectory>,
}

impl ListMatchesHandler {
    pub fn new(matches: Arc<dyn MatchRepository>, profiles: Arc<dyn ProfileDirectory>) -> Self {
        Self { matches, profiles }
    }

    pub async fn handle(&self, query: ListMatchesQuery) -> Result<ListMatchesResult, MatchingError> {
        let records = self.matches.list_active_for_user(&query.user_id).await?;

        let mut matches = Vec::with_capacity(records.len());
        for record in records {
            let Some(counterpart) = record.pair.counterpart_of(&query.user_id) else {
                continue;
            };
            // A match whose counterpart profile has been deleted is
            // hidden rather than failing the whole listing.
            match self.profiles.resolve(counterpart).await? {
                Some(profile) => matches.push(MatchedProfile {
                    match_id: record.id,
                    matched_at: record.created_at,
                    profile,
                }),
                None => {
                    warn!(match_id = %record.id, user = %counterpart, "Hiding match with missing counterpart profile");
                }
            }
        }

        Ok(ListMatchesResult { matches })
    }
}
