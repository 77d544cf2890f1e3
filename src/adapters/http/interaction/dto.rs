//! Request/response DTOs for the matching-engine endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::interaction::{
    InteractionStatsResult, MatchedProfile, RecordInteractionResult,
};
use crate::domain::matching::{ContactCard, ProfileSummary};

/// POST /api/interactions request body.
#[derive(Debug, Deserialize)]
pub struct RecordInteractionRequest {
    pub swiped_user_id: String,
    pub action: String,
}

/// POST /api/interactions response body.
#[derive(Debug, Serialize)]
pub struct RecordInteractionResponse {
    pub interaction_id: String,

    pub match_created: bool,

    /// Swipes left in the current window. `null` means unlimited.
    pub remaining: Option<u32>,

    pub is_premium: bool,
}

impl From<RecordInteractionResult> for RecordInteractionResponse {
    fn from(result: RecordInteractionResult) -> Self {
        Self {
            interaction_id: result.interaction_id.to_string(),
            match_created: result.match_created,
            remaining: result.remaining,
            is_premium: result.is_premium,
        }
    }
}

/// GET /api/interactions/discover query parameters.
#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    /// Premium-only narrowing to a single profile kind.
    #[serde(default)]
    pub profile_type: Option<String>,

    #[serde(default)]
    pub limit: Option<u32>,
}

/// One profile card in discovery and match listings.
#[derive(Debug, Serialize)]
pub struct ProfileSummaryResponse {
    pub user_id: String,
    pub profile_type: String,
    pub display_name: String,
    pub sport_id: Option<String>,
    pub location: Option<String>,
}

impl From<ProfileSummary> for ProfileSummaryResponse {
    fn from(profile: ProfileSummary) -> Self {
        Self {
            user_id: profile.user_id.to_string(),
            profile_type: profile.profile_type.as_str().to_string(),
            display_name: profile.display_name,
            sport_id: profile.sport_id.map(|s| s.to_string()),
            location: profile.location,
        }
    }
}

/// GET /api/interactions/discover response body.
#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub candidates: Vec<ProfileSummaryResponse>,
}

/// One entry in the match listing.
#[derive(Debug, Serialize)]
pub struct MatchedProfileResponse {
    pub match_id: String,
    pub matched_at: String,
    pub profile: ProfileSummaryResponse,
}

impl From<MatchedProfile> for MatchedProfileResponse {
    fn from(matched: MatchedProfile) -> Self {
        Self {
            match_id: matched.match_id.to_string(),
            matched_at: matched.matched_at.as_datetime().to_rfc3339(),
            profile: ProfileSummaryResponse::from(matched.profile),
        }
    }
}

/// GET /api/interactions/matches response body.
#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub matches: Vec<MatchedProfileResponse>,
}

/// GET /api/interactions/stats response body.
#[derive(Debug, Serialize)]
pub struct InteractionStatsResponse {
    pub sent_interest: u64,
    pub sent_pass: u64,
    pub received_interest: u64,
    pub received_pass: u64,
    pub matches: u64,
}

impl From<InteractionStatsResult> for InteractionStatsResponse {
    fn from(result: InteractionStatsResult) -> Self {
        Self {
            sent_interest: result.stats.sent_interest,
            sent_pass: result.stats.sent_pass,
            received_interest: result.stats.received_interest,
            received_pass: result.stats.received_pass,
            matches: result.matches,
        }
    }
}

/// GET /api/interactions/contact/:user_id response body.
#[derive(Debug, Serialize)]
pub struct ContactCardResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<ContactCard> for ContactCardResponse {
    fn from(card: ContactCard) -> Self {
        Self {
            user_id: card.user_id.to_string(),
            display_name: card.display_name,
            email: card.email,
            phone: card.phone,
        }
    }
}
