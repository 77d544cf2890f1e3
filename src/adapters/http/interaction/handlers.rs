//! HTTP handlers for matching-engine endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::interaction::discover::DEFAULT_DISCOVER_LIMIT;
use crate::application::handlers::interaction::{
    ContactLookupHandler, ContactLookupQuery, DiscoverHandler, DiscoverQuery,
    InteractionStatsHandler, InteractionStatsQuery, ListMatchesHandler, ListMatchesQuery,
    RecordInteractionCommand, RecordInteractionHandler,
};
use crate::application::EntitlementGate;
use crate::domain::foundation::UserId;
use crate::domain::matching::{MatchingError, ProfileType, SwipeAction};
use crate::ports::{InteractionRepository, MatchRepository, ProfileDirectory};

use super::super::auth::AuthenticatedUser;
use super::super::error::ErrorResponse;
use super::dto::{
    ContactCardResponse, DiscoverParams, DiscoverResponse, InteractionStatsResponse,
    MatchedProfileResponse, MatchesResponse, RecordInteractionRequest, RecordInteractionResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped
/// dependencies for efficient sharing across handlers.
#[derive(Clone)]
pub struct InteractionAppState {
    pub interactions: Arc<dyn InteractionRepository>,
    pub matches: Arc<dyn MatchRepository>,
    pub profiles: Arc<dyn ProfileDirectory>,
    pub gate: Arc<EntitlementGate>,
}

impl InteractionAppState {
    /// Create handlers on demand from the shared state.
    pub fn record_interaction_handler(&self) -> RecordInteractionHandler {
        RecordInteractionHandler::new(
            self.interactions.clone(),
            self.matches.clone(),
            self.profiles.clone(),
            self.gate.clone(),
        )
    }

    pub fn discover_handler(&self) -> DiscoverHandler {
        DiscoverHandler::new(
            self.interactions.clone(),
            self.profiles.clone(),
            self.gate.clone(),
        )
    }

    pub fn list_matches_handler(&self) -> ListMatchesHandler {
        ListMatchesHandler::new(self.matches.clone(), self.profiles.clone())
    }

    pub fn stats_handler(&self) -> InteractionStatsHandler {
        InteractionStatsHandler::new(self.interactions.clone(), self.matches.clone())
    }

    pub fn contact_lookup_handler(&self) -> ContactLookupHandler {
        ContactLookupHandler::new(self.profiles.clone(), self.gate.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/interactions - Record a swipe
pub async fn record_interaction(
    State(state): State<InteractionAppState>,
    user: AuthenticatedUser,
    Json(request): Json<RecordInteractionRequest>,
) -> Result<impl IntoResponse, MatchingApiError> {
    let swiped_user_id = UserId::new(&request.swiped_user_id)
        .map_err(|e| MatchingError::validation("swiped_user_id", e.to_string()))?;
    let action = SwipeAction::from_str(&request.action)?;

    let handler = state.record_interaction_handler();
    let cmd = RecordInteractionCommand {
        swiper_user_id: user.user_id,
        swiped_user_id,
        action,
    };

    let result = handler.handle(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordInteractionResponse::from(result)),
    ))
}

/// GET /api/interactions/discover - List discovery candidates
pub async fn discover(
    State(state): State<InteractionAppState>,
    user: AuthenticatedUser,
    Query(params): Query<DiscoverParams>,
) -> Result<impl IntoResponse, MatchingApiError> {
    let kind_filter = params
        .profile_type
        .as_deref()
        .map(ProfileType::from_str)
        .transpose()?;

    let handler = state.discover_handler();
    let query = DiscoverQuery {
        user_id: user.user_id,
        kind_filter,
        limit: params.limit.unwrap_or(DEFAULT_DISCOVER_LIMIT),
    };

    let result = handler.handle(query).await?;

    let response = DiscoverResponse {
        candidates: result.candidates.into_iter().map(Into::into).collect(),
    };
    Ok(Json(response))
}

/// GET /api/interactions/matches - List the caller's matches
pub async fn list_matches(
    State(state): State<InteractionAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, MatchingApiError> {
    let handler = state.list_matches_handler();
    let query = ListMatchesQuery {
        user_id: user.user_id,
    };

    let result = handler.handle(query).await?;

    let response = MatchesResponse {
        matches: result
            .matches
            .into_iter()
            .map(MatchedProfileResponse::from)
            .collect(),
    };
    Ok(Json(response))
}

/// GET /api/interactions/stats - Swipe and match counters
pub async fn interaction_stats(
    State(state): State<InteractionAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, MatchingApiError> {
    let handler = state.stats_handler();
    let query = InteractionStatsQuery {
        user_id: user.user_id,
    };

    let result = handler.handle(query).await?;

    Ok(Json(InteractionStatsResponse::from(result)))
}

/// GET /api/interactions/contact/:user_id - Premium contact lookup
pub async fn contact_lookup(
    State(state): State<InteractionAppState>,
    user: AuthenticatedUser,
    Path(subject): Path<String>,
) -> Result<impl IntoResponse, MatchingApiError> {
    let subject =
        UserId::new(&subject).map_err(|e| MatchingError::validation("user_id", e.to_string()))?;

    let handler = state.contact_lookup_handler();
    let query = ContactLookupQuery {
        requester: user.user_id,
        subject,
    };

    let result = handler.handle(query).await?;

    Ok(Json(ContactCardResponse::from(result.contact)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
pub struct MatchingApiError(MatchingError);

impl From<MatchingError> for MatchingApiError {
    fn from(err: MatchingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for MatchingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            MatchingError::SelfInteraction(_) => (StatusCode::BAD_REQUEST, "SELF_INTERACTION"),
            MatchingError::InvalidAction(_) => (StatusCode::BAD_REQUEST, "INVALID_ACTION"),
            MatchingError::SportMismatch { .. } => (StatusCode::BAD_REQUEST, "SPORT_MISMATCH"),
            MatchingError::DuplicateInteraction { .. } => {
                (StatusCode::CONFLICT, "DUPLICATE_INTERACTION")
            }
            MatchingError::RateLimited { .. } => (StatusCode::FORBIDDEN, "RATE_LIMITED"),
            MatchingError::PremiumRequired { .. } => (StatusCode::FORBIDDEN, "PREMIUM_REQUIRED"),
            MatchingError::ProfileNotFound(_) => (StatusCode::NOT_FOUND, "PROFILE_NOT_FOUND"),
            MatchingError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            MatchingError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(error_code, self.0.message());
        (status, Json(body)).into_response()
    }
}
