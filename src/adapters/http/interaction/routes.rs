//! Axum router configuration for matching-engine endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    contact_lookup, discover, interaction_stats, list_matches, record_interaction,
    InteractionAppState,
};

/// Create the interaction API router.
///
/// # Routes (all require authentication)
///
/// - `POST /` - Record a swipe
/// - `GET /discover` - List discovery candidates
/// - `GET /matches` - List the caller's matches
/// - `GET /stats` - Swipe and match counters
/// - `GET /contact/:user_id` - Premium contact lookup
pub fn interaction_routes() -> Router<InteractionAppState> {
    Router::new()
        .route("/", post(record_interaction))
        .route("/discover", get(discover))
        .route("/matches", get(list_matches))
        .route("/stats", get(interaction_stats))
        .route("/contact/:user_id", get(contact_lookup))
}
