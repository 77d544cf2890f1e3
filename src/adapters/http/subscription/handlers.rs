//! HTTP handlers for subscription endpoints.
//!
//! The webhook handler verifies the provider signature against the raw
//! request body before any JSON parsing. A valid-but-stale event is
//! acknowledged with 200 so the provider stops redelivering it.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::warn;

use crate::application::handlers::subscription::{
    ApplyPaymentEventCommand, ApplyPaymentEventHandler, CancelSubscriptionCommand,
    CancelSubscriptionHandler, CreateCheckoutCommand, CreateCheckoutHandler,
    SubscriptionStatusHandler, SubscriptionStatusQuery, SweepExpiredHandler,
};
use crate::domain::foundation::PlanId;
use crate::domain::subscription::{PaymentWebhookVerifier, SubscriptionError};
use crate::ports::{PaymentGateway, PlanRepository, SubscriptionRepository};

use super::super::auth::AuthenticatedUser;
use super::super::error::ErrorResponse;
use super::dto::{
    CancelResponse, CheckoutResponse, CreateCheckoutRequest, SubscriptionStatusResponse,
    SubscriptionView, SweepExpiredResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub webhook_verifier: Arc<PaymentWebhookVerifier>,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
}

impl SubscriptionAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(
            self.subscriptions.clone(),
            self.plans.clone(),
            self.gateway.clone(),
            self.checkout_success_url.clone(),
            self.checkout_cancel_url.clone(),
        )
    }

    pub fn cancel_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.subscriptions.clone(), self.gateway.clone())
    }

    pub fn status_handler(&self) -> SubscriptionStatusHandler {
        SubscriptionStatusHandler::new(self.subscriptions.clone())
    }

    pub fn sweep_handler(&self) -> SweepExpiredHandler {
        SweepExpiredHandler::new(self.subscriptions.clone())
    }

    pub fn payment_event_handler(&self) -> ApplyPaymentEventHandler {
        ApplyPaymentEventHandler::new(self.subscriptions.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/subscriptions/checkout - Start the checkout flow
pub async fn create_checkout(
    State(state): State<SubscriptionAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let plan_id = PlanId::from_str(&request.plan_id)
        .map_err(|_| SubscriptionError::validation("plan_id", "not a valid plan id"))?;

    let handler = state.create_checkout_handler();
    let cmd = CreateCheckoutCommand {
        user_id: user.user_id,
        plan_id,
    };

    let result = handler.handle(cmd).await?;

    let response = CheckoutResponse {
        subscription_id: result.subscription_id.to_string(),
        checkout_url: result.checkout_url,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/subscriptions/cancel - Cancel the caller's subscription
pub async fn cancel_subscription(
    State(state): State<SubscriptionAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let handler = state.cancel_handler();
    let cmd = CancelSubscriptionCommand {
        user_id: user.user_id,
    };

    let result = handler.handle(cmd).await?;

    let response = CancelResponse {
        subscription: SubscriptionView::from(result.subscription),
    };
    Ok(Json(response))
}

/// GET /api/subscriptions/status - The caller's latest subscription
pub async fn subscription_status(
    State(state): State<SubscriptionAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let handler = state.status_handler();
    let query = SubscriptionStatusQuery {
        user_id: user.user_id,
    };

    let result = handler.handle(query).await?;

    let response = SubscriptionStatusResponse {
        subscription: result.subscription.map(SubscriptionView::from),
        is_premium: result.is_premium,
    };
    Ok(Json(response))
}

/// POST /api/subscriptions/sweep-expired - Expire every lapsed subscription
pub async fn sweep_expired(
    State(state): State<SubscriptionAppState>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let handler = state.sweep_handler();
    let result = handler.handle().await?;
    Ok(Json(SweepExpiredResponse::from(result)))
}

/// POST /api/webhooks/payment - Handle payment provider webhook events
///
/// Signature verification runs against the raw body. Once the event is
/// authenticated it is always acknowledged with 200 unless persistence
/// itself fails, so the provider retries only what might still apply.
pub async fn handle_payment_webhook(
    State(state): State<SubscriptionAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let signature = match headers.get("Stripe-Signature").and_then(|v| v.to_str().ok()) {
        Some(signature) => signature,
        None => {
            warn!("Webhook rejected: missing signature header");
            let error = ErrorResponse::new("WEBHOOK_REJECTED", "Missing Stripe-Signature header");
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    let event = match state.webhook_verifier.verify_and_parse(&body, signature) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "Webhook rejected");
            let error = ErrorResponse::new("WEBHOOK_REJECTED", err.to_string());
            return (err.status_code(), Json(error)).into_response();
        }
    };

    let handler = state.payment_event_handler();
    let cmd = ApplyPaymentEventCommand {
        event: event.classify(),
    };

    match handler.handle(cmd).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(err) => SubscriptionApiError::from(err).into_response(),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
pub struct SubscriptionApiError(SubscriptionError);

impl From<SubscriptionError> for SubscriptionApiError {
    fn from(err: SubscriptionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for SubscriptionApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            SubscriptionError::NotFound(_) | SubscriptionError::NotFoundForUser(_) => {
                (StatusCode::NOT_FOUND, "SUBSCRIPTION_NOT_FOUND")
            }
            SubscriptionError::PlanNotFound(_) => (StatusCode::NOT_FOUND, "PLAN_NOT_FOUND"),
            SubscriptionError::AlreadyExists(_) => (StatusCode::CONFLICT, "DUPLICATE_SUBSCRIPTION"),
            SubscriptionError::StaleTransition { .. } => {
                (StatusCode::CONFLICT, "STALE_TRANSITION")
            }
            SubscriptionError::InvalidState { .. } => {
                (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION")
            }
            SubscriptionError::CheckoutFailed { .. } => {
                (StatusCode::BAD_GATEWAY, "PAYMENT_PROVIDER_ERROR")
            }
            SubscriptionError::ValidationFailed { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            SubscriptionError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(error_code, self.0.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{
        user, MockPaymentGateway, MockPlanRepository, MockSubscriptionRepository,
    };
    use crate::domain::foundation::{SubscriptionId, UserId};
    use crate::domain::subscription::{compute_test_signature, Plan};

    const TEST_SECRET: &str = "whsec_test_secret";

    fn test_state(
        subscriptions: MockSubscriptionRepository,
        plans: Vec<Plan>,
    ) -> SubscriptionAppState {
        SubscriptionAppState {
            subscriptions: Arc::new(subscriptions),
            plans: Arc::new(MockPlanRepository {
                plans,
                ..Default::default()
            }),
            gateway: Arc::new(MockPaymentGateway::with_session()),
            webhook_verifier: Arc::new(PaymentWebhookVerifier::new(TEST_SECRET)),
            checkout_success_url: "https://app.example.com/ok".to_string(),
            checkout_cancel_url: "https://app.example.com/no".to_string(),
        }
    }

    fn signed_webhook(payload: &str) -> (axum::http::HeaderMap, axum::body::Bytes) {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, payload);
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            "Stripe-Signature",
            format!("t={},v1={}", timestamp, signature).parse().unwrap(),
        );
        (headers, axum::body::Bytes::from(payload.to_string()))
    }

    #[tokio::test]
    async fn checkout_returns_created_with_url() {
        let plan = Plan::new(crate::domain::foundation::PlanId::new(), "Premium", 999).unwrap();
        let plan_id = plan.id;
        let state = test_state(MockSubscriptionRepository::default(), vec![plan]);

        let response = create_checkout(
            State(state),
            AuthenticatedUser {
                user_id: user("user-1"),
            },
            Json(CreateCheckoutRequest {
                plan_id: plan_id.to_string(),
            }),
        )
        .await
        .map(IntoResponse::into_response)
        .unwrap_or_else(IntoResponse::into_response);

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn checkout_rejects_malformed_plan_id() {
        let state = test_state(MockSubscriptionRepository::default(), vec![]);

        let response = create_checkout(
            State(state),
            AuthenticatedUser {
                user_id: user("user-1"),
            },
            Json(CreateCheckoutRequest {
                plan_id: "not-a-uuid".to_string(),
            }),
        )
        .await
        .map(IntoResponse::into_response)
        .unwrap_or_else(IntoResponse::into_response);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_without_subscription_returns_ok() {
        let state = test_state(MockSubscriptionRepository::default(), vec![]);

        let response = subscription_status(
            State(state),
            AuthenticatedUser {
                user_id: user("user-1"),
            },
        )
        .await
        .map(IntoResponse::into_response)
        .unwrap_or_else(IntoResponse::into_response);

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_unauthorized() {
        let state = test_state(MockSubscriptionRepository::default(), vec![]);
        let payload = r#"{"id":"evt_1","type":"invoice.payment_succeeded","data":{"object":{}}}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            "Stripe-Signature",
            format!("t={},v1={}", timestamp, "a".repeat(64))
                .parse()
                .unwrap(),
        );

        let response = handle_payment_webhook(
            State(state),
            headers,
            axum::body::Bytes::from(payload),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_without_signature_header_is_bad_request() {
        let state = test_state(MockSubscriptionRepository::default(), vec![]);

        let response = handle_payment_webhook(
            State(state),
            axum::http::HeaderMap::new(),
            axum::body::Bytes::from_static(b"{}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn authenticated_unrecognized_event_is_acknowledged() {
        let state = test_state(MockSubscriptionRepository::default(), vec![]);
        let payload = serde_json::json!({
            "id": "evt_2",
            "type": "customer.updated",
            "data": { "object": { "id": "cus_1" } }
        })
        .to_string();
        let (headers, body) = signed_webhook(&payload);

        let response = handle_payment_webhook(State(state), headers, body).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn plan_not_found_maps_to_not_found() {
        let err = SubscriptionError::plan_not_found(crate::domain::foundation::PlanId::new());
        let response = SubscriptionApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn already_exists_maps_to_conflict() {
        let err = SubscriptionError::already_exists(UserId::new("user-1").unwrap());
        let response = SubscriptionApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn checkout_failed_maps_to_bad_gateway() {
        let err = SubscriptionError::checkout_failed("provider down");
        let response = SubscriptionApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn not_found_maps_to_not_found() {
        let err = SubscriptionError::not_found(SubscriptionId::new());
        let response = SubscriptionApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
