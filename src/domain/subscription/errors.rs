//! Subscription-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | NotFoundForUser | 404 |
//! | PlanNotFound | 404 |
//! | AlreadyExists | 409 |
//! | StaleTransition | 409 |
//! | CheckoutFailed | 502 |
//! | InvalidState | 409 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, SubscriptionId, UserId};

/// Subscription-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Subscription was not found.
    NotFound(SubscriptionId),

    /// No subscription exists for this user.
    NotFoundForUser(UserId),

    /// Referenced plan does not exist.
    PlanNotFound(PlanId),

    /// User already has an open (pending or active) subscription.
    AlreadyExists(UserId),

    /// A guarded transition lost a race; the stored status no longer
    /// matches what the caller observed.
    StaleTransition {
        attempted: String,
    },

    /// The provider refused or failed to create a checkout session.
    CheckoutFailed {
        reason: String,
    },

    /// Invalid state for the requested operation.
    InvalidState {
        current: String,
        attempted: String,
    },

    /// Validation failed.
    ValidationFailed {
        field: String,
        message: String,
    },

    /// Infrastructure error.
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn not_found(id: SubscriptionId) -> Self {
        SubscriptionError::NotFound(id)
    }

    pub fn not_found_for_user(user_id: UserId) -> Self {
        SubscriptionError::NotFoundForUser(user_id)
    }

    pub fn plan_not_found(plan_id: PlanId) -> Self {
        SubscriptionError::PlanNotFound(plan_id)
    }

    pub fn already_exists(user_id: UserId) -> Self {
        SubscriptionError::AlreadyExists(user_id)
    }

    pub fn stale_transition(attempted: impl Into<String>) -> Self {
        SubscriptionError::StaleTransition {
            attempted: attempted.into(),
        }
    }

    pub fn checkout_failed(reason: impl Into<String>) -> Self {
        SubscriptionError::CheckoutFailed {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        SubscriptionError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_) | SubscriptionError::NotFoundForUser(_) => {
                ErrorCode::SubscriptionNotFound
            }
            SubscriptionError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            SubscriptionError::AlreadyExists(_) => ErrorCode::DuplicateSubscription,
            SubscriptionError::StaleTransition { .. } => ErrorCode::StaleTransition,
            SubscriptionError::CheckoutFailed { .. } => ErrorCode::PaymentProviderError,
            SubscriptionError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::NotFound(id) => format!("Subscription not found: {}", id),
            SubscriptionError::NotFoundForUser(user_id) => {
                format!("No subscription found for user: {}", user_id)
            }
            SubscriptionError::PlanNotFound(plan_id) => format!("Plan not found: {}", plan_id),
            SubscriptionError::AlreadyExists(user_id) => {
                format!("User {} already has an open subscription", user_id)
            }
            SubscriptionError::StaleTransition { attempted } => {
                format!("Subscription changed concurrently, could not {}", attempted)
            }
            SubscriptionError::CheckoutFailed { reason } => {
                format!("Checkout session creation failed: {}", reason)
            }
            SubscriptionError::InvalidState { current, attempted } => {
                format!("Cannot {} subscription in {} state", attempted, current)
            }
            SubscriptionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SubscriptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::Infrastructure(_) | SubscriptionError::CheckoutFailed { .. }
        )
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => SubscriptionError::InvalidState {
                current: "unknown".to_string(),
                attempted: err.to_string(),
            },
            ErrorCode::ValidationFailed => SubscriptionError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.to_string(),
            },
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}
