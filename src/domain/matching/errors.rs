//! Matching-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | SelfInteraction | 400 |
//! | InvalidAction | 400 |
//! | SportMismatch | 400 |
//! | DuplicateInteraction | 409 |
//! | RateLimited | 403 |
//! | PremiumRequired | 403 |
//! | ProfileNotFound | 404 |
//! | Validation | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Errors raised by the matching engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    /// A user attempted to swipe on themselves.
    SelfInteraction(UserId),

    /// The submitted action string is not a known swipe action.
    InvalidAction(String),

    /// Swiper and swiped profiles belong to different sports.
    SportMismatch {
        swiper_sport: String,
        swiped_sport: String,
    },

    /// An interaction already exists for this ordered pair.
    DuplicateInteraction {
        swiper: UserId,
        swiped: UserId,
    },

    /// Daily interaction allowance exhausted.
    RateLimited {
        limit: u32,
    },

    /// Feature requires an active premium subscription.
    PremiumRequired {
        feature: String,
    },

    /// No profile of any kind exists for this user.
    ProfileNotFound(UserId),

    /// Validation failed.
    Validation {
        field: String,
        message: String,
    },

    /// Infrastructure error.
    Infrastructure(String),
}

impl MatchingError {
    pub fn self_interaction(user: UserId) -> Self {
        MatchingError::SelfInteraction(user)
    }

    pub fn invalid_action(action: impl Into<String>) -> Self {
        MatchingError::InvalidAction(action.into())
    }

    pub fn sport_mismatch(swiper: impl Into<String>, swiped: impl Into<String>) -> Self {
        MatchingError::SportMismatch {
            swiper_sport: swiper.into(),
            swiped_sport: swiped.into(),
        }
    }

    pub fn duplicate_interaction(swiper: UserId, swiped: UserId) -> Self {
        MatchingError::DuplicateInteraction { swiper, swiped }
    }

    pub fn rate_limited(limit: u32) -> Self {
        MatchingError::RateLimited { limit }
    }

    pub fn premium_required(feature: impl Into<String>) -> Self {
        MatchingError::PremiumRequired {
            feature: feature.into(),
        }
    }

    pub fn profile_not_found(user: UserId) -> Self {
        MatchingError::ProfileNotFound(user)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MatchingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        MatchingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MatchingError::SelfInteraction(_) => ErrorCode::SelfInteraction,
            MatchingError::InvalidAction(_) => ErrorCode::InvalidAction,
            MatchingError::SportMismatch { .. } => ErrorCode::SportMismatch,
            MatchingError::DuplicateInteraction { .. } => ErrorCode::DuplicateInteraction,
            MatchingError::RateLimited { .. } => ErrorCode::RateLimited,
            MatchingError::PremiumRequired { .. } => ErrorCode::PremiumRequired,
            MatchingError::ProfileNotFound(_) => ErrorCode::ProfileNotFound,
            MatchingError::Validation { .. } => ErrorCode::ValidationFailed,
            MatchingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            MatchingError::SelfInteraction(user) => {
                format!("User {} cannot swipe on themselves", user)
            }
            MatchingError::InvalidAction(action) => format!("Invalid swipe action: {}", action),
            MatchingError::SportMismatch {
                swiper_sport,
                swiped_sport,
            } => format!(
                "Sport mismatch: swiper plays {}, swiped plays {}",
                swiper_sport, swiped_sport
            ),
            MatchingError::DuplicateInteraction { swiper, swiped } => {
                format!("User {} has already swiped on {}", swiper, swiped)
            }
            MatchingError::RateLimited { limit } => format!(
                "Daily limit of {} interactions reached, upgrade to premium for unlimited swipes",
                limit
            ),
            MatchingError::PremiumRequired { feature } => {
                format!("Feature '{}' requires a premium subscription", feature)
            }
            MatchingError::ProfileNotFound(user) => format!("No profile found for user {}", user),
            MatchingError::Validation { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            MatchingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MatchingError::Infrastructure(_))
    }
}

impl std::fmt::Display for MatchingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for MatchingError {}

impl From<MatchingError> for DomainError {
    fn from(err: MatchingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

impl From<DomainError> for MatchingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ProfileNotFound => match UserId::new(
                err.details.get("user_id").cloned().unwrap_or_default(),
            ) {
                Ok(user) => MatchingError::ProfileNotFound(user),
                Err(_) => MatchingError::Infrastructure(err.to_string()),
            },
            ErrorCode::ValidationFailed => MatchingError::Validation {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.to_string(),
            },
            _ => MatchingError::Infrastructure(err.to_string()),
        }
    }
}
