//! Directional swipe records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{InteractionId, Timestamp, UserId, ValidationError};

use super::MatchingError;

/// Direction of interest expressed by a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeAction {
    /// Swiper wants to connect with the swiped user.
    Interest,

    /// Swiper is not interested. Recorded so the user is not shown again.
    Pass,
}

impl SwipeAction {
    /// Returns the stable wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Interest => "interest",
            SwipeAction::Pass => "pass",
        }
    }
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SwipeAction {
    type Err = MatchingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interest" => Ok(SwipeAction::Interest),
            "pass" => Ok(SwipeAction::Pass),
            other => Err(MatchingError::invalid_action(other)),
        }
    }
}

/// An immutable record of one user swiping on another.
///
/// At most one record may exist per ordered (swiper, swiped) pair;
/// the storage layer enforces uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: InteractionId,
    pub swiper_user_id: UserId,
    pub swiped_user_id: UserId,
    pub action: SwipeAction,
    pub created_at: Timestamp,
}

impl InteractionRecord {
    /// Creates a new interaction record.
    ///
    /// Rejects self-interaction; all other pair constraints live in storage.
    pub fn new(
        swiper_user_id: UserId,
        swiped_user_id: UserId,
        action: SwipeAction,
    ) -> Result<Self, MatchingError> {
        if swiper_user_id == swiped_user_id {
            return Err(MatchingError::self_interaction(swiper_user_id));
        }
        Ok(Self {
            id: InteractionId::new(),
            swiper_user_id,
            swiped_user_id,
            action,
            created_at: Timestamp::now(),
        })
    }

    /// Returns true if this swipe expresses interest.
    pub fn is_interest(&self) -> bool {
        self.action == SwipeAction::Interest
    }
}

impl From<ValidationError> for MatchingError {
    fn from(err: ValidationError) -> Self {
        MatchingError::Validation {
            field: "interaction".to_string(),
            message: err.to_string(),
        }
    }
}

/// Aggregated swipe activity for one user.
///
/// Match counts live with the match store; this covers swipes only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionStats {
    pub sent_interest: u64,
    pub sent_pass: u64,
    pub received_interest: u64,
    pub received_pass: u64,
}
