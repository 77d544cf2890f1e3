//! Interaction ledger port.
//!
//! The ordered-pair uniqueness constraint lives in the implementation;
//! a duplicate insert is reported as an outcome, not an error, so the
//! application layer decides how to surface it.

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::matching::{InteractionRecord, InteractionStats};
use async_trait::async_trait;

/// Result of attempting to insert an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,

    /// A row for this ordered pair already existed; nothing was written.
    Duplicate,
}

/// Repository port for the swipe ledger.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Inserts a swipe record.
    ///
    /// Returns `Duplicate` when the ordered (swiper, swiped) pair already
    /// has a row.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, record: &InteractionRecord) -> Result<InsertOutcome, DomainError>;

    /// Returns true if `swiped` has previously expressed interest in `swiper`.
    async fn reverse_interest_exists(
        &self,
        swiper: &UserId,
        swiped: &UserId,
    ) -> Result<bool, DomainError>;

    /// Counts swipes made by `swiper` at or after `since`.
    ///
    /// Used for the sliding-window allowance.
    async fn count_since_by_swiper(
        &self,
        swiper: &UserId,
        since: Timestamp,
    ) -> Result<u64, DomainError>;

    /// Returns all user ids `swiper` has already swiped on (either action).
    async fn swiped_ids(&self, swiper: &UserId) -> Result<Vec<UserId>, DomainError>;

    /// Aggregates sent/received swipe counts for a user.
    async fn stats_for_user(&self, user: &UserId) -> Result<InteractionStats, DomainError>;
}
