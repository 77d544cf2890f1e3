//! Match store port.

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::matching::{CanonicalPair, MatchRecord};
use async_trait::async_trait;

/// Repository port for match records.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Creates a match for the pair if none exists, returning the stored
    /// row either way.
    ///
    /// Losing a creation race against a concurrent mutual swipe is an
    /// expected outcome, never an error: the unique index on the
    /// canonical pair collapses both attempts onto one row.
    async fn create_if_absent(
        &self,
        pair: &CanonicalPair,
        created_at: Timestamp,
    ) -> Result<MatchRecord, DomainError>;

    /// Lists active matches involving this user, newest first.
    async fn list_active_for_user(&self, user: &UserId) -> Result<Vec<MatchRecord>, DomainError>;

    /// Counts matches involving this user.
    async fn count_for_user(&self, user: &UserId) -> Result<u64, DomainError>;
}
