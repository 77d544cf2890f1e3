//! Profile directory port.
//!
//! Profiles live in three separate stores (athletes, agents, teams).
//! The directory presents them as one lookup surface; resolution is
//! all-or-nothing, so a failure in any store fails the call rather
//! than silently dropping a profile kind.

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::matching::{ContactCard, ProfileSummary, ProfileType};
use async_trait::async_trait;

/// Lookup port over the profile stores.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Resolves a user to their profile summary, whichever kind it is.
    ///
    /// Returns `None` if the user has no profile of any kind.
    async fn resolve(&self, user: &UserId) -> Result<Option<ProfileSummary>, DomainError>;

    /// Returns the user's contact details, if they have a profile.
    async fn contact_card(&self, user: &UserId) -> Result<Option<ContactCard>, DomainError>;

    /// Lists discovery candidates of the given kinds, excluding the
    /// listed users, up to `limit`.
    async fn list_candidates(
        &self,
        kinds: &[ProfileType],
        exclude: &[UserId],
        limit: u32,
    ) -> Result<Vec<ProfileSummary>, DomainError>;
}
