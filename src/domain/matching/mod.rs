//! Matching domain: swipes, matches, and profile resolution.

mod errors;
mod interaction;
mod match_record;
mod profile;

pub use errors::MatchingError;
pub use interaction::{InteractionRecord, InteractionStats, SwipeAction};
pub use match_record::{CanonicalPair, MatchRecord, MatchState};
pub use profile::{ContactCard, ProfileSummary, ProfileType};
