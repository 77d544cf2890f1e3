//! Matching-engine operations: swiping, discovery, matches, stats,
//! and premium contact lookup.

pub mod contact_lookup;
pub mod discover;
pub mod interaction_stats;
pub mod list_matches;
pub mod record_interaction;

pub use contact_lookup::{ContactLookupHandler, ContactLookupQuery, ContactLookupResult};
pub use discover::{DiscoverHandler, DiscoverQuery, DiscoverResult};
pub use interaction_stats::{
    InteractionStatsHandler, InteractionStatsQuery, InteractionStatsResult,
};
pub use list_matches::{ListMatchesHandler, ListMatchesQuery, ListMatchesResult, MatchedProfile};
pub use record_interaction::{
    RecordInteractionCommand, RecordInteractionHandler, RecordInteractionResult,
};
