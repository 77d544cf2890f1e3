//! Match records between mutually interested users.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MatchId, StateMachine, Timestamp, UserId};

use super::MatchingError;

/// Unordered user pair in canonical (lexicographic) order.
///
/// Both swipe directions of the same two users normalize to the same
/// pair, so a unique index on (lo, hi) is enough to collapse a
/// concurrent mutual swipe into a single match row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalPair {
    lo: UserId,
    hi: UserId,
}

impl CanonicalPair {
    /// Builds the canonical pair for two distinct users.
    pub fn new(a: UserId, b: UserId) -> Result<Self, MatchingError> {
        if a == b {
            return Err(MatchingError::self_interaction(a));
        }
        if a < b {
            Ok(Self { lo: a, hi: b })
        } else {
            Ok(Self { lo: b, hi: a })
        }
    }

    pub fn lo(&self) -> &UserId {
        &self.lo
    }

    pub fn hi(&self) -> &UserId {
        &self.hi
    }

    /// Returns the member of the pair that is not `user`, if `user` belongs to it.
    pub fn counterpart_of(&self, user: &UserId) -> Option<&UserId> {
        if &self.lo == user {
            Some(&self.hi)
        } else if &self.hi == user {
            Some(&self.lo)
        } else {
            None
        }
    }
}

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// Both users can see and act on the match.
    Active,

    /// Match has been dissolved. Kept for history.
    Ended,
}

impl StateMachine for MatchState {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (MatchState::Active, MatchState::Ended))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            MatchState::Active => vec![MatchState::Ended],
            MatchState::Ended => vec![],
        }
    }
}

/// A confirmed mutual-interest connection between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub pair: CanonicalPair,
    pub state: MatchState,
    pub created_at: Timestamp,
}

impl MatchRecord {
    /// Creates a new active match for a canonical pair.
    pub fn new(pair: CanonicalPair, created_at: Timestamp) -> Self {
        Self {
            id: MatchId::new(),
            pair,
            state: MatchState::Active,
            created_at,
        }
    }

    /// Returns true if `user` is one of the matched users.
    pub fn involves(&self, user: &UserId) -> bool {
        self.pair.counterpart_of(user).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[test]
    fn canonical_pair_orders_members() {
        let pair = CanonicalPair::new(user("zed"), user("amy")).unwrap();
        assert_eq!(pair.lo(), &user("amy"));
        assert_eq!(pair.hi(), &user("zed"));
    }

    #[test]
    fn canonical_pair_is_direction_independent() {
        let ab = CanonicalPair::new(user("a"), user("b")).unwrap();
        let ba = CanonicalPair::new(user("b"), user("a")).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn canonical_pair_rejects_same_user() {
        let result = CanonicalPair::new(user("a"), user("a"));
        assert!(matches!(result, Err(MatchingError::SelfInteraction(_))));
    }

    #[test]
    fn counterpart_of_returns_other_member() {
        let pair = CanonicalPair::new(user("a"), user("b")).unwrap();
        assert_eq!(pair.counterpart_of(&user("a")), Some(&user("b")));
        assert_eq!(pair.counterpart_of(&user("b")), Some(&user("a")));
        assert_eq!(pair.counterpart_of(&user("c")), None);
    }

    #[test]
    fn new_match_starts_active() {
        let pair = CanonicalPair::new(user("a"), user("b")).unwrap();
        let m = MatchRecord::new(pair, Timestamp::now());
        assert_eq!(m.state, MatchState::Active);
        assert!(m.involves(&user("a")));
        assert!(!m.involves(&user("c")));
    }

    #[test]
    fn active_match_can_end() {
        assert!(MatchState::Active.can_transition_to(&MatchState::Ended));
        assert!(MatchState::Ended.is_terminal());
    }
}
