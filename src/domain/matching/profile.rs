//! Profile kinds and the summaries the matcher works with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{SportId, UserId};

use super::MatchingError;

/// The three profile kinds in the network.
///
/// Discovery is asymmetric: athletes browse teams and agents, while
/// teams and agents browse athletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    Athlete,
    Agent,
    Team,
}

impl ProfileType {
    /// Returns the profile kinds this kind discovers by default.
    pub fn discover_targets(&self) -> &'static [ProfileType] {
        match self {
            ProfileType::Athlete => &[ProfileType::Team, ProfileType::Agent],
            ProfileType::Agent | ProfileType::Team => &[ProfileType::Athlete],
        }
    }

    /// Returns true if `target` is a kind this kind may discover.
    pub fn can_discover(&self, target: ProfileType) -> bool {
        self.discover_targets().contains(&target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Athlete => "athlete",
            ProfileType::Agent => "agent",
            ProfileType::Team => "team",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProfileType {
    type Err = MatchingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "athlete" => Ok(ProfileType::Athlete),
            "agent" => Ok(ProfileType::Agent),
            "team" => Ok(ProfileType::Team),
            other => Err(MatchingError::Validation {
                field: "profile_type".to_string(),
                message: format!("unknown profile type: {}", other),
            }),
        }
    }
}

/// Minimal profile view used for discovery cards and match listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub user_id: UserId,
    pub profile_type: ProfileType,
    pub display_name: String,
    pub sport_id: Option<SportId>,
    pub location: Option<String>,
}

/// Contact details revealed to premium users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactCard {
    pub user_id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}
