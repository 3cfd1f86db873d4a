/// TUG phase model
///
/// A Timed Up and Go performance moves through six sub-tasks in a fixed
/// order. Phases serialize with the labels used by the upstream classifier
/// (`"Sit-To-Stand"`, `"Walk-From-Chair"`, ...).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "Sit-To-Stand")]
    SitToStand,
    #[serde(rename = "Walk-From-Chair")]
    WalkFromChair,
    #[serde(rename = "Turn-First")]
    TurnFirst,
    #[serde(rename = "Walk-To-Chair")]
    WalkToChair,
    #[serde(rename = "Turn-Second")]
    TurnSecond,
    #[serde(rename = "Stand-To-Sit")]
    StandToSit,
}

impl Phase {
    /// All phases in the order they are performed
    pub const ALL: [Phase; 6] = [
        Phase::SitToStand,
        Phase::WalkFromChair,
        Phase::TurnFirst,
        Phase::WalkToChair,
        Phase::TurnSecond,
        Phase::StandToSit,
    ];

    /// Position of this phase in the canonical order (0-5)
    pub fn index(&self) -> usize {
        match self {
            Phase::SitToStand => 0,
            Phase::WalkFromChair => 1,
            Phase::TurnFirst => 2,
            Phase::WalkToChair => 3,
            Phase::TurnSecond => 4,
            Phase::StandToSit => 5,
        }
    }

    /// Label used in frame tables and duration reports
    pub fn label(&self) -> &'static str {
        match self {
            Phase::SitToStand => "Sit-To-Stand",
            Phase::WalkFromChair => "Walk-From-Chair",
            Phase::TurnFirst => "Turn-First",
            Phase::WalkToChair => "Walk-To-Chair",
            Phase::TurnSecond => "Turn-Second",
            Phase::StandToSit => "Stand-To-Sit",
        }
    }

    pub fn is_walking(&self) -> bool {
        matches!(self, Phase::WalkFromChair | Phase::WalkToChair)
    }

    pub fn is_turning(&self) -> bool {
        matches!(self, Phase::TurnFirst | Phase::TurnSecond)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Error returned when a label does not name a TUG phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPhase(pub String);

impl std::fmt::Display for UnknownPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown TUG phase '{}'", self.0)
    }
}

impl std::error::Error for UnknownPhase {}

impl FromStr for Phase {
    type Err = UnknownPhase;

    /// Accepts the classifier labels as well as `SitToStand` / `sit_to_stand`
    /// spellings, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "sittostand" => Ok(Phase::SitToStand),
            "walkfromchair" => Ok(Phase::WalkFromChair),
            "turnfirst" => Ok(Phase::TurnFirst),
            "walktochair" => Ok(Phase::WalkToChair),
            "turnsecond" => Ok(Phase::TurnSecond),
            "standtosit" => Ok(Phase::StandToSit),
            _ => Err(UnknownPhase(s.to_string())),
        }
    }
}
