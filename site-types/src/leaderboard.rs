use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardPlayer {
    pub username: String,
    pub wager: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LeaderboardPeriod {
    #[default]
    Monthly,
}

impl LeaderboardPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardPeriod::Monthly => "monthly",
        }
    }
}

/// Reward slot for the top three positions of the server's ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PrizeTier {
    First,
    Second,
    Third,
}

impl PrizeTier {
    pub fn for_position(index: usize) -> Option<Self> {
        match index {
            0 => Some(PrizeTier::First),
            1 => Some(PrizeTier::Second),
            2 => Some(PrizeTier::Third),
            _ => None,
        }
    }

    /// Prize in whole dollars.
    pub fn reward(&self) -> u32 {
        match self {
            PrizeTier::First => 150,
            PrizeTier::Second => 75,
            PrizeTier::Third => 25,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrizeTier::First => "1st Place",
            PrizeTier::Second => "2nd Place",
            PrizeTier::Third => "3rd Place",
        }
    }
}
