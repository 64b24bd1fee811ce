use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum MomentumDirection {
    Positive,
    Neutral,
    Negative
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Momentum {
    pub direction: MomentumDirection,
    /// `min(1, |slope|)`
    pub strength: f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum StreakKind {
    Improvement,
    Stable,
    Decline
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub kind: StreakKind,
    pub length: usize
}

/// Differential slopes per round, oldest to newest. Negative is improvement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTrend {
    pub short_term: f64,
    pub medium_term: f64,
    pub seasonal: f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRating {
    pub player_id: i32,
    /// 0 to 100, 50 is the player's usual level
    pub current_form: f64,
    pub momentum: Momentum,
    pub consistency: f64,
    /// Lowest differential in the window
    pub recent_best: f64,
    pub streak: Streak,
    pub trend: FormTrend,
    pub rounds_analyzed: usize,
    /// Positions (0 = most recent) of rounds outside the anomaly band
    pub anomalous_rounds: Vec<usize>
}
