use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Stable,
    Deteriorating
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandicapTrend {
    pub direction: TrendDirection,
    /// Prior average minus recent average; positive means the player is improving
    pub improvement: f64,
    pub volatility: f64,
    pub consistency: f64,
    pub monthly_improvement_rate: f64
}

/// An immutable handicap snapshot. A newer calculation supersedes it, it is never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandicapIndex {
    pub player_id: i32,
    pub index: f64,
    pub calculation_date: DateTime<FixedOffset>,
    /// The lowest differentials that were averaged, ascending
    pub differentials_used: Vec<f64>,
    pub rounds_considered: usize,
    pub trend: HandicapTrend,
    pub next_revision: DateTime<FixedOffset>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandicapUpdate {
    pub previous: HandicapIndex,
    pub current: HandicapIndex,
    pub delta: f64
}
