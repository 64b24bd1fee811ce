use super::field_tier::FieldTier;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub player_id: i32,
    pub score: i32,
    pub position: u32
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardConditions {
    pub field_tier: FieldTier,
    /// Stroke adjustment derived from playing conditions
    pub stroke_adjustment: f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub id: i32,
    pub entries: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub conditions: LeaderboardConditions
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedLeaderboardEntry {
    pub player_id: i32,
    pub score: i32,
    pub reported_position: u32,
    pub position: u32,
    /// Positive when the player moved up compared to the reported position
    pub movement: i64,
    pub adjusted_rating: f64,
    pub percentile: f64
}
