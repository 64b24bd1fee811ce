use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ephemeral projection emitted after each hole of an in-progress round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveRatingUpdate {
    pub event_id: Uuid,
    pub player_id: i32,
    pub current_hole: u8,
    pub current_score: i32,
    pub projected_final_score: i32,
    pub live_rating: f64,
    pub rating_delta: f64,
    pub momentum: f64,
    pub timestamp: DateTime<FixedOffset>
}
