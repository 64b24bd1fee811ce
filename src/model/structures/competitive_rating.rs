use super::rating_adjustment_type::RatingAdjustmentType;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single tournament finish, as reported by the tournament history provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentResult {
    pub tournament_id: i32,
    pub finish_position: u32,
    pub field_size: u32,
    pub date: DateTime<FixedOffset>,
    /// Average competitive rating of the field. Unknown fields are treated as
    /// average strength (the seed rating).
    #[serde(default)]
    pub field_average_rating: Option<f64>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAdjustment {
    pub player_id: i32,
    pub tournament_id: Option<i32>,
    pub rating_before: f64,
    pub rating_after: f64,
    pub expected: f64,
    pub actual: f64,
    pub timestamp: DateTime<FixedOffset>,
    pub adjustment_type: RatingAdjustmentType
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentHistorySummary {
    pub tournaments_played: usize,
    pub best_finish: Option<u32>,
    pub average_finish: Option<f64>,
    pub last_tournament_date: Option<DateTime<FixedOffset>>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitiveRating {
    pub player_id: i32,
    pub rating: f64,
    pub confidence: f64,
    pub volatility: f64,
    pub momentum: f64,
    pub history: TournamentHistorySummary,
    /// Finishing positions in chronological order, used to refresh the derived metrics
    pub finishes: Vec<u32>,
    /// Every tournament already folded into `rating`, including those absorbed before
    /// the snapshot was loaded from the store
    #[serde(default)]
    pub applied_tournaments: Vec<i32>,
    /// The adjustments that led to this rating
    pub adjustments: Vec<RatingAdjustment>
}

/// What the rating store keeps for a player between runs.
///
/// Only `rating` is required. A record without the other fields has absorbed no known
/// tournaments, so every result in the player's history is still applied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub rating: f64,
    #[serde(default)]
    pub finishes: Vec<u32>,
    #[serde(default)]
    pub last_tournament_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub applied_tournaments: Vec<i32>
}

impl RatingRecord {
    pub fn new(rating: f64) -> Self {
        Self {
            rating,
            finishes: Vec::new(),
            last_tournament_date: None,
            applied_tournaments: Vec::new()
        }
    }
}

impl From<&CompetitiveRating> for RatingRecord {
    fn from(rating: &CompetitiveRating) -> Self {
        Self {
            rating: rating.rating,
            finishes: rating.finishes.clone(),
            last_tournament_date: rating.history.last_tournament_date,
            applied_tournaments: rating.applied_tournaments.clone()
        }
    }
}
