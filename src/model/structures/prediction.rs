use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Externally estimated stroke impacts for a round.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseConditions {
    /// Strokes added by weather, before weighting
    pub weather_impact: f64,
    /// Strokes added by how the course suits the player, before weighting
    pub course_fit_impact: f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum FactorKind {
    Weather,
    Form,
    CourseFit
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionFactor {
    pub kind: FactorKind,
    pub weight: f64,
    /// Weighted stroke adjustment applied to the baseline
    pub impact: f64
}

/// Closed interval of scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub low: i32,
    pub high: i32
}

impl ScoreRange {
    pub fn contains(&self, score: i32) -> bool {
        self.low <= score && score <= self.high
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePrediction {
    pub player_id: i32,
    pub course_id: i32,
    pub range: ScoreRange,
    pub most_likely_score: i32,
    pub confidence: f64,
    pub factors: Vec<PredictionFactor>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    pub opponent_id: i32,
    pub opponent_predicted_score: i32,
    /// Naive probability that the subject beats this opponent
    pub win_probability: f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPrediction {
    pub player_id: i32,
    pub predicted_finish: usize,
    pub finish_range: (usize, usize),
    pub top_ten_probability: f64,
    pub win_probability: f64,
    pub key_matchups: Vec<Matchup>
}
