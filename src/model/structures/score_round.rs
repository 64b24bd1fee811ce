use crate::{
    error::{RatingError, RatingResult},
    model::constants::STANDARD_SLOPE
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A completed, immutable round of golf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRound {
    pub player_id: i32,
    pub course_id: i32,
    pub date: DateTime<FixedOffset>,
    pub total_score: i32,
    pub course_rating: f64,
    pub course_slope: i32,
    pub par: i32,
    /// Strokes per hole, in playing order
    #[serde(default)]
    pub hole_scores: Vec<i32>
}

impl ScoreRound {
    /// `(totalScore - courseRating) * 113 / slope`
    pub fn score_differential(&self) -> f64 {
        (self.total_score as f64 - self.course_rating) * STANDARD_SLOPE / self.course_slope as f64
    }

    /// Rejects rounds that would make the handicap math meaningless.
    pub fn validate(&self) -> RatingResult<()> {
        if self.course_slope <= 0 {
            return Err(RatingError::InvalidInput(format!(
                "round for player {} on course {} has non-positive slope {}",
                self.player_id, self.course_id, self.course_slope
            )));
        }

        if self.total_score <= 0 {
            return Err(RatingError::InvalidInput(format!(
                "round for player {} on course {} has non-positive score {}",
                self.player_id, self.course_id, self.total_score
            )));
        }

        if !self.hole_scores.is_empty() && self.hole_scores.iter().sum::<i32>() != self.total_score {
            return Err(RatingError::InvalidInput(format!(
                "hole scores for player {} on course {} do not add up to {}",
                self.player_id, self.course_id, self.total_score
            )));
        }

        Ok(())
    }
}
