use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{RatingError, RatingResult},
    model::{
        constants::{
            HOLES_PER_ROUND, LIVE_CONSISTENCY_WEIGHT, LIVE_DIFFICULTY_WEIGHT, LIVE_MOMENTUM_WINDOW,
            LIVE_PACE_WEIGHT, LIVE_RATING_POINTS_PER_STROKE
        },
        structures::{live_update::LiveRatingUpdate, round_state::RoundState, score_round::ScoreRound}
    }
};

/// The course a live round is played on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSetup {
    pub course_id: i32,
    pub course_rating: f64,
    pub course_slope: i32,
    pub par: i32
}

/// Inputs that stay fixed for the whole round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveContext {
    /// Persisted competitive rating the live rating is derived from
    pub baseline_rating: f64,
    /// Historical consistency, 0 to 1
    pub consistency: f64,
    /// Strokes added by course and conditions today; positive is harder
    pub difficulty_adjustment: f64,
    /// The player's usual 18-hole score
    pub expected_score: f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveProjection {
    pub projected_final_score: i32,
    pub live_rating: f64,
    pub rating_delta: f64,
    pub momentum: f64
}

/// `current + round(current / holes_completed * remaining)`.
///
/// Before the first hole the usual score is the only information available.
pub fn project_final_score(current_score: i32, holes_completed: u8, expected_score: f64) -> i32 {
    if holes_completed == 0 {
        return expected_score.round() as i32;
    }

    let pace = current_score as f64 / holes_completed as f64;
    let remaining = HOLES_PER_ROUND.saturating_sub(holes_completed) as f64;

    current_score + (pace * remaining).round() as i32
}

/// # Live rating
///
/// Blends three rating-point factors on top of the baseline rating:
/// - pace (0.6): strokes the projected score beats the usual score by
/// - consistency (0.3): historical consistency, centred on 0.5
/// - difficulty (0.1): strokes added by course and conditions
///
/// Each factor is converted at 10 rating points per stroke.
pub fn project(hole_scores: &[i32], context: &LiveContext) -> LiveProjection {
    let holes_completed = hole_scores.len().min(HOLES_PER_ROUND as usize) as u8;
    let current_score: i32 = hole_scores.iter().sum();
    let projected_final_score = project_final_score(current_score, holes_completed, context.expected_score);

    let pace_factor = (context.expected_score - projected_final_score as f64) * LIVE_RATING_POINTS_PER_STROKE;
    let consistency_factor = (context.consistency - 0.5) * 2.0 * LIVE_RATING_POINTS_PER_STROKE;
    let difficulty_factor = context.difficulty_adjustment * LIVE_RATING_POINTS_PER_STROKE;

    let rating_delta = LIVE_PACE_WEIGHT * pace_factor
        + LIVE_CONSISTENCY_WEIGHT * consistency_factor
        + LIVE_DIFFICULTY_WEIGHT * difficulty_factor;

    LiveProjection {
        projected_final_score,
        live_rating: context.baseline_rating + rating_delta,
        rating_delta,
        momentum: momentum(hole_scores, context.expected_score)
    }
}

/// Strokes per hole the last few holes beat the usual pace by, clamped to [-1, 1].
fn momentum(hole_scores: &[i32], expected_score: f64) -> f64 {
    if hole_scores.is_empty() {
        return 0.0;
    }

    let recent: Vec<i32> = hole_scores.iter().rev().take(LIVE_MOMENTUM_WINDOW).copied().collect();
    let recent_pace = recent.iter().sum::<i32>() as f64 / recent.len() as f64;
    let expected_pace = expected_score / HOLES_PER_ROUND as f64;

    (expected_pace - recent_pace).clamp(-1.0, 1.0)
}

/// A round followed hole by hole: `NotStarted -> InProgress -> Completed`.
#[derive(Debug, Clone)]
pub struct LiveRound {
    pub player_id: i32,
    pub course: CourseSetup,
    pub context: LiveContext,
    state: RoundState,
    hole_scores: Vec<i32>
}

impl LiveRound {
    pub fn new(player_id: i32, course: CourseSetup, context: LiveContext) -> Self {
        Self {
            player_id,
            course,
            context,
            state: RoundState::NotStarted,
            hole_scores: Vec::with_capacity(HOLES_PER_ROUND as usize)
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn hole_scores(&self) -> &[i32] {
        &self.hole_scores
    }

    /// Records the next hole and returns the projection after it.
    pub fn record_hole(&mut self, strokes: i32, timestamp: DateTime<FixedOffset>) -> RatingResult<LiveRatingUpdate> {
        if self.state == RoundState::Completed {
            return Err(RatingError::InvalidRoundTransition {
                action: "record a hole on",
                state: self.state.to_string()
            });
        }

        if strokes <= 0 {
            return Err(RatingError::InvalidInput(format!("hole score must be positive, got {}", strokes)));
        }

        if self.hole_scores.len() >= HOLES_PER_ROUND as usize {
            return Err(RatingError::InvalidInput(format!(
                "all {} holes are already recorded for player {}",
                HOLES_PER_ROUND, self.player_id
            )));
        }

        self.state = RoundState::InProgress;
        self.hole_scores.push(strokes);

        let projection = project(&self.hole_scores, &self.context);

        Ok(LiveRatingUpdate {
            event_id: Uuid::new_v4(),
            player_id: self.player_id,
            current_hole: self.hole_scores.len() as u8,
            current_score: self.hole_scores.iter().sum(),
            projected_final_score: projection.projected_final_score,
            live_rating: projection.live_rating,
            rating_delta: projection.rating_delta,
            momentum: projection.momentum,
            timestamp
        })
    }

    /// The finished card as a [`ScoreRound`], without changing the state. Fails unless the
    /// round is in progress with every hole recorded.
    pub fn finished_round(&self, timestamp: DateTime<FixedOffset>) -> RatingResult<ScoreRound> {
        if self.state != RoundState::InProgress {
            return Err(RatingError::InvalidRoundTransition {
                action: "complete",
                state: self.state.to_string()
            });
        }

        if self.hole_scores.len() != HOLES_PER_ROUND as usize {
            return Err(RatingError::InvalidInput(format!(
                "only {} of {} holes recorded for player {}",
                self.hole_scores.len(),
                HOLES_PER_ROUND,
                self.player_id
            )));
        }

        Ok(ScoreRound {
            player_id: self.player_id,
            course_id: self.course.course_id,
            date: timestamp,
            total_score: self.hole_scores.iter().sum(),
            course_rating: self.course.course_rating,
            course_slope: self.course.course_slope,
            par: self.course.par,
            hole_scores: self.hole_scores.clone()
        })
    }

    /// Finishes the round. The returned round is what feeds the handicap recomputation.
    pub fn complete(&mut self, timestamp: DateTime<FixedOffset>) -> RatingResult<ScoreRound> {
        let round = self.finished_round(timestamp)?;
        self.state = RoundState::Completed;

        Ok(round)
    }
}
