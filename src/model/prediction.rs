use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{RatingError, RatingResult},
    model::{
        constants::{
            CONFIDENCE_PENALTY_PER_STROKE, CONFIDENCE_SAMPLE_SIZE, COURSE_BASELINE_WEIGHT, COURSE_FIT_WEIGHT,
            FINISH_RANGE_FRACTION, FORM_BASELINE, FORM_STROKES_PER_POINT, FORM_WEIGHT, HANDICAP_BASELINE_WEIGHT,
            HEAD_TO_HEAD_PER_STROKE, MAX_CONFIDENCE, MAX_CONFIDENCE_PENALTY, MAX_HEAD_TO_HEAD, MAX_KEY_MATCHUPS,
            MAX_TOP_TEN_PROBABILITY, MIN_HEAD_TO_HEAD, MIN_RANGE_HALF_WIDTH, MIN_TOP_TEN_PROBABILITY,
            PROBABILITY_DECAY_STROKES, RANGE_STD_DEV_MULTIPLIER, RECENT_BASELINE_WEIGHT, WEATHER_WEIGHT
        },
        stats::{mean, std_dev},
        structures::prediction::{
            CourseConditions, FactorKind, Matchup, PredictionFactor, ScorePrediction, ScoreRange,
            TournamentPrediction
        }
    }
};

/// Everything a score prediction needs, gathered before any computation happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInputs {
    pub player_id: i32,
    pub course_id: i32,
    /// Previous scores at this course
    pub course_scores: Vec<i32>,
    /// Recent scores anywhere
    pub recent_scores: Vec<i32>,
    /// `par + course handicap`, when the player has a handicap
    pub handicap_expectation: Option<f64>,
    /// Form rating, 50 is neutral
    pub form_score: f64,
    pub conditions: CourseConditions
}

/// # Score range prediction
///
/// 1. Baseline: weighted mean of the course average (0.5), the recent average (0.3) and the
///    handicap expectation (0.2), re-normalised over whichever of the three are present.
/// 2. Adjustments: weather (0.3), form `-(form - 50) * 0.1` (0.4), course fit (0.2).
/// 3. `most_likely = round(baseline + sum(adjustments))`.
/// 4. Half width `max(2, round(1.5 * std_dev(history)))`.
/// 5. Confidence `min(0.9, samples / 20)`, reduced by 5% per stroke of total adjustment
///    (at most halved).
pub fn predict_score_range(inputs: &PredictionInputs) -> RatingResult<ScorePrediction> {
    let baseline = baseline(inputs)?;

    let form_impact = -(inputs.form_score - FORM_BASELINE) * FORM_STROKES_PER_POINT;
    let factors = vec![
        PredictionFactor {
            kind: FactorKind::Weather,
            weight: WEATHER_WEIGHT,
            impact: WEATHER_WEIGHT * inputs.conditions.weather_impact
        },
        PredictionFactor {
            kind: FactorKind::Form,
            weight: FORM_WEIGHT,
            impact: FORM_WEIGHT * form_impact
        },
        PredictionFactor {
            kind: FactorKind::CourseFit,
            weight: COURSE_FIT_WEIGHT,
            impact: COURSE_FIT_WEIGHT * inputs.conditions.course_fit_impact
        },
    ];

    let adjustment: f64 = factors.iter().map(|f| f.impact).sum();
    let most_likely_score = (baseline + adjustment).round() as i32;

    let history = history(inputs);
    let half_width = MIN_RANGE_HALF_WIDTH.max((RANGE_STD_DEV_MULTIPLIER * std_dev(&history)).round() as i32);

    let sample_confidence = (history.len() as f64 / CONFIDENCE_SAMPLE_SIZE).min(MAX_CONFIDENCE);
    let uncertainty = factors.iter().map(|f| f.impact.abs()).sum::<f64>() * CONFIDENCE_PENALTY_PER_STROKE;
    let confidence = sample_confidence * (1.0 - uncertainty.min(MAX_CONFIDENCE_PENALTY));

    debug!(
        player_id = inputs.player_id,
        course_id = inputs.course_id,
        baseline,
        adjustment,
        most_likely_score,
        confidence,
        "Predicted score range"
    );

    Ok(ScorePrediction {
        player_id: inputs.player_id,
        course_id: inputs.course_id,
        range: ScoreRange {
            low: most_likely_score - half_width,
            high: most_likely_score + half_width
        },
        most_likely_score,
        confidence,
        factors
    })
}

/// Predictions for every member of a field. Members are independent, so they run in parallel.
pub fn predict_field(field: &[PredictionInputs]) -> RatingResult<Vec<ScorePrediction>> {
    field.par_iter().map(predict_score_range).collect()
}

/// `confidence * exp(-|target - most_likely| / 3)`
pub fn score_probability(target_score: i32, prediction: &ScorePrediction) -> f64 {
    let distance = (target_score - prediction.most_likely_score).abs() as f64;

    prediction.confidence * (-distance / PROBABILITY_DECAY_STROKES).exp()
}

pub fn score_probabilities(targets: &[i32], prediction: &ScorePrediction) -> Vec<(i32, f64)> {
    targets
        .iter()
        .map(|t| (*t, score_probability(*t, prediction)))
        .collect()
}

/// # Tournament finish prediction
///
/// The field is ordered by most likely score (ties by player id) and the player's
/// 1-based position is the predicted finish.
pub fn predict_tournament_finish(player_id: i32, field: &[ScorePrediction]) -> RatingResult<TournamentPrediction> {
    let ordered = field
        .iter()
        .sorted_by(|a, b| {
            a.most_likely_score
                .cmp(&b.most_likely_score)
                .then(a.player_id.cmp(&b.player_id))
        })
        .collect_vec();

    let index = ordered
        .iter()
        .position(|p| p.player_id == player_id)
        .ok_or(RatingError::PlayerNotFound(player_id))?;
    let subject = ordered[index];

    let field_size = ordered.len();
    let predicted_finish = index + 1;
    let spread = ((field_size as f64 * FINISH_RANGE_FRACTION).round() as usize).max(1);
    let finish_range = (
        predicted_finish.saturating_sub(spread).max(1),
        (predicted_finish + spread).min(field_size)
    );

    let better_players = index as f64;
    let top_ten_probability = ((10.0 - better_players) / 10.0).clamp(MIN_TOP_TEN_PROBABILITY, MAX_TOP_TEN_PROBABILITY);
    let win_probability = (1.0 / field_size as f64) * subject.confidence;

    let key_matchups = ordered
        .iter()
        .filter(|p| p.player_id != player_id)
        .sorted_by_key(|p| ((p.most_likely_score - subject.most_likely_score).abs(), p.player_id))
        .take(MAX_KEY_MATCHUPS)
        .map(|p| Matchup {
            opponent_id: p.player_id,
            opponent_predicted_score: p.most_likely_score,
            win_probability: head_to_head(subject.most_likely_score, p.most_likely_score)
        })
        .collect();

    Ok(TournamentPrediction {
        player_id,
        predicted_finish,
        finish_range,
        top_ten_probability,
        win_probability,
        key_matchups
    })
}

/// `clamp(0.5 + (opponent - player) * 0.1, 0.05, 0.95)`
fn head_to_head(player_score: i32, opponent_score: i32) -> f64 {
    (0.5 + (opponent_score - player_score) as f64 * HEAD_TO_HEAD_PER_STROKE).clamp(MIN_HEAD_TO_HEAD, MAX_HEAD_TO_HEAD)
}

fn baseline(inputs: &PredictionInputs) -> RatingResult<f64> {
    let as_f64 = |scores: &[i32]| scores.iter().map(|s| *s as f64).collect_vec();

    let components = [
        (!inputs.course_scores.is_empty()).then(|| (mean(&as_f64(&inputs.course_scores)), COURSE_BASELINE_WEIGHT)),
        (!inputs.recent_scores.is_empty()).then(|| (mean(&as_f64(&inputs.recent_scores)), RECENT_BASELINE_WEIGHT)),
        inputs.handicap_expectation.map(|e| (e, HANDICAP_BASELINE_WEIGHT))
    ];

    let (weighted, total_weight) = components
        .iter()
        .flatten()
        .fold((0.0, 0.0), |(sum, weight), (value, w)| (sum + value * w, weight + w));

    if total_weight == 0.0 {
        return Err(RatingError::InsufficientData { required: 1, found: 0 });
    }

    Ok(weighted / total_weight)
}

/// Course history when there is any, otherwise recent scores.
fn history(inputs: &PredictionInputs) -> Vec<f64> {
    let scores = if inputs.course_scores.is_empty() {
        &inputs.recent_scores
    } else {
        &inputs.course_scores
    };

    scores.iter().map(|s| *s as f64).collect()
}
