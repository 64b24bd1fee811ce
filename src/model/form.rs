use tracing::debug;

use crate::{
    error::{RatingError, RatingResult},
    model::{
        constants::{
            DEFAULT_FORM_WINDOW, FORM_BASELINE, FORM_CONSISTENCY_SCALE, FORM_POINTS_PER_STROKE, FORM_RECENT_WINDOW,
            MEDIUM_TERM_WINDOW, MOMENTUM_THRESHOLD, MOMENTUM_WINDOW, SEASONAL_WINDOW, SHORT_TERM_WINDOW,
            STREAK_LOOKBACK, STREAK_THRESHOLD
        },
        stats::{mean, recent_slope, std_dev},
        structures::{
            form_rating::{FormRating, FormTrend, Momentum, MomentumDirection, Streak, StreakKind},
            score_round::ScoreRound
        }
    }
};

/// # Form rating
///
/// Works on score differentials ordered newest first:
/// - `current_form = clamp(50 + (window_avg - recent_5_avg) * 10, 0, 100)`
/// - momentum from the slope of the last 3 differentials
/// - consistency `max(0, 1 - std_dev / 5)`
/// - streak from the change against the round 3 rounds ago
/// - trend slopes over the last 3, 10 and 20 rounds
///
/// `rounds` may hold more than `recent_round_count` rounds; the extra rounds only feed the
/// medium and seasonal trend.
pub fn calculate_form_rating(
    player_id: i32,
    rounds: &[ScoreRound],
    recent_round_count: usize,
    anomaly_sigma: f64
) -> RatingResult<FormRating> {
    let mut sorted = rounds.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    let differentials: Vec<f64> = sorted
        .iter()
        .take(SEASONAL_WINDOW.max(recent_round_count))
        .map(|r| r.score_differential())
        .collect();

    form_from_differentials(player_id, &differentials, recent_round_count, anomaly_sigma)
}

/// Same as [`calculate_form_rating`] for differentials that are already ordered newest first.
pub fn form_from_differentials(
    player_id: i32,
    differentials: &[f64],
    recent_round_count: usize,
    anomaly_sigma: f64
) -> RatingResult<FormRating> {
    let window_size = if recent_round_count == 0 {
        DEFAULT_FORM_WINDOW
    } else {
        recent_round_count
    };
    let window: Vec<f64> = differentials.iter().take(window_size).copied().collect();

    if window.is_empty() {
        return Err(RatingError::NoRecentScores(player_id));
    }

    let recent: Vec<f64> = window.iter().take(FORM_RECENT_WINDOW).copied().collect();
    let form_improvement = mean(&window) - mean(&recent);
    let current_form = (FORM_BASELINE + form_improvement * FORM_POINTS_PER_STROKE).clamp(0.0, 100.0);

    let consistency = (1.0 - std_dev(&window) / FORM_CONSISTENCY_SCALE).max(0.0);
    let recent_best = window.iter().copied().fold(f64::INFINITY, f64::min);

    debug!(player_id, rounds = window.len(), current_form, consistency, "Calculated form rating");

    Ok(FormRating {
        player_id,
        current_form,
        momentum: momentum(&window),
        consistency,
        recent_best,
        streak: streak(&window),
        trend: FormTrend {
            short_term: recent_slope(differentials, SHORT_TERM_WINDOW),
            medium_term: recent_slope(differentials, MEDIUM_TERM_WINDOW),
            seasonal: recent_slope(differentials, SEASONAL_WINDOW)
        },
        rounds_analyzed: window.len(),
        anomalous_rounds: anomalous_rounds(&window, anomaly_sigma)
    })
}

/// A falling differential is good, so a negative slope is positive momentum.
fn momentum(window: &[f64]) -> Momentum {
    let slope = recent_slope(window, MOMENTUM_WINDOW);

    let direction = if slope < -MOMENTUM_THRESHOLD {
        MomentumDirection::Positive
    } else if slope > MOMENTUM_THRESHOLD {
        MomentumDirection::Negative
    } else {
        MomentumDirection::Neutral
    };

    Momentum {
        direction,
        strength: slope.abs().min(1.0)
    }
}

/// Classifies the streak by comparing the latest differential with the one
/// `STREAK_LOOKBACK` rounds earlier (or the oldest available), then counts how many
/// consecutive rounds, starting from the latest, continue that pattern.
fn streak(window: &[f64]) -> Streak {
    let latest = window[0];
    let lookback = STREAK_LOOKBACK.min(window.len() - 1);
    let change = latest - window[lookback];

    let kind = if change < -STREAK_THRESHOLD {
        StreakKind::Improvement
    } else if change > STREAK_THRESHOLD {
        StreakKind::Decline
    } else {
        StreakKind::Stable
    };

    let continues = |newer: f64, older: f64| match kind {
        StreakKind::Improvement => newer < older,
        StreakKind::Decline => newer > older,
        StreakKind::Stable => (older - latest).abs() <= STREAK_THRESHOLD
    };

    let length = 1 + window
        .windows(2)
        .take_while(|pair| continues(pair[0], pair[1]))
        .count();

    Streak {
        kind,
        length: length.min(window.len())
    }
}

fn anomalous_rounds(window: &[f64], sigma: f64) -> Vec<usize> {
    let sd = std_dev(window);
    if sd == 0.0 {
        return Vec::new();
    }

    let avg = mean(window);
    window
        .iter()
        .enumerate()
        .filter(|(_, d)| (*d - avg).abs() > sigma * sd)
        .map(|(i, _)| i)
        .collect()
}
