use chrono::{DateTime, Duration, FixedOffset};
use tracing::debug;

use crate::{
    error::{RatingError, RatingResult},
    model::{
        constants::{
            DIFFERENTIAL_VOLATILITY_SCALE, HANDICAP_INDEX_MAX, HANDICAP_INDEX_MIN, HANDICAP_MULTIPLIER,
            MAX_HANDICAP_ROUNDS, MIN_HANDICAP_ROUNDS, REVISION_PERIOD_DAYS, STANDARD_SLOPE, TREND_THRESHOLD,
            TREND_WINDOW
        },
        stats::{mean, std_dev},
        structures::{
            handicap_index::{HandicapIndex, HandicapTrend, HandicapUpdate, TrendDirection},
            score_round::ScoreRound
        }
    }
};

/// `(totalScore - courseRating) * 113 / slope`
pub fn calculate_score_differential(round: &ScoreRound) -> f64 {
    round.score_differential()
}

/// How many of the lowest differentials are averaged for a given number of rounds.
///
/// | rounds | used |
/// |--------|------|
/// | 3-5    | 1    |
/// | 6-8    | 2    |
/// | 9-11   | 3    |
/// | 12-14  | 4    |
/// | 15-16  | 5    |
/// | 17     | 6    |
/// | 18     | 7    |
/// | 19+    | 8    |
pub fn lowest_differential_count(rounds: usize) -> usize {
    match rounds {
        0..=2 => 0,
        3..=5 => 1,
        6..=8 => 2,
        9..=11 => 3,
        12..=14 => 4,
        15..=16 => 5,
        17 => 6,
        18 => 7,
        _ => 8
    }
}

/// # Handicap index
///
/// 1. Keep the 20 most recent rounds (newest first).
/// 2. Compute each round's differential and sort them ascending.
/// 3. Average the lowest N (see [`lowest_differential_count`]) and multiply by 0.96.
/// 4. Clamp to [-5.0, 54.0].
///
/// The result is a pure function of `rounds` and `as_of`.
pub fn calculate_handicap_index(
    player_id: i32,
    rounds: &[ScoreRound],
    as_of: DateTime<FixedOffset>
) -> RatingResult<HandicapIndex> {
    if rounds.len() < MIN_HANDICAP_ROUNDS {
        return Err(RatingError::InsufficientScores {
            required: MIN_HANDICAP_ROUNDS,
            found: rounds.len()
        });
    }

    for round in rounds {
        round.validate()?;
    }

    let window = most_recent(rounds, MAX_HANDICAP_ROUNDS);
    let differentials: Vec<f64> = window.iter().map(|r| calculate_score_differential(r)).collect();

    let mut sorted = differentials.clone();
    sorted.sort_by(f64::total_cmp);

    let n = lowest_differential_count(sorted.len());
    let differentials_used: Vec<f64> = sorted.into_iter().take(n).collect();

    let index = (mean(&differentials_used) * HANDICAP_MULTIPLIER).clamp(HANDICAP_INDEX_MIN, HANDICAP_INDEX_MAX);

    debug!(
        player_id,
        rounds = window.len(),
        used = n,
        index,
        "Calculated handicap index"
    );

    Ok(HandicapIndex {
        player_id,
        index,
        calculation_date: as_of,
        differentials_used,
        rounds_considered: window.len(),
        trend: handicap_trend(&differentials),
        next_revision: as_of + Duration::days(REVISION_PERIOD_DAYS)
    })
}

/// `round((index * slope / 113) + (rating - par))`
pub fn course_handicap(index: f64, slope: i32, course_rating: f64, par: i32) -> RatingResult<i32> {
    if slope <= 0 {
        return Err(RatingError::InvalidInput(format!("slope must be positive, got {}", slope)));
    }

    Ok(((index * slope as f64 / STANDARD_SLOPE) + (course_rating - par as f64)).round() as i32)
}

/// Recomputes the index after `new_round` is added in front of the player's recent rounds.
///
/// Requires a previous index to compare against.
pub fn update_handicap_with_new_round(
    player_id: i32,
    current: Option<&HandicapIndex>,
    recent_rounds: &[ScoreRound],
    new_round: ScoreRound,
    as_of: DateTime<FixedOffset>
) -> RatingResult<HandicapUpdate> {
    let previous = current.ok_or(RatingError::NoCurrentHandicap(player_id))?;
    new_round.validate()?;

    let mut window = vec![new_round];
    window.extend(most_recent(recent_rounds, MAX_HANDICAP_ROUNDS - 1));

    let updated = calculate_handicap_index(player_id, &window, as_of)?;
    let delta = updated.index - previous.index;

    Ok(HandicapUpdate {
        previous: previous.clone(),
        current: updated,
        delta
    })
}

/// Splits newest-first differentials into the recent 5 and the 5 before them.
fn handicap_trend(differentials: &[f64]) -> HandicapTrend {
    let recent: Vec<f64> = differentials.iter().take(TREND_WINDOW).copied().collect();
    let prior: Vec<f64> = differentials
        .iter()
        .skip(TREND_WINDOW)
        .take(TREND_WINDOW)
        .copied()
        .collect();

    // Lower differentials are better
    let improvement = if prior.is_empty() {
        0.0
    } else {
        mean(&prior) - mean(&recent)
    };

    let direction = if improvement > TREND_THRESHOLD {
        TrendDirection::Improving
    } else if improvement < -TREND_THRESHOLD {
        TrendDirection::Deteriorating
    } else {
        TrendDirection::Stable
    };

    let volatility = (std_dev(differentials) / DIFFERENTIAL_VOLATILITY_SCALE).min(1.0);

    HandicapTrend {
        direction,
        improvement,
        volatility,
        consistency: 1.0 - volatility,
        monthly_improvement_rate: improvement * 2.0
    }
}

/// Returns up to `limit` rounds ordered newest first.
fn most_recent(rounds: &[ScoreRound], limit: usize) -> Vec<ScoreRound> {
    let mut sorted = rounds.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);

    sorted
}
