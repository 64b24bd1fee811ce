use chrono::{DateTime, FixedOffset};
use itertools::Itertools;
use tracing::debug;

use crate::{
    error::{RatingError, RatingResult},
    model::{
        constants::{
            CONFIDENCE_TOURNAMENTS, DEFAULT_RATING, ELO_SCALE, FINISH_VOLATILITY_SCALE, K_FACTOR, MAX_CONFIDENCE,
            RATING_MOMENTUM_WINDOW
        },
        stats::{mean, std_dev},
        structures::{
            competitive_rating::{
                CompetitiveRating, RatingAdjustment, RatingRecord, TournamentHistorySummary, TournamentResult
            },
            rating_adjustment_type::RatingAdjustmentType
        }
    }
};

/// `1 / (1 + 10^((field_average - rating) / 400))`
pub fn expected_score(rating: f64, field_average_rating: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((field_average_rating - rating) / ELO_SCALE))
}

/// `(field_size - finish) / (field_size - 1)`: 1.0 for a win, 0.0 for last place.
pub fn actual_score(finish_position: u32, field_size: u32) -> f64 {
    (field_size - finish_position) as f64 / (field_size - 1) as f64
}

/// A fresh rating seeded from `seed` (or the default of 1500).
pub fn initial_rating(player_id: i32, seed: Option<f64>, timestamp: DateTime<FixedOffset>) -> CompetitiveRating {
    let rating = seed.unwrap_or(DEFAULT_RATING);

    CompetitiveRating {
        player_id,
        rating,
        confidence: 0.0,
        volatility: 0.0,
        momentum: 0.0,
        history: TournamentHistorySummary {
            tournaments_played: 0,
            best_finish: None,
            average_finish: None,
            last_tournament_date: None
        },
        finishes: Vec::new(),
        applied_tournaments: Vec::new(),
        adjustments: vec![RatingAdjustment {
            player_id,
            tournament_id: None,
            rating_before: rating,
            rating_after: rating,
            expected: 0.0,
            actual: 0.0,
            timestamp,
            adjustment_type: RatingAdjustmentType::Initial
        }]
    }
}

/// # Competitive rating update
///
/// Produces the rating that follows `current` after `result`. The update is an ELO step:
///
/// - `expected = 1 / (1 + 10^((field_average - rating) / 400))`
/// - `actual = (field_size - finish) / (field_size - 1)`
/// - `rating += 32 * (actual - expected)`
///
/// Results must arrive in chronological order. A result dated before the last applied
/// result is rejected, so the recurrence is never computed against the wrong predecessor.
pub fn apply_tournament_result(
    current: &CompetitiveRating,
    result: &TournamentResult
) -> RatingResult<CompetitiveRating> {
    validate_result(result)?;

    if let Some(last_applied) = current.history.last_tournament_date {
        if result.date < last_applied {
            return Err(RatingError::OutOfOrderResult {
                tournament_id: result.tournament_id,
                date: result.date,
                last_applied
            });
        }
    }

    let field_average = result.field_average_rating.unwrap_or(DEFAULT_RATING);
    let expected = expected_score(current.rating, field_average);
    let actual = actual_score(result.finish_position, result.field_size);
    let rating_change = K_FACTOR * (actual - expected);
    let new_rating = current.rating + rating_change;

    debug!(
        player_id = current.player_id,
        tournament_id = result.tournament_id,
        expected,
        actual,
        rating_change,
        "Applied tournament result"
    );

    let mut finishes = current.finishes.clone();
    finishes.push(result.finish_position);

    let mut applied_tournaments = current.applied_tournaments.clone();
    applied_tournaments.push(result.tournament_id);

    let mut adjustments = current.adjustments.clone();
    adjustments.push(RatingAdjustment {
        player_id: current.player_id,
        tournament_id: Some(result.tournament_id),
        rating_before: current.rating,
        rating_after: new_rating,
        expected,
        actual,
        timestamp: result.date,
        adjustment_type: RatingAdjustmentType::Tournament
    });

    Ok(CompetitiveRating {
        player_id: current.player_id,
        rating: new_rating,
        confidence: confidence(finishes.len()),
        volatility: volatility(&finishes),
        momentum: momentum(&finishes),
        history: summarize(&finishes, Some(result.date)),
        finishes,
        applied_tournaments,
        adjustments
    })
}

/// Continues from a persisted rating. The derived metrics are rebuilt from the stored
/// finishes and the ledger restarts with a single entry at the stored value.
pub fn resume_rating(player_id: i32, record: &RatingRecord, timestamp: DateTime<FixedOffset>) -> CompetitiveRating {
    let mut rating = initial_rating(player_id, Some(record.rating), timestamp);

    rating.confidence = confidence(record.finishes.len());
    rating.volatility = volatility(&record.finishes);
    rating.momentum = momentum(&record.finishes);
    rating.history = summarize(&record.finishes, record.last_tournament_date);
    rating.finishes = record.finishes.clone();
    rating.applied_tournaments = record.applied_tournaments.clone();

    rating
}

/// Results from `results` that `current` has not absorbed yet, oldest first.
pub fn pending_results<'a>(current: &CompetitiveRating, results: &'a [TournamentResult]) -> Vec<&'a TournamentResult> {
    results
        .iter()
        .filter(|r| !current.applied_tournaments.contains(&r.tournament_id))
        .sorted_by_key(|r| r.date)
        .collect_vec()
}

/// Builds a rating from `prior` (or the seed) by applying `results` oldest first.
pub fn calculate_competitive_rating(
    player_id: i32,
    prior: Option<f64>,
    results: &[TournamentResult]
) -> RatingResult<CompetitiveRating> {
    let chronological = results.iter().sorted_by_key(|r| r.date).collect_vec();
    let first = chronological.first().ok_or(RatingError::NoTournamentHistory(player_id))?;

    chronological.iter().try_fold(initial_rating(player_id, prior, first.date), |rating, result| {
        apply_tournament_result(&rating, result)
    })
}

/// `min(0.9, tournaments / 20)`
fn confidence(tournaments: usize) -> f64 {
    (tournaments as f64 / CONFIDENCE_TOURNAMENTS).min(MAX_CONFIDENCE)
}

/// `min(1, std_dev(finishes) / 25)`
fn volatility(finishes: &[u32]) -> f64 {
    let positions: Vec<f64> = finishes.iter().map(|f| *f as f64).collect();

    (std_dev(&positions) / FINISH_VOLATILITY_SCALE).min(1.0)
}

/// `clamp(((latest - third_latest) / 3) / 10, -1, 1)`, 0 with fewer than 3 tournaments.
fn momentum(finishes: &[u32]) -> f64 {
    if finishes.len() < RATING_MOMENTUM_WINDOW {
        return 0.0;
    }

    let latest = finishes[finishes.len() - 1] as f64;
    let third_latest = finishes[finishes.len() - RATING_MOMENTUM_WINDOW] as f64;

    (((latest - third_latest) / 3.0) / 10.0).clamp(-1.0, 1.0)
}

fn summarize(finishes: &[u32], last_tournament_date: Option<DateTime<FixedOffset>>) -> TournamentHistorySummary {
    let positions: Vec<f64> = finishes.iter().map(|f| *f as f64).collect();

    TournamentHistorySummary {
        tournaments_played: finishes.len(),
        best_finish: finishes.iter().min().copied(),
        average_finish: (!positions.is_empty()).then(|| mean(&positions)),
        last_tournament_date
    }
}

fn validate_result(result: &TournamentResult) -> RatingResult<()> {
    if result.field_size < 2 {
        return Err(RatingError::InvalidInput(format!(
            "tournament {} has a field of {}, at least 2 players are required",
            result.tournament_id, result.field_size
        )));
    }

    if result.finish_position < 1 || result.finish_position > result.field_size {
        return Err(RatingError::InvalidInput(format!(
            "finish {} is outside the field of {} in tournament {}",
            result.finish_position, result.field_size, result.tournament_id
        )));
    }

    Ok(())
}
