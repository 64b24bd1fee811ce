use crate::model::{
    competitive::initial_rating,
    live::{CourseSetup, LiveContext},
    prediction::PredictionInputs,
    structures::{
        competitive_rating::{CompetitiveRating, TournamentResult},
        handicap_index::{HandicapIndex, HandicapTrend, TrendDirection},
        leaderboard::{Leaderboard, LeaderboardConditions, LeaderboardEntry},
        live_update::LiveRatingUpdate,
        prediction::{CourseConditions, ScorePrediction, ScoreRange},
        score_round::ScoreRound,
        strokes_gained::{Benchmark, CategoryStrokes, HolePerformance}
    }
};
use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

/// Fixed reference time so generated data is reproducible.
pub fn test_time() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .and_then(|tz| tz.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single())
        .expect("valid test time")
}

/// A par 72 round on course 1, played `days_ago` days before [`test_time`].
pub fn generate_round(player_id: i32, total_score: i32, course_rating: f64, course_slope: i32, days_ago: i64) -> ScoreRound {
    ScoreRound {
        player_id,
        course_id: 1,
        date: test_time() - Duration::days(days_ago),
        total_score,
        course_rating,
        course_slope,
        par: 72,
        hole_scores: Vec::new()
    }
}

/// Rounds whose score differentials are exactly `differentials`, newest first.
pub fn generate_rounds_from_differentials(player_id: i32, differentials: &[f64]) -> Vec<ScoreRound> {
    differentials
        .iter()
        .enumerate()
        .map(|(i, d)| generate_round(player_id, 90, 90.0 - d, 113, i as i64))
        .collect()
}

pub fn generate_benchmark(course_id: i32, course_average: CategoryStrokes) -> Benchmark {
    Benchmark {
        course_id,
        course_average,
        holes: Vec::new()
    }
}

pub fn generate_hole(hole_number: u8, driving: f64, approach: f64, short_game: f64, putting: f64) -> HolePerformance {
    HolePerformance {
        hole_number,
        strokes: CategoryStrokes {
            driving,
            approach,
            short_game,
            putting
        }
    }
}

pub fn generate_tournament_result(
    tournament_id: i32,
    finish_position: u32,
    field_size: u32,
    days_after: i64,
    field_average_rating: Option<f64>
) -> TournamentResult {
    TournamentResult {
        tournament_id,
        finish_position,
        field_size,
        date: test_time() + Duration::days(days_after),
        field_average_rating
    }
}

pub fn generate_competitive_rating(player_id: i32, rating: f64) -> CompetitiveRating {
    initial_rating(player_id, Some(rating), test_time())
}

pub fn generate_handicap_index(player_id: i32, index: f64) -> HandicapIndex {
    HandicapIndex {
        player_id,
        index,
        calculation_date: test_time(),
        differentials_used: vec![index / 0.96],
        rounds_considered: 3,
        trend: HandicapTrend {
            direction: TrendDirection::Stable,
            improvement: 0.0,
            volatility: 0.0,
            consistency: 1.0,
            monthly_improvement_rate: 0.0
        },
        next_revision: test_time() + Duration::days(14)
    }
}

/// `entries` are `(player_id, score, reported position)`.
pub fn generate_leaderboard(id: i32, entries: &[(i32, i32, u32)]) -> Leaderboard {
    Leaderboard {
        id,
        entries: entries
            .iter()
            .map(|(player_id, score, position)| LeaderboardEntry {
                player_id: *player_id,
                score: *score,
                position: *position
            })
            .collect(),
        conditions: LeaderboardConditions::default()
    }
}

/// Inputs for course 1 with neutral form and conditions.
pub fn generate_prediction_inputs(
    player_id: i32,
    course_scores: Vec<i32>,
    recent_scores: Vec<i32>,
    handicap_expectation: Option<f64>
) -> PredictionInputs {
    PredictionInputs {
        player_id,
        course_id: 1,
        course_scores,
        recent_scores,
        handicap_expectation,
        form_score: 50.0,
        conditions: CourseConditions::default()
    }
}

pub fn generate_prediction(player_id: i32, most_likely_score: i32, confidence: f64) -> ScorePrediction {
    ScorePrediction {
        player_id,
        course_id: 1,
        range: ScoreRange {
            low: most_likely_score - 2,
            high: most_likely_score + 2
        },
        most_likely_score,
        confidence,
        factors: Vec::new()
    }
}

/// Par 72 course with a standard slope.
pub fn generate_course(course_id: i32) -> CourseSetup {
    CourseSetup {
        course_id,
        course_rating: 72.0,
        course_slope: 113,
        par: 72
    }
}

pub fn generate_live_context(
    baseline_rating: f64,
    consistency: f64,
    difficulty_adjustment: f64,
    expected_score: f64
) -> LiveContext {
    LiveContext {
        baseline_rating,
        consistency,
        difficulty_adjustment,
        expected_score
    }
}

pub fn generate_live_update(player_id: i32, current_hole: u8) -> LiveRatingUpdate {
    let current_score = current_hole as i32 * 5;

    LiveRatingUpdate {
        event_id: Uuid::new_v4(),
        player_id,
        current_hole,
        current_score,
        projected_final_score: 90,
        live_rating: 1500.0,
        rating_delta: 0.0,
        momentum: 0.0,
        timestamp: test_time()
    }
}

/// `n` rounds for one player, one per day going back from [`test_time`], newest first.
pub fn generate_random_rounds(player_id: i32, n: usize, seed: u64) -> Vec<ScoreRound> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n)
        .map(|i| {
            let mut round = generate_round(
                player_id,
                rng.random_range(72..=100),
                rng.random_range(68.0..=75.0),
                rng.random_range(105..=145),
                i as i64
            );
            round.course_id = rng.random_range(1..=5);
            round
        })
        .collect()
}

/// `n` results one week apart, oldest first, in fields of 20 to 150 players.
pub fn generate_random_tournament_history(n: usize, seed: u64) -> Vec<TournamentResult> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n)
        .map(|i| {
            let field_size = rng.random_range(20..=150);
            let finish = rng.random_range(1..=field_size);
            let field_average = rng.random_range(1300.0..=1700.0);

            generate_tournament_result(i as i32 + 1, finish, field_size, i as i64 * 7, Some(field_average))
        })
        .collect()
}

/// Prediction inputs for a field of `size` players with ids starting at 1.
pub fn generate_random_field(size: usize, seed: u64) -> Vec<PredictionInputs> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (1..=size as i32)
        .map(|player_id| {
            let skill: i32 = rng.random_range(70..=95);
            let course_scores = (0..rng.random_range(0..=8))
                .map(|_| skill + rng.random_range(-4..=4))
                .collect();
            let recent_scores = (0..10).map(|_| skill + rng.random_range(-5..=5)).collect();

            let mut inputs = generate_prediction_inputs(player_id, course_scores, recent_scores, Some(skill as f64));
            inputs.form_score = rng.random_range(20.0..=80.0);
            inputs
        })
        .collect()
}
