//! Interfaces to the data this engine reads but does not own.
//!
//! Every call here may suspend. The service fetches everything an operation needs
//! through these traits first and only then runs the numeric code.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::model::structures::{
    competitive_rating::{RatingRecord, TournamentResult}, handicap_index::HandicapIndex, leaderboard::Leaderboard,
    score_round::ScoreRound, strokes_gained::Benchmark
};

pub mod memory;

pub use memory::{Dataset, InMemoryProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration)
}

#[async_trait]
pub trait ScorecardProvider: Send + Sync {
    /// Up to `limit` most recent rounds, newest first. Empty if the player has none.
    async fn recent_rounds(&self, player_id: i32, limit: usize) -> Result<Vec<ScoreRound>, ProviderError>;

    /// Rounds played within `[from, to]`, newest first.
    async fn rounds_in_range(
        &self,
        player_id: i32,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>
    ) -> Result<Vec<ScoreRound>, ProviderError>;
}

#[async_trait]
pub trait LeaderboardProvider: Send + Sync {
    async fn leaderboard(&self, leaderboard_id: i32) -> Result<Leaderboard, ProviderError>;
}

#[async_trait]
pub trait BenchmarkProvider: Send + Sync {
    /// Average strokes per category on the course. `NotFound` when the course has no benchmark.
    async fn benchmark(&self, course_id: i32) -> Result<Benchmark, ProviderError>;
}

#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn current_rating(&self, player_id: i32) -> Result<Option<RatingRecord>, ProviderError>;
    async fn persist_rating(&self, player_id: i32, record: RatingRecord) -> Result<(), ProviderError>;
    async fn current_handicap(&self, player_id: i32) -> Result<Option<HandicapIndex>, ProviderError>;
    async fn persist_handicap(&self, player_id: i32, handicap: HandicapIndex) -> Result<(), ProviderError>;
}

#[async_trait]
pub trait TournamentHistoryProvider: Send + Sync {
    /// Every tournament the player finished, oldest first.
    async fn recent_results(&self, player_id: i32) -> Result<Vec<TournamentResult>, ProviderError>;
}
