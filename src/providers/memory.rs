use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::Duration
};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    BenchmarkProvider, LeaderboardProvider, ProviderError, RatingStore, ScorecardProvider, TournamentHistoryProvider
};
use crate::model::structures::{
    competitive_rating::{RatingRecord, TournamentResult}, handicap_index::HandicapIndex, leaderboard::Leaderboard,
    score_round::ScoreRound, strokes_gained::Benchmark
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTournamentResult {
    pub player_id: i32,
    #[serde(flatten)]
    pub result: TournamentResult
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRating {
    pub player_id: i32,
    #[serde(flatten)]
    pub record: RatingRecord
}

impl StoredRating {
    pub fn new(player_id: i32, rating: f64) -> Self {
        Self {
            player_id,
            record: RatingRecord::new(rating)
        }
    }
}

/// Everything the batch CLI and the in-memory providers can be loaded from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub rounds: Vec<ScoreRound>,
    pub tournament_results: Vec<PlayerTournamentResult>,
    pub leaderboards: Vec<Leaderboard>,
    pub benchmarks: Vec<Benchmark>,
    pub ratings: Vec<StoredRating>,
    pub handicaps: Vec<HandicapIndex>
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, crate::config::ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&contents)?)
    }
}

/// Implements every collaborator trait over in-process maps.
///
/// Used by the batch CLI and the integration tests. `set_unavailable` and `set_latency`
/// simulate an outage or a slow backend.
#[derive(Default)]
pub struct InMemoryProvider {
    rounds: RwLock<HashMap<i32, Vec<ScoreRound>>>,
    tournaments: RwLock<HashMap<i32, Vec<TournamentResult>>>,
    leaderboards: RwLock<HashMap<i32, Leaderboard>>,
    benchmarks: RwLock<HashMap<i32, Benchmark>>,
    ratings: RwLock<HashMap<i32, RatingRecord>>,
    handicaps: RwLock<HashMap<i32, HandicapIndex>>,
    unavailable: AtomicBool,
    latency_ms: AtomicU64
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let mut rounds: HashMap<i32, Vec<ScoreRound>> = HashMap::new();
        for round in dataset.rounds {
            rounds.entry(round.player_id).or_default().push(round);
        }
        for player_rounds in rounds.values_mut() {
            player_rounds.sort_by(|a, b| b.date.cmp(&a.date));
        }

        let mut tournaments: HashMap<i32, Vec<TournamentResult>> = HashMap::new();
        for entry in dataset.tournament_results {
            tournaments.entry(entry.player_id).or_default().push(entry.result);
        }
        for results in tournaments.values_mut() {
            results.sort_by_key(|r| r.date);
        }

        Self {
            rounds: RwLock::new(rounds),
            tournaments: RwLock::new(tournaments),
            leaderboards: RwLock::new(dataset.leaderboards.into_iter().map(|l| (l.id, l)).collect()),
            benchmarks: RwLock::new(dataset.benchmarks.into_iter().map(|b| (b.course_id, b)).collect()),
            ratings: RwLock::new(dataset.ratings.into_iter().map(|r| (r.player_id, r.record)).collect()),
            handicaps: RwLock::new(dataset.handicaps.into_iter().map(|h| (h.player_id, h)).collect()),
            unavailable: AtomicBool::new(false),
            latency_ms: AtomicU64::new(0)
        }
    }

    /// Every player id that appears anywhere in the data, ascending.
    pub async fn player_ids(&self) -> Vec<i32> {
        let mut ids = BTreeSet::new();
        ids.extend(self.rounds.read().await.keys().copied());
        ids.extend(self.tournaments.read().await.keys().copied());
        ids.extend(self.ratings.read().await.keys().copied());

        ids.into_iter().collect()
    }

    pub async fn add_round(&self, round: ScoreRound) {
        let mut rounds = self.rounds.write().await;
        let player_rounds = rounds.entry(round.player_id).or_default();
        player_rounds.push(round);
        player_rounds.sort_by(|a, b| b.date.cmp(&a.date));
    }

    pub async fn add_tournament_result(&self, player_id: i32, result: TournamentResult) {
        let mut tournaments = self.tournaments.write().await;
        let results = tournaments.entry(player_id).or_default();
        results.push(result);
        results.sort_by_key(|r| r.date);
    }

    pub async fn add_leaderboard(&self, leaderboard: Leaderboard) {
        self.leaderboards.write().await.insert(leaderboard.id, leaderboard);
    }

    pub async fn add_benchmark(&self, benchmark: Benchmark) {
        self.benchmarks.write().await.insert(benchmark.course_id, benchmark);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn check_available(&self) -> Result<(), ProviderError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("in-memory provider is offline".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl ScorecardProvider for InMemoryProvider {
    async fn recent_rounds(&self, player_id: i32, limit: usize) -> Result<Vec<ScoreRound>, ProviderError> {
        self.check_available().await?;

        let rounds = self.rounds.read().await;
        let recent: Vec<ScoreRound> = rounds
            .get(&player_id)
            .map(|r| r.iter().take(limit).cloned().collect())
            .unwrap_or_default();

        debug!(player_id, limit, found = recent.len(), "Fetched recent rounds");
        Ok(recent)
    }

    async fn rounds_in_range(
        &self,
        player_id: i32,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>
    ) -> Result<Vec<ScoreRound>, ProviderError> {
        self.check_available().await?;

        let rounds = self.rounds.read().await;
        Ok(rounds
            .get(&player_id)
            .map(|r| r.iter().filter(|r| r.date >= from && r.date <= to).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl LeaderboardProvider for InMemoryProvider {
    async fn leaderboard(&self, leaderboard_id: i32) -> Result<Leaderboard, ProviderError> {
        self.check_available().await?;

        self.leaderboards
            .read()
            .await
            .get(&leaderboard_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("leaderboard {}", leaderboard_id)))
    }
}

#[async_trait]
impl BenchmarkProvider for InMemoryProvider {
    async fn benchmark(&self, course_id: i32) -> Result<Benchmark, ProviderError> {
        self.check_available().await?;

        self.benchmarks
            .read()
            .await
            .get(&course_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("benchmark for course {}", course_id)))
    }
}

#[async_trait]
impl RatingStore for InMemoryProvider {
    async fn current_rating(&self, player_id: i32) -> Result<Option<RatingRecord>, ProviderError> {
        self.check_available().await?;
        Ok(self.ratings.read().await.get(&player_id).cloned())
    }

    async fn persist_rating(&self, player_id: i32, record: RatingRecord) -> Result<(), ProviderError> {
        self.check_available().await?;
        self.ratings.write().await.insert(player_id, record);
        Ok(())
    }

    async fn current_handicap(&self, player_id: i32) -> Result<Option<HandicapIndex>, ProviderError> {
        self.check_available().await?;
        Ok(self.handicaps.read().await.get(&player_id).cloned())
    }

    async fn persist_handicap(&self, player_id: i32, handicap: HandicapIndex) -> Result<(), ProviderError> {
        self.check_available().await?;
        self.handicaps.write().await.insert(player_id, handicap);
        Ok(())
    }
}

#[async_trait]
impl TournamentHistoryProvider for InMemoryProvider {
    async fn recent_results(&self, player_id: i32) -> Result<Vec<TournamentResult>, ProviderError> {
        self.check_available().await?;

        Ok(self.tournaments.read().await.get(&player_id).cloned().unwrap_or_default())
    }
}
