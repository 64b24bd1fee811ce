use std::{collections::HashMap, future::Future, sync::Arc};

use chrono::{DateTime, FixedOffset};
use dashmap::{mapref::entry::Entry, DashMap};
use futures::future::try_join_all;
use itertools::Itertools;
use tokio::{
    sync::{Mutex, OwnedMutexGuard, RwLock},
    time::timeout
};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::EngineConfig,
    error::{RatingError, RatingResult},
    messaging::{LiveStream, LiveSubscription, LiveUpdatePublisher, PublisherError},
    model::{
        competitive::{apply_tournament_result, calculate_competitive_rating, pending_results, resume_rating},
        constants::{DEFAULT_RATING, FORM_BASELINE, MAX_HANDICAP_ROUNDS, SEASONAL_WINDOW, STANDARD_SLOPE},
        form::calculate_form_rating,
        handicap::{calculate_handicap_index, course_handicap, update_handicap_with_new_round},
        leaderboard::{dynamic_leaderboard, find_entry},
        live::{CourseSetup, LiveContext, LiveRound},
        prediction::{self, PredictionInputs},
        rating_tracker::{RankInfo, RatingTracker},
        strokes_gained::{analyze_round, analyze_skill_areas},
        structures::{
            competitive_rating::{CompetitiveRating, RatingRecord},
            form_rating::FormRating,
            handicap_index::{HandicapIndex, HandicapUpdate},
            leaderboard::{AdjustedLeaderboardEntry, LeaderboardConditions},
            live_update::LiveRatingUpdate,
            prediction::{CourseConditions, ScorePrediction, TournamentPrediction},
            round_state::RoundState,
            score_round::ScoreRound,
            strokes_gained::{HolePerformance, SkillAreaAnalysis, StrokesGainedResult}
        }
    },
    providers::{
        BenchmarkProvider, LeaderboardProvider, ProviderError, RatingStore, ScorecardProvider,
        TournamentHistoryProvider
    }
};

/// The collaborators a [`RatingService`] reads from and writes to.
#[derive(Clone)]
pub struct Providers {
    pub scorecards: Arc<dyn ScorecardProvider>,
    pub leaderboards: Arc<dyn LeaderboardProvider>,
    pub benchmarks: Arc<dyn BenchmarkProvider>,
    pub store: Arc<dyn RatingStore>,
    pub tournaments: Arc<dyn TournamentHistoryProvider>
}

impl Providers {
    /// Uses one value for every collaborator.
    pub fn from_single<P>(provider: Arc<P>) -> Self
    where
        P: ScorecardProvider
            + LeaderboardProvider
            + BenchmarkProvider
            + RatingStore
            + TournamentHistoryProvider
            + 'static
    {
        Self {
            scorecards: provider.clone(),
            leaderboards: provider.clone(),
            benchmarks: provider.clone(),
            store: provider.clone(),
            tournaments: provider
        }
    }
}

/// A live round after its last hole.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRound {
    pub round: ScoreRound,
    pub handicap: HandicapIndex,
    /// Change against the previous index, if the player had one
    pub delta: Option<f64>
}

/// Runs every rating operation in two phases: fetch what the computation needs from the
/// providers (with a timeout), then run the pure computation from [`crate::model`].
///
/// Writers of a player's handicap or competitive rating hold that player's lock, so
/// updates for one player apply one at a time while different players proceed in parallel.
pub struct RatingService {
    providers: Providers,
    config: EngineConfig,
    tracker: RwLock<RatingTracker>,
    player_locks: DashMap<i32, Arc<Mutex<()>>>,
    publisher: Arc<LiveUpdatePublisher>,
    live_rounds: DashMap<i32, LiveRound>
}

impl RatingService {
    pub fn new(providers: Providers, config: EngineConfig, publisher: Arc<LiveUpdatePublisher>) -> Self {
        Self {
            providers,
            config,
            tracker: RwLock::new(RatingTracker::new()),
            player_locks: DashMap::new(),
            publisher,
            live_rounds: DashMap::new()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn publisher(&self) -> &Arc<LiveUpdatePublisher> {
        &self.publisher
    }

    /// Handicap index from the player's most recent rounds. The result is persisted and cached.
    #[instrument(skip(self))]
    pub async fn handicap_index(&self, player_id: i32, as_of: DateTime<FixedOffset>) -> RatingResult<HandicapIndex> {
        let _guard = self.lock_player(player_id).await;

        let rounds = self
            .fetch(
                "recent_rounds",
                player_id,
                self.providers.scorecards.recent_rounds(player_id, MAX_HANDICAP_ROUNDS)
            )
            .await?;

        let index = calculate_handicap_index(player_id, &rounds, as_of)?;
        self.store_handicap(index.clone()).await?;

        info!(player_id, index = index.index, rounds = index.rounds_considered, "Calculated handicap index");
        Ok(index)
    }

    /// Handicap index from the rounds played in `[from, to]`. Not persisted.
    #[instrument(skip(self))]
    pub async fn handicap_for_period(
        &self,
        player_id: i32,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>
    ) -> RatingResult<HandicapIndex> {
        let mut rounds = self
            .fetch(
                "rounds_in_range",
                player_id,
                self.providers.scorecards.rounds_in_range(player_id, from, to)
            )
            .await?;

        if rounds.is_empty() {
            return Err(RatingError::NoDataForPeriod { player_id, from, to });
        }

        rounds.sort_by(|a, b| b.date.cmp(&a.date));
        rounds.truncate(MAX_HANDICAP_ROUNDS);

        calculate_handicap_index(player_id, &rounds, to)
    }

    /// Strokes the player receives on a course, from their current index.
    pub async fn course_handicap(&self, player_id: i32, slope: i32, course_rating: f64, par: i32) -> RatingResult<i32> {
        let handicap = self
            .current_handicap(player_id)
            .await?
            .ok_or(RatingError::NoCurrentHandicap(player_id))?;

        course_handicap(handicap.index, slope, course_rating, par)
    }

    /// Recomputes the index with `new_round` added. Requires an existing index.
    #[instrument(skip(self, new_round), fields(course_id = new_round.course_id))]
    pub async fn update_handicap(
        &self,
        player_id: i32,
        new_round: ScoreRound,
        as_of: DateTime<FixedOffset>
    ) -> RatingResult<HandicapUpdate> {
        let _guard = self.lock_player(player_id).await;
        let current = self.current_handicap(player_id).await?;

        self.apply_new_round(player_id, current.as_deref(), new_round, as_of).await
    }

    pub async fn strokes_gained(
        &self,
        player_id: i32,
        course_id: i32,
        holes: &[HolePerformance]
    ) -> RatingResult<StrokesGainedResult> {
        let benchmark = self
            .fetch("benchmark", player_id, self.providers.benchmarks.benchmark(course_id))
            .await?;

        analyze_round(holes, &benchmark)
    }

    /// Aggregates strokes gained over several rounds, each given as `(course_id, holes)`.
    pub async fn skill_areas(
        &self,
        player_id: i32,
        rounds: &[(i32, Vec<HolePerformance>)]
    ) -> RatingResult<SkillAreaAnalysis> {
        let course_ids = rounds.iter().map(|(course_id, _)| *course_id).unique().collect_vec();
        let benchmarks = try_join_all(
            course_ids
                .iter()
                .map(|course_id| self.fetch("benchmark", player_id, self.providers.benchmarks.benchmark(*course_id)))
        )
        .await?;
        let benchmarks: HashMap<i32, _> = course_ids.into_iter().zip(benchmarks).collect();

        let results = rounds
            .iter()
            .map(|(course_id, holes)| match benchmarks.get(course_id) {
                Some(benchmark) => analyze_round(holes, benchmark),
                None => Err(RatingError::InvalidInput(format!("no benchmark for course {}", course_id)))
            })
            .collect::<RatingResult<Vec<_>>>()?;

        analyze_skill_areas(&results)
    }

    #[instrument(skip(self))]
    pub async fn form_rating(&self, player_id: i32) -> RatingResult<FormRating> {
        let rounds = self
            .fetch(
                "recent_rounds",
                player_id,
                self.providers
                    .scorecards
                    .recent_rounds(player_id, SEASONAL_WINDOW.max(self.config.form_window))
            )
            .await?;

        calculate_form_rating(
            player_id,
            &rounds,
            self.config.form_window,
            self.config.policy.anomaly_sigma
        )
    }

    /// Brings the player's competitive rating up to date with their tournament history.
    ///
    /// The cached snapshot, or else the stored record, is advanced by the results it has not
    /// absorbed yet. Only a player with no prior rating starts from the seed. The new value
    /// is persisted and replaces the cached snapshot.
    #[instrument(skip(self))]
    pub async fn update_competitive_rating(&self, player_id: i32) -> RatingResult<CompetitiveRating> {
        let _guard = self.lock_player(player_id).await;

        let results = self
            .fetch(
                "recent_results",
                player_id,
                self.providers.tournaments.recent_results(player_id)
            )
            .await?;

        if results.is_empty() {
            return Err(RatingError::NoTournamentHistory(player_id));
        }

        let cached = self.tracker.read().await.get_rating(player_id);
        let base = match cached {
            Some(snapshot) => Some(snapshot.as_ref().clone()),
            None => self
                .fetch(
                    "current_rating",
                    player_id,
                    self.providers.store.current_rating(player_id)
                )
                .await?
                .map(|record| {
                    let since = record.last_tournament_date.unwrap_or(results[0].date);
                    resume_rating(player_id, &record, since)
                })
        };

        let rating = match base {
            Some(current) => {
                let pending = pending_results(&current, &results);

                if pending.is_empty() {
                    debug!(player_id, "Competitive rating already up to date");
                    self.tracker.write().await.insert_or_update(std::slice::from_ref(&current));
                    return Ok(current);
                }

                pending
                    .into_iter()
                    .try_fold(current, |rating, result| apply_tournament_result(&rating, result))?
            }
            None => calculate_competitive_rating(player_id, None, &results)?
        };

        self.fetch(
            "persist_rating",
            player_id,
            self.providers.store.persist_rating(player_id, RatingRecord::from(&rating))
        )
        .await?;
        self.tracker.write().await.insert_or_update(std::slice::from_ref(&rating));

        info!(
            player_id,
            rating = rating.rating,
            tournaments = rating.history.tournaments_played,
            "Updated competitive rating"
        );
        Ok(rating)
    }

    /// The player's rating shifted by the field tier and conditions offsets.
    pub async fn field_adjusted_rating(&self, player_id: i32, conditions: &LeaderboardConditions) -> RatingResult<f64> {
        let rating = self
            .current_rating(player_id)
            .await?
            .ok_or(RatingError::PlayerNotFound(player_id))?;

        Ok(self.config.policy.adjust_rating(rating, conditions))
    }

    pub async fn rank(&self, player_id: i32) -> Option<RankInfo> {
        self.tracker.read().await.get_rank(player_id)
    }

    /// Drops the cached snapshots of the player; the next read goes to the store.
    pub async fn invalidate(&self, player_id: i32) {
        self.tracker.write().await.invalidate(player_id);
    }

    #[instrument(skip(self, conditions))]
    pub async fn predict_score_range(
        &self,
        player_id: i32,
        course_id: i32,
        conditions: CourseConditions
    ) -> RatingResult<ScorePrediction> {
        let inputs = self.prediction_inputs(player_id, course_id, conditions).await?;

        prediction::predict_score_range(&inputs)
    }

    pub async fn score_probabilities(
        &self,
        player_id: i32,
        course_id: i32,
        conditions: CourseConditions,
        targets: &[i32]
    ) -> RatingResult<Vec<(i32, f64)>> {
        let prediction = self.predict_score_range(player_id, course_id, conditions).await?;

        Ok(prediction::score_probabilities(targets, &prediction))
    }

    /// Predicts every member of `field` on the course and places `player_id` among them.
    #[instrument(skip(self, field, conditions), fields(field_size = field.len()))]
    pub async fn predict_tournament_finish(
        &self,
        player_id: i32,
        field: &[i32],
        course_id: i32,
        conditions: CourseConditions
    ) -> RatingResult<TournamentPrediction> {
        if !field.contains(&player_id) {
            return Err(RatingError::PlayerNotFound(player_id));
        }

        let inputs = try_join_all(
            field
                .iter()
                .unique()
                .map(|id| self.prediction_inputs(*id, course_id, conditions))
        )
        .await?;

        let predictions = prediction::predict_field(&inputs)?;
        prediction::predict_tournament_finish(player_id, &predictions)
    }

    /// Positions recomputed from scores, each with the field adjusted rating.
    #[instrument(skip(self))]
    pub async fn dynamic_leaderboard(&self, leaderboard_id: i32) -> RatingResult<Vec<AdjustedLeaderboardEntry>> {
        let leaderboard = self
            .fetch(
                "leaderboard",
                0,
                self.providers.leaderboards.leaderboard(leaderboard_id)
            )
            .await?;

        let ratings = try_join_all(leaderboard.entries.iter().map(|e| async move {
            self.current_rating(e.player_id)
                .await
                .map(|rating| rating.map(|r| (e.player_id, r)))
        }))
        .await?
        .into_iter()
        .flatten()
        .collect::<HashMap<_, _>>();

        Ok(dynamic_leaderboard(&leaderboard, &ratings, &self.config.policy))
    }

    pub async fn leaderboard_position(
        &self,
        leaderboard_id: i32,
        player_id: i32
    ) -> RatingResult<AdjustedLeaderboardEntry> {
        let leaderboard = self
            .fetch(
                "leaderboard",
                player_id,
                self.providers.leaderboards.leaderboard(leaderboard_id)
            )
            .await?;
        find_entry(&leaderboard, player_id)?;

        self.dynamic_leaderboard(leaderboard_id)
            .await?
            .into_iter()
            .find(|e| e.player_id == player_id)
            .ok_or(RatingError::PlayerNotInLeaderboard {
                player_id,
                leaderboard_id
            })
    }

    /// Starts following a round. A player can have one round in progress at a time.
    #[instrument(skip(self, course), fields(course_id = course.course_id))]
    pub async fn start_live_round(&self, player_id: i32, course: CourseSetup) -> RatingResult<()> {
        let _guard = self.lock_player(player_id).await;

        if let Some(existing) = self.live_rounds.get(&player_id) {
            ensure_not_in_progress(existing.state())?;
        }

        let context = self.live_context(player_id, &course).await?;
        debug!(player_id, expected_score = context.expected_score, "Live round context");

        // A hole may have been recorded while the context was fetched
        let round = LiveRound::new(player_id, course, context);
        match self.live_rounds.entry(player_id) {
            Entry::Occupied(mut existing) => {
                ensure_not_in_progress(existing.get().state())?;
                existing.insert(round);
            }
            Entry::Vacant(slot) => {
                slot.insert(round);
            }
        }

        info!(player_id, "Live round started");

        Ok(())
    }

    /// Records the next hole and publishes the resulting update.
    pub fn record_live_hole(
        &self,
        player_id: i32,
        strokes: i32,
        timestamp: DateTime<FixedOffset>
    ) -> RatingResult<LiveRatingUpdate> {
        let update = match self.live_rounds.get_mut(&player_id) {
            Some(mut round) => round.record_hole(strokes, timestamp)?,
            None => {
                return Err(RatingError::InvalidRoundTransition {
                    action: "record a hole on",
                    state: RoundState::NotStarted.to_string()
                })
            }
        };

        match self.publisher.publish(update.clone()) {
            Ok(delivered) => debug!(player_id, hole = update.current_hole, delivered, "Published live update"),
            Err(PublisherError::Disabled) => debug!(player_id, "Live feed disabled, update not published")
        }

        Ok(update)
    }

    /// Completes the round and feeds it into the player's handicap.
    ///
    /// With an existing index this is a regular handicap update. Otherwise a first index is
    /// calculated from the player's recent rounds plus this one. If the update fails the
    /// round is left in progress.
    #[instrument(skip(self))]
    pub async fn complete_live_round(
        &self,
        player_id: i32,
        timestamp: DateTime<FixedOffset>
    ) -> RatingResult<CompletedRound> {
        let _guard = self.lock_player(player_id).await;

        let round = match self.live_rounds.get(&player_id) {
            Some(live) => live.finished_round(timestamp)?,
            None => {
                return Err(RatingError::InvalidRoundTransition {
                    action: "complete",
                    state: RoundState::NotStarted.to_string()
                })
            }
        };

        let current = self.current_handicap(player_id).await?;

        let completed = match current {
            Some(previous) => {
                let update = self
                    .apply_new_round(player_id, Some(previous.as_ref()), round.clone(), timestamp)
                    .await?;

                CompletedRound {
                    round,
                    handicap: update.current,
                    delta: Some(update.delta)
                }
            }
            None => {
                let mut rounds = self.recent_rounds_without(player_id, &round).await?;
                rounds.insert(0, round.clone());
                rounds.truncate(MAX_HANDICAP_ROUNDS);

                let handicap = calculate_handicap_index(player_id, &rounds, timestamp)?;
                self.store_handicap(handicap.clone()).await?;

                CompletedRound {
                    round,
                    handicap,
                    delta: None
                }
            }
        };

        // Dropped only after the new handicap is persisted
        self.live_rounds.remove(&player_id);

        info!(
            player_id,
            score = completed.round.total_score,
            index = completed.handicap.index,
            "Live round completed"
        );
        Ok(completed)
    }

    pub fn live_round_state(&self, player_id: i32) -> RoundState {
        self.live_rounds
            .get(&player_id)
            .map(|r| r.state())
            .unwrap_or_default()
    }

    pub fn subscribe(&self, player_id: i32) -> Result<LiveSubscription, PublisherError> {
        self.publisher.subscribe(player_id)
    }

    pub fn subscribe_many(&self, player_ids: &[i32]) -> Result<LiveStream, PublisherError> {
        self.publisher.subscribe_many(player_ids)
    }

    /// Caller must hold the player's lock.
    async fn apply_new_round(
        &self,
        player_id: i32,
        current: Option<&HandicapIndex>,
        new_round: ScoreRound,
        as_of: DateTime<FixedOffset>
    ) -> RatingResult<HandicapUpdate> {
        let recent = self.recent_rounds_without(player_id, &new_round).await?;
        let update = update_handicap_with_new_round(player_id, current, &recent, new_round, as_of)?;
        self.store_handicap(update.current.clone()).await?;

        info!(
            player_id,
            previous = update.previous.index,
            current = update.current.index,
            delta = update.delta,
            "Updated handicap index"
        );
        Ok(update)
    }

    /// The provider may already list the round being added; it must only count once.
    async fn recent_rounds_without(&self, player_id: i32, round: &ScoreRound) -> RatingResult<Vec<ScoreRound>> {
        let rounds = self
            .fetch(
                "recent_rounds",
                player_id,
                self.providers.scorecards.recent_rounds(player_id, MAX_HANDICAP_ROUNDS)
            )
            .await?;

        Ok(rounds.into_iter().filter(|r| r != round).collect())
    }

    async fn store_handicap(&self, handicap: HandicapIndex) -> RatingResult<()> {
        let player_id = handicap.player_id;
        self.fetch(
            "persist_handicap",
            player_id,
            self.providers.store.persist_handicap(player_id, handicap.clone())
        )
        .await?;
        self.tracker.write().await.insert_handicap(handicap);

        Ok(())
    }

    async fn current_handicap(&self, player_id: i32) -> RatingResult<Option<Arc<HandicapIndex>>> {
        if let Some(cached) = self.tracker.read().await.get_handicap(player_id) {
            return Ok(Some(cached));
        }

        let stored = self
            .fetch(
                "current_handicap",
                player_id,
                self.providers.store.current_handicap(player_id)
            )
            .await?;

        Ok(stored.map(Arc::new))
    }

    async fn current_rating(&self, player_id: i32) -> RatingResult<Option<f64>> {
        if let Some(cached) = self.tracker.read().await.get_rating(player_id) {
            return Ok(Some(cached.rating));
        }

        let stored = self
            .fetch(
                "current_rating",
                player_id,
                self.providers.store.current_rating(player_id)
            )
            .await?;

        Ok(stored.map(|record| record.rating))
    }

    /// Gathers the player's history for a prediction on `course_id`.
    async fn prediction_inputs(
        &self,
        player_id: i32,
        course_id: i32,
        conditions: CourseConditions
    ) -> RatingResult<PredictionInputs> {
        let rounds = self
            .fetch(
                "recent_rounds",
                player_id,
                self.providers.scorecards.recent_rounds(player_id, SEASONAL_WINDOW)
            )
            .await?;
        let handicap = self.current_handicap(player_id).await?;

        let course_rounds = rounds.iter().filter(|r| r.course_id == course_id).collect_vec();
        let handicap_expectation = handicap.zip(course_rounds.first()).map(|(handicap, round)| {
            round.course_rating + handicap.index * round.course_slope as f64 / STANDARD_SLOPE
        });

        let form_score = if rounds.is_empty() {
            FORM_BASELINE
        } else {
            calculate_form_rating(
                player_id,
                &rounds,
                self.config.form_window,
                self.config.policy.anomaly_sigma
            )
            .map(|form| form.current_form)
            .unwrap_or(FORM_BASELINE)
        };

        Ok(PredictionInputs {
            player_id,
            course_id,
            course_scores: course_rounds.iter().map(|r| r.total_score).collect(),
            recent_scores: rounds.iter().map(|r| r.total_score).collect(),
            handicap_expectation,
            form_score,
            conditions
        })
    }

    /// Baseline rating, consistency and usual score for a live round on `course`.
    async fn live_context(&self, player_id: i32, course: &CourseSetup) -> RatingResult<LiveContext> {
        let baseline_rating = self.current_rating(player_id).await?.unwrap_or(DEFAULT_RATING);
        let handicap = self.current_handicap(player_id).await?;
        let rounds = self
            .fetch(
                "recent_rounds",
                player_id,
                self.providers.scorecards.recent_rounds(player_id, self.config.form_window)
            )
            .await?;

        let consistency = match calculate_form_rating(
            player_id,
            &rounds,
            self.config.form_window,
            self.config.policy.anomaly_sigma
        ) {
            Ok(form) => form.consistency,
            Err(_) => 0.5
        };

        let expected_score = match handicap {
            Some(handicap) => course.course_rating + handicap.index * course.course_slope as f64 / STANDARD_SLOPE,
            None if !rounds.is_empty() => {
                rounds.iter().map(|r| r.total_score as f64).sum::<f64>() / rounds.len() as f64
            }
            None => course.par as f64
        };

        Ok(LiveContext {
            baseline_rating,
            consistency,
            difficulty_adjustment: course.course_rating - course.par as f64,
            expected_score
        })
    }

    async fn lock_player(&self, player_id: i32) -> PlayerGuard<'_> {
        let lock = Arc::clone(&self.player_locks.entry(player_id).or_default());

        PlayerGuard {
            locks: &self.player_locks,
            player_id,
            guard: Some(lock.lock_owned().await)
        }
    }

    /// Awaits a collaborator call under the configured timeout and tags failures with the
    /// operation and player.
    async fn fetch<T, F>(&self, operation: &'static str, player_id: i32, call: F) -> RatingResult<T>
    where
        F: Future<Output = Result<T, ProviderError>>
    {
        match timeout(self.config.fetch_timeout, call).await {
            Ok(result) => result.map_err(|source| {
                warn!(operation, player_id, error = %source, "Provider call failed");
                RatingError::provider(operation, player_id)(source)
            }),
            Err(_) => {
                warn!(operation, player_id, timeout = ?self.config.fetch_timeout, "Provider call timed out");
                Err(RatingError::provider(operation, player_id)(ProviderError::Timeout(
                    self.config.fetch_timeout
                )))
            }
        }
    }
}

fn ensure_not_in_progress(state: RoundState) -> RatingResult<()> {
    if state == RoundState::InProgress {
        return Err(RatingError::InvalidRoundTransition {
            action: "start",
            state: state.to_string()
        });
    }

    Ok(())
}

/// A held player lock. The lock's map entry is removed when the last holder or waiter is done.
struct PlayerGuard<'a> {
    locks: &'a DashMap<i32, Arc<Mutex<()>>>,
    player_id: i32,
    guard: Option<OwnedMutexGuard<()>>
}

impl Drop for PlayerGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Waiters hold their own clone of the lock
        self.locks.remove_if(&self.player_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
