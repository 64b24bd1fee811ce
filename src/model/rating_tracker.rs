use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::Arc
};

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;

use crate::model::structures::{competitive_rating::CompetitiveRating, handicap_index::HandicapIndex};

/// Latest snapshots per player.
///
/// Snapshots are shared as `Arc`s and are only ever replaced. A reader holding an older
/// `Arc` keeps a consistent view while a newer snapshot is stored.
pub struct RatingTracker {
    // Sorted by rating, descending. Ranks and percentiles are derived from the position.
    leaderboard: IndexMap<i32, Arc<CompetitiveRating>>,
    handicaps: HashMap<i32, Arc<HandicapIndex>>
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankInfo {
    pub rank: usize,
    pub percentile: f64
}

impl Default for RatingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingTracker {
    pub fn new() -> RatingTracker {
        RatingTracker {
            leaderboard: IndexMap::new(),
            handicaps: HashMap::new()
        }
    }

    /// Inserts or replaces a set of ratings, then sorts the leaderboard once.
    pub fn insert_or_update(&mut self, ratings: &[CompetitiveRating]) {
        for rating in ratings {
            self.leaderboard.insert(rating.player_id, Arc::new(rating.clone()));
        }

        self.sort();
    }

    pub fn get_rating(&self, player_id: i32) -> Option<Arc<CompetitiveRating>> {
        self.leaderboard.get(&player_id).cloned()
    }

    /// Date of the last tournament applied to the player's rating.
    pub fn last_applied(&self, player_id: i32) -> Option<DateTime<FixedOffset>> {
        self.leaderboard
            .get(&player_id)
            .and_then(|r| r.history.last_tournament_date)
    }

    pub fn get_rank(&self, player_id: i32) -> Option<RankInfo> {
        let index = self.leaderboard.get_index_of(&player_id)?;
        let rank = index + 1;

        RatingTracker::percentile(rank as i32, self.leaderboard.len() as i32).map(|percentile| RankInfo { rank, percentile })
    }

    pub fn insert_handicap(&mut self, handicap: HandicapIndex) {
        self.handicaps.insert(handicap.player_id, Arc::new(handicap));
    }

    pub fn get_handicap(&self, player_id: i32) -> Option<Arc<HandicapIndex>> {
        self.handicaps.get(&player_id).cloned()
    }

    /// Drops every cached snapshot of the player.
    pub fn invalidate(&mut self, player_id: i32) {
        self.leaderboard.shift_remove(&player_id);
        self.handicaps.remove(&player_id);
    }

    pub fn len(&self) -> usize {
        self.leaderboard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaderboard.is_empty()
    }

    /// Players ordered from highest to lowest rating.
    pub fn ranked(&self) -> impl Iterator<Item = &Arc<CompetitiveRating>> {
        self.leaderboard.values()
    }

    fn sort(&mut self) {
        self.leaderboard
            .sort_by(|k1, v1, k2, v2| v2.rating.total_cmp(&v1.rating).then(k1.cmp(k2)));
    }

    /// `P = (n/N) * 100` where `n` is the number of players ranked below.
    pub fn percentile(rank: i32, total: i32) -> Option<f64> {
        match rank.cmp(&1) {
            Ordering::Less => None,
            _ => {
                let n = total - rank;
                Some(n as f64 / total as f64 * 100.0)
            }
        }
    }
}
