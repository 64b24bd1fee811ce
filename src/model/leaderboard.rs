use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    error::{RatingError, RatingResult},
    model::{
        constants::DEFAULT_RATING,
        policy::FieldStrengthPolicy,
        rating_tracker::RatingTracker,
        structures::leaderboard::{AdjustedLeaderboardEntry, Leaderboard, LeaderboardEntry}
    }
};

/// Recomputes positions from the scores on `leaderboard`.
///
/// Equal scores share a position (1, 2, 2, 4). Each entry carries the player's rating
/// adjusted for the field tier and playing conditions. Players without a rating in
/// `ratings` are treated as unrated and start from the seed rating.
pub fn dynamic_leaderboard(
    leaderboard: &Leaderboard,
    ratings: &HashMap<i32, f64>,
    policy: &FieldStrengthPolicy
) -> Vec<AdjustedLeaderboardEntry> {
    let mut sorted: IndexMap<i32, &LeaderboardEntry> = leaderboard.entries.iter().map(|e| (e.player_id, e)).collect();
    sorted.sort_by(|k1, v1, k2, v2| v1.score.cmp(&v2.score).then(k1.cmp(k2)));

    let total = sorted.len() as i32;
    let mut adjusted = Vec::with_capacity(sorted.len());
    let mut position = 0u32;
    let mut previous_score = None;

    for (i, (player_id, entry)) in sorted.iter().enumerate() {
        if previous_score != Some(entry.score) {
            position = i as u32 + 1;
            previous_score = Some(entry.score);
        }

        let rating = ratings.get(player_id).copied().unwrap_or(DEFAULT_RATING);

        adjusted.push(AdjustedLeaderboardEntry {
            player_id: *player_id,
            score: entry.score,
            reported_position: entry.position,
            position,
            movement: entry.position as i64 - position as i64,
            adjusted_rating: policy.adjust_rating(rating, &leaderboard.conditions),
            percentile: RatingTracker::percentile(position as i32, total).unwrap_or(0.0)
        });
    }

    adjusted
}

pub fn find_entry(leaderboard: &Leaderboard, player_id: i32) -> RatingResult<&LeaderboardEntry> {
    leaderboard
        .entries
        .iter()
        .find(|e| e.player_id == player_id)
        .ok_or(RatingError::PlayerNotInLeaderboard {
            player_id,
            leaderboard_id: leaderboard.id
        })
}
