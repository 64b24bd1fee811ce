use std::sync::Arc;

use approx::assert_abs_diff_eq;
use golf_rating::{
    error::{ErrorKind, RatingError},
    model::{
        competitive::calculate_competitive_rating,
        structures::{
            competitive_rating::RatingRecord, field_tier::FieldTier, leaderboard::LeaderboardConditions
        }
    },
    providers::{
        memory::{PlayerTournamentResult, StoredRating},
        Dataset, RatingStore
    },
    utils::test_utils::{generate_leaderboard, generate_random_tournament_history, generate_tournament_result}
};

use crate::common::service_with;

#[tokio::test]
async fn test_win_against_average_field() {
    let (provider, service) = service_with(Dataset::default());
    provider
        .add_tournament_result(1, generate_tournament_result(1, 1, 50, 0, Some(1500.0)))
        .await;

    let rating = service.update_competitive_rating(1).await.unwrap();

    assert_abs_diff_eq!(rating.rating, 1516.0, epsilon = 1e-9);
    let stored = provider.current_rating(1).await.unwrap().unwrap();
    assert_eq!(stored.rating, rating.rating);
    assert_eq!(stored.applied_tournaments, vec![1]);
    assert_eq!(service.rank(1).await.map(|r| r.rank), Some(1));
}

#[tokio::test]
async fn test_incremental_update_matches_full_replay() {
    let (provider, service) = service_with(Dataset::default());
    let history = generate_random_tournament_history(8, 7);

    for result in &history[..5] {
        provider.add_tournament_result(1, result.clone()).await;
    }
    service.update_competitive_rating(1).await.unwrap();

    for result in &history[5..] {
        provider.add_tournament_result(1, result.clone()).await;
    }
    let incremental = service.update_competitive_rating(1).await.unwrap();
    let replayed = calculate_competitive_rating(1, None, &history).unwrap();

    assert_abs_diff_eq!(incremental.rating, replayed.rating, epsilon = 1e-9);
    assert_eq!(incremental.history.tournaments_played, 8);
    // One initial entry plus one per tournament
    assert_eq!(incremental.adjustments.len(), 9);
}

#[tokio::test]
async fn test_repeated_update_applies_nothing_twice() {
    let (provider, service) = service_with(Dataset::default());
    for result in generate_random_tournament_history(4, 11) {
        provider.add_tournament_result(1, result).await;
    }

    let first = service.update_competitive_rating(1).await.unwrap();
    let second = service.update_competitive_rating(1).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_updates_for_one_player_are_serialized() {
    let (provider, service) = service_with(Dataset::default());
    let history = generate_random_tournament_history(12, 3);
    for result in &history {
        provider.add_tournament_result(1, result.clone()).await;
    }
    let service = Arc::new(service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.update_competitive_rating(1).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let replayed = calculate_competitive_rating(1, None, &history).unwrap();
    let stored = provider.current_rating(1).await.unwrap().unwrap();

    assert_abs_diff_eq!(stored.rating, replayed.rating, epsilon = 1e-9);
    assert_eq!(stored.applied_tournaments.len(), 12);
}

#[tokio::test]
async fn test_update_continues_from_stored_rating() {
    let (provider, service) = service_with(Dataset {
        ratings: vec![StoredRating::new(1, 1800.0)],
        ..Default::default()
    });
    provider
        .add_tournament_result(1, generate_tournament_result(1, 1, 50, 0, Some(1500.0)))
        .await;

    let rating = service.update_competitive_rating(1).await.unwrap();

    // 1800 + 32 * (1 - E(1800, 1500))
    assert_abs_diff_eq!(rating.rating, 1804.8313458307623, epsilon = 1e-9);
    assert_abs_diff_eq!(provider.current_rating(1).await.unwrap().unwrap().rating, rating.rating);
}

#[tokio::test]
async fn test_restarted_service_applies_only_new_results() {
    let history = generate_random_tournament_history(8, 5);

    let (provider, service) = service_with(Dataset::default());
    for result in &history[..5] {
        provider.add_tournament_result(1, result.clone()).await;
    }
    service.update_competitive_rating(1).await.unwrap();
    let record = provider.current_rating(1).await.unwrap().unwrap();

    // A new process whose history provider only returns a recent window
    let (_, restarted) = service_with(Dataset {
        ratings: vec![StoredRating { player_id: 1, record }],
        tournament_results: history[3..]
            .iter()
            .map(|result| PlayerTournamentResult {
                player_id: 1,
                result: result.clone()
            })
            .collect(),
        ..Default::default()
    });

    let continued = restarted.update_competitive_rating(1).await.unwrap();
    let replayed = calculate_competitive_rating(1, None, &history).unwrap();

    assert_abs_diff_eq!(continued.rating, replayed.rating, epsilon = 1e-9);
    assert_eq!(continued.history.tournaments_played, 8);
    assert_eq!(continued.finishes, replayed.finishes);
    // The ledger restarts at the stored value and records the three new results
    assert_eq!(continued.adjustments.len(), 4);
}

#[tokio::test]
async fn test_stored_rating_already_current() {
    let history = generate_random_tournament_history(3, 9);
    let applied = calculate_competitive_rating(1, None, &history).unwrap();
    let (_, service) = service_with(Dataset {
        ratings: vec![StoredRating {
            player_id: 1,
            record: RatingRecord::from(&applied)
        }],
        tournament_results: history
            .iter()
            .map(|result| PlayerTournamentResult {
                player_id: 1,
                result: result.clone()
            })
            .collect(),
        ..Default::default()
    });

    let rating = service.update_competitive_rating(1).await.unwrap();

    assert_eq!(rating.rating.to_bits(), applied.rating.to_bits());
    assert_eq!(rating.history, applied.history);
    assert_eq!(service.rank(1).await.map(|r| r.rank), Some(1));
}

#[tokio::test]
async fn test_out_of_order_result_is_rejected() {
    let (provider, service) = service_with(Dataset::default());
    provider
        .add_tournament_result(1, generate_tournament_result(1, 3, 20, 7, None))
        .await;
    service.update_competitive_rating(1).await.unwrap();

    // Reported late: played before the tournament already applied
    provider
        .add_tournament_result(1, generate_tournament_result(2, 1, 20, 3, None))
        .await;

    let err = service.update_competitive_rating(1).await.unwrap_err();

    assert!(matches!(err, RatingError::OutOfOrderResult { tournament_id: 2, .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_no_tournament_history() {
    let (_, service) = service_with(Dataset::default());

    let err = service.update_competitive_rating(4).await.unwrap_err();

    assert!(matches!(err, RatingError::NoTournamentHistory(4)));
    assert_eq!(err.kind(), ErrorKind::NotEnoughData);
}

#[tokio::test]
async fn test_field_adjusted_rating() {
    let (_, service) = service_with(Dataset {
        ratings: vec![StoredRating::new(1, 1600.0)],
        ..Default::default()
    });
    let conditions = LeaderboardConditions {
        field_tier: FieldTier::Elite,
        stroke_adjustment: -1.0
    };

    assert_abs_diff_eq!(service.field_adjusted_rating(1, &conditions).await.unwrap(), 1601.0);
    assert!(matches!(
        service.field_adjusted_rating(2, &conditions).await,
        Err(RatingError::PlayerNotFound(2))
    ));
}

#[tokio::test]
async fn test_dynamic_leaderboard() {
    let mut leaderboard = generate_leaderboard(5, &[(1, 74, 1), (2, 70, 2), (3, 72, 3)]);
    leaderboard.conditions.field_tier = FieldTier::Professional;
    let (_, service) = service_with(Dataset {
        leaderboards: vec![leaderboard],
        ratings: vec![StoredRating::new(1, 1550.0), StoredRating::new(2, 1480.0)],
        ..Default::default()
    });

    let entries = service.dynamic_leaderboard(5).await.unwrap();

    let positions: Vec<(i32, u32, i64)> = entries.iter().map(|e| (e.player_id, e.position, e.movement)).collect();
    assert_eq!(positions, vec![(2, 1, 1), (3, 2, 1), (1, 3, -2)]);
    assert_abs_diff_eq!(entries[0].adjusted_rating, 1484.0);
    // Unrated players start from the seed rating
    assert_abs_diff_eq!(entries[1].adjusted_rating, 1504.0);

    let position = service.leaderboard_position(5, 3).await.unwrap();
    assert_eq!(position.position, 2);

    assert!(matches!(
        service.leaderboard_position(5, 9).await,
        Err(RatingError::PlayerNotInLeaderboard {
            player_id: 9,
            leaderboard_id: 5
        })
    ));
    assert_eq!(service.dynamic_leaderboard(6).await.unwrap_err().kind(), ErrorKind::NotFound);
}
