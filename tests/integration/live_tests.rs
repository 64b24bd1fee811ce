use std::{sync::Arc, time::Duration as StdDuration};

use approx::assert_abs_diff_eq;
use chrono::Duration;
use futures::StreamExt;
use golf_rating::{
    error::{ErrorKind, RatingError},
    model::structures::{round_state::RoundState, score_round::ScoreRound},
    providers::{Dataset, RatingStore},
    utils::test_utils::{generate_course, generate_round, test_time}
};

use crate::common::service_with;

/// Totals 85, 86 and 84 on a par 72 course rated 72.0: differentials 13, 14 and 12.
fn history(player_id: i32) -> Vec<ScoreRound> {
    [85, 86, 84]
        .iter()
        .enumerate()
        .map(|(i, total)| generate_round(player_id, *total, 72.0, 113, i as i64 + 1))
        .collect()
}

#[tokio::test]
async fn test_live_round_publishes_every_hole() {
    let (provider, service) = service_with(Dataset {
        rounds: history(1),
        ..Default::default()
    });

    service.start_live_round(1, generate_course(1)).await.unwrap();
    assert_eq!(service.live_round_state(1), RoundState::NotStarted);
    let mut subscription = service.subscribe(1).unwrap();

    let first = service.record_live_hole(1, 5, test_time()).unwrap();
    assert_eq!(service.live_round_state(1), RoundState::InProgress);
    assert_eq!(first.projected_final_score, 90);
    // Five strokes over the usual 85 pulls the live rating below the seed
    assert!(first.live_rating < 1500.0);

    for _ in 1..18 {
        service.record_live_hole(1, 5, test_time()).unwrap();
    }

    for hole in 1..=18u8 {
        let update = subscription.recv().await.unwrap();
        assert_eq!(update.player_id, 1);
        assert_eq!(update.current_hole, hole);
        assert_eq!(update.current_score, hole as i32 * 5);
    }

    let completed = service
        .complete_live_round(1, test_time() + Duration::hours(5))
        .await
        .unwrap();

    assert_eq!(completed.round.total_score, 90);
    assert_eq!(completed.round.hole_scores.len(), 18);
    // Four rounds: the lowest differential, 12, counts
    assert_abs_diff_eq!(completed.handicap.index, 11.52, epsilon = 1e-9);
    assert_eq!(completed.delta, None);
    assert_eq!(provider.current_handicap(1).await.unwrap(), Some(completed.handicap));
}

#[tokio::test]
async fn test_completion_updates_existing_handicap() {
    let (_, service) = service_with(Dataset {
        rounds: history(1),
        ..Default::default()
    });
    let previous = service.handicap_index(1, test_time()).await.unwrap();

    service.start_live_round(1, generate_course(1)).await.unwrap();
    // 72 strokes: differential 0
    for strokes in [4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4] {
        service.record_live_hole(1, strokes, test_time()).unwrap();
    }
    let completed = service.complete_live_round(1, test_time()).await.unwrap();

    assert_abs_diff_eq!(previous.index, 11.52, epsilon = 1e-9);
    assert_abs_diff_eq!(completed.handicap.index, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(completed.delta.unwrap(), -11.52, epsilon = 1e-9);
}

#[tokio::test]
async fn test_failed_completion_can_be_retried() {
    let (provider, service) = service_with(Dataset {
        rounds: history(1),
        ..Default::default()
    });
    service.start_live_round(1, generate_course(1)).await.unwrap();
    for _ in 0..18 {
        service.record_live_hole(1, 5, test_time()).unwrap();
    }

    provider.set_unavailable(true);
    let err = service.complete_live_round(1, test_time()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
    assert_eq!(service.live_round_state(1), RoundState::InProgress);

    provider.set_unavailable(false);
    let completed = service.complete_live_round(1, test_time()).await.unwrap();

    assert_eq!(completed.round.total_score, 90);
    assert_abs_diff_eq!(completed.handicap.index, 11.52, epsilon = 1e-9);
    assert_eq!(provider.current_handicap(1).await.unwrap(), Some(completed.handicap));
    assert_eq!(service.live_round_state(1), RoundState::NotStarted);
    assert!(matches!(
        service.complete_live_round(1, test_time()).await,
        Err(RatingError::InvalidRoundTransition { .. })
    ));
}

#[tokio::test]
async fn test_restart_does_not_replace_a_round_in_progress() {
    let (provider, service) = service_with(Dataset {
        rounds: history(1),
        ..Default::default()
    });
    service.start_live_round(1, generate_course(1)).await.unwrap();
    let service = Arc::new(service);

    provider.set_latency(StdDuration::from_millis(200));
    let restart = {
        let service = service.clone();
        tokio::spawn(async move { service.start_live_round(1, generate_course(1)).await })
    };
    tokio::time::sleep(StdDuration::from_millis(20)).await;

    // Recorded while the restart is still fetching its context
    service.record_live_hole(1, 4, test_time()).unwrap();

    assert!(matches!(
        restart.await.unwrap(),
        Err(RatingError::InvalidRoundTransition { .. })
    ));
    assert_eq!(service.live_round_state(1), RoundState::InProgress);
    assert_eq!(service.record_live_hole(1, 4, test_time()).unwrap().current_hole, 2);
}

#[tokio::test]
async fn test_round_transitions() {
    let (_, service) = service_with(Dataset {
        rounds: history(1),
        ..Default::default()
    });

    let not_started = service.record_live_hole(1, 4, test_time()).unwrap_err();
    assert!(matches!(not_started, RatingError::InvalidRoundTransition { .. }));
    assert_eq!(not_started.kind(), ErrorKind::InvalidInput);

    service.start_live_round(1, generate_course(1)).await.unwrap();
    service.record_live_hole(1, 4, test_time()).unwrap();

    assert!(matches!(
        service.start_live_round(1, generate_course(1)).await,
        Err(RatingError::InvalidRoundTransition { .. })
    ));
    assert!(matches!(
        service.complete_live_round(1, test_time()).await,
        Err(RatingError::InvalidInput(_))
    ));
    assert_eq!(service.live_round_state(1), RoundState::InProgress);
}

#[tokio::test]
async fn test_unsubscribing_does_not_affect_the_round() {
    let (_, service) = service_with(Dataset {
        rounds: history(1),
        ..Default::default()
    });
    service.start_live_round(1, generate_course(1)).await.unwrap();

    let subscription = service.subscribe(1).unwrap();
    service.record_live_hole(1, 4, test_time()).unwrap();
    drop(subscription);

    let update = service.record_live_hole(1, 4, test_time()).unwrap();
    assert_eq!(update.current_hole, 2);
    assert_eq!(service.publisher().subscriber_count(1), 0);
    assert_eq!(service.publisher().channel_count(), 0);
}

#[tokio::test]
async fn test_subscribe_many_players() {
    let mut rounds = history(1);
    rounds.extend(history(2));
    let (_, service) = service_with(Dataset {
        rounds,
        ..Default::default()
    });
    service.start_live_round(1, generate_course(1)).await.unwrap();
    service.start_live_round(2, generate_course(1)).await.unwrap();
    service.start_live_round(3, generate_course(1)).await.unwrap();

    let mut stream = service.subscribe_many(&[1, 2]).unwrap();

    service.record_live_hole(3, 4, test_time()).unwrap();
    service.record_live_hole(1, 4, test_time()).unwrap();
    service.record_live_hole(2, 5, test_time()).unwrap();

    let mut players = vec![
        stream.next().await.unwrap().player_id,
        stream.next().await.unwrap().player_id,
    ];
    players.sort();

    assert_eq!(players, vec![1, 2]);
}
