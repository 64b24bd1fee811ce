use approx::assert_abs_diff_eq;
use chrono::Duration;
use golf_rating::{
    error::{ErrorKind, RatingError},
    model::structures::strokes_gained::{CategoryStrokes, StrokesCategory},
    providers::{Dataset, ProviderError, RatingStore},
    utils::test_utils::{
        generate_benchmark, generate_hole, generate_round, generate_rounds_from_differentials, test_time
    }
};

use crate::common::{service_with, service_with_config, short_timeout_config};

fn five_rounds() -> Dataset {
    Dataset {
        rounds: generate_rounds_from_differentials(1, &[10.0, 12.0, 8.0, 15.0, 9.0]),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_handicap_index_is_persisted() {
    let (provider, service) = service_with(five_rounds());

    let index = service.handicap_index(1, test_time()).await.unwrap();

    assert_abs_diff_eq!(index.index, 7.68, epsilon = 1e-9);
    assert_eq!(index.rounds_considered, 5);
    assert_eq!(provider.current_handicap(1).await.unwrap(), Some(index));
}

#[tokio::test]
async fn test_handicap_index_needs_three_rounds() {
    let (_, service) = service_with(Dataset {
        rounds: generate_rounds_from_differentials(1, &[10.0, 12.0]),
        ..Default::default()
    });

    let err = service.handicap_index(1, test_time()).await.unwrap_err();

    assert!(matches!(err, RatingError::InsufficientScores { required: 3, found: 2 }));
    assert_eq!(err.kind(), ErrorKind::NotEnoughData);
}

#[tokio::test]
async fn test_course_handicap_uses_current_index() {
    let (_, service) = service_with(five_rounds());

    let missing = service.course_handicap(1, 130, 71.5, 72).await.unwrap_err();
    assert!(matches!(missing, RatingError::NoCurrentHandicap(1)));
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    service.handicap_index(1, test_time()).await.unwrap();

    // round(7.68 * 130 / 113 - 0.5) = round(8.335)
    assert_eq!(service.course_handicap(1, 130, 71.5, 72).await.unwrap(), 8);
}

#[tokio::test]
async fn test_update_handicap_with_new_round() {
    let (_, service) = service_with(five_rounds());
    service.handicap_index(1, test_time()).await.unwrap();

    // Differential 2.0, played the day after the others
    let new_round = generate_round(1, 90, 88.0, 113, -1);
    let update = service
        .update_handicap(1, new_round, test_time() + Duration::days(1))
        .await
        .unwrap();

    // Six rounds: lowest two are 2 and 8
    assert_abs_diff_eq!(update.current.index, 4.8, epsilon = 1e-9);
    assert_abs_diff_eq!(update.previous.index, 7.68, epsilon = 1e-9);
    assert_abs_diff_eq!(update.delta, -2.88, epsilon = 1e-9);
    assert_abs_diff_eq!(service.course_handicap(1, 113, 72.0, 72).await.unwrap() as f64, 5.0);
}

#[tokio::test]
async fn test_update_handicap_counts_new_round_once() {
    let (provider, service) = service_with(five_rounds());
    service.handicap_index(1, test_time()).await.unwrap();

    let new_round = generate_round(1, 90, 88.0, 113, -1);
    provider.add_round(new_round.clone()).await;

    let update = service
        .update_handicap(1, new_round, test_time() + Duration::days(1))
        .await
        .unwrap();

    assert_eq!(update.current.rounds_considered, 6);
    assert_abs_diff_eq!(update.current.index, 4.8, epsilon = 1e-9);
}

#[tokio::test]
async fn test_update_handicap_without_baseline() {
    let (_, service) = service_with(five_rounds());

    let result = service
        .update_handicap(1, generate_round(1, 90, 88.0, 113, -1), test_time())
        .await;

    assert!(matches!(result, Err(RatingError::NoCurrentHandicap(1))));
}

#[tokio::test]
async fn test_handicap_for_period() {
    let (_, service) = service_with(five_rounds());

    // Rounds played 0, 1 and 2 days ago: differentials 10, 12 and 8
    let index = service
        .handicap_for_period(1, test_time() - Duration::days(2), test_time())
        .await
        .unwrap();
    assert_abs_diff_eq!(index.index, 7.68, epsilon = 1e-9);
    assert_eq!(index.rounds_considered, 3);

    let from = test_time() - Duration::days(100);
    let to = test_time() - Duration::days(50);
    let empty = service.handicap_for_period(1, from, to).await.unwrap_err();
    assert!(matches!(empty, RatingError::NoDataForPeriod { player_id: 1, .. }));
    assert_eq!(empty.kind(), ErrorKind::NotEnoughData);
}

#[tokio::test]
async fn test_provider_outage_is_reported_with_context() {
    let (provider, service) = service_with(five_rounds());
    provider.set_unavailable(true);

    let err = service.handicap_index(1, test_time()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
    assert!(matches!(
        err,
        RatingError::Provider {
            operation: "recent_rounds",
            player_id: 1,
            source: ProviderError::Unavailable(_)
        }
    ));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let (provider, service) = service_with_config(five_rounds(), short_timeout_config());
    provider.set_latency(std::time::Duration::from_millis(500));

    let err = service.form_rating(1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
    assert!(matches!(
        err,
        RatingError::Provider {
            source: ProviderError::Timeout(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_form_rating() {
    // Recent five average -2, full window average 0
    let (_, service) = service_with(Dataset {
        rounds: generate_rounds_from_differentials(1, &[-2.0, -2.0, -2.0, -2.0, -2.0, 2.0, 2.0, 2.0, 2.0, 2.0]),
        ..Default::default()
    });

    let form = service.form_rating(1).await.unwrap();

    assert_abs_diff_eq!(form.current_form, 70.0, epsilon = 1e-9);
    assert_eq!(form.rounds_analyzed, 10);
    assert!(matches!(
        service.form_rating(2).await,
        Err(RatingError::NoRecentScores(2))
    ));
}

#[tokio::test]
async fn test_strokes_gained_and_skill_areas() {
    let average = CategoryStrokes {
        driving: 1.0,
        approach: 1.0,
        short_game: 1.0,
        putting: 2.0
    };
    let (_, service) = service_with(Dataset {
        benchmarks: vec![generate_benchmark(1, average), generate_benchmark(2, average)],
        ..Default::default()
    });

    // Half a stroke better putting on every hole, half a stroke worse around the green
    let holes: Vec<_> = (1..=18).map(|n| generate_hole(n, 1.0, 1.0, 1.5, 1.5)).collect();

    let round = service.strokes_gained(1, 1, &holes).await.unwrap();
    assert_abs_diff_eq!(round.putting, 9.0, epsilon = 1e-9);
    assert_abs_diff_eq!(round.short_game, -9.0, epsilon = 1e-9);
    assert_abs_diff_eq!(round.total, 0.0, epsilon = 1e-9);

    let rounds = vec![(1, holes.clone()), (2, holes.clone()), (1, holes.clone())];
    let analysis = service.skill_areas(1, &rounds).await.unwrap();
    assert_eq!(analysis.rounds_analyzed, 3);
    assert_eq!(analysis.strongest, StrokesCategory::Putting);
    assert_eq!(analysis.weakest, StrokesCategory::ShortGame);

    let too_few = service.skill_areas(1, &rounds[..2]).await.unwrap_err();
    assert!(matches!(too_few, RatingError::InsufficientData { required: 3, found: 2 }));

    let missing = service.strokes_gained(1, 9, &holes).await.unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}
