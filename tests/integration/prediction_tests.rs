use approx::assert_abs_diff_eq;
use golf_rating::{
    error::{ErrorKind, RatingError},
    model::structures::{prediction::CourseConditions, score_round::ScoreRound},
    providers::Dataset,
    utils::test_utils::generate_round
};

use crate::common::service_with;

/// Rounds on course 1 (rating 72, slope 113) with the given totals, newest first.
fn rounds(player_id: i32, totals: &[i32]) -> Vec<ScoreRound> {
    totals
        .iter()
        .enumerate()
        .map(|(i, total)| generate_round(player_id, *total, 72.0, 113, i as i64))
        .collect()
}

#[tokio::test]
async fn test_predict_score_range() {
    let (_, service) = service_with(Dataset {
        rounds: rounds(1, &[80, 82, 78, 80]),
        ..Default::default()
    });

    let prediction = service
        .predict_score_range(1, 1, CourseConditions::default())
        .await
        .unwrap();

    assert_eq!(prediction.most_likely_score, 80);
    assert_eq!((prediction.range.low, prediction.range.high), (78, 82));
    assert_abs_diff_eq!(prediction.confidence, 0.2, epsilon = 1e-9);
}

#[tokio::test]
async fn test_harder_conditions_raise_the_prediction() {
    let (_, service) = service_with(Dataset {
        rounds: rounds(1, &[80, 82, 78, 80]),
        ..Default::default()
    });
    let windy = CourseConditions {
        weather_impact: 10.0,
        course_fit_impact: 0.0
    };

    let calm = service.predict_score_range(1, 1, CourseConditions::default()).await.unwrap();
    let prediction = service.predict_score_range(1, 1, windy).await.unwrap();

    // 0.3 * 10 strokes
    assert_eq!(prediction.most_likely_score, calm.most_likely_score + 3);
    assert!(prediction.confidence < calm.confidence);
}

#[tokio::test]
async fn test_score_probabilities() {
    let (_, service) = service_with(Dataset {
        rounds: rounds(1, &[80, 82, 78, 80]),
        ..Default::default()
    });

    let probabilities = service
        .score_probabilities(1, 1, CourseConditions::default(), &[80, 83])
        .await
        .unwrap();

    assert_eq!(probabilities[0].0, 80);
    assert_abs_diff_eq!(probabilities[0].1, 0.2, epsilon = 1e-9);
    assert_abs_diff_eq!(probabilities[1].1, 0.2 * (-1.0f64).exp(), epsilon = 1e-9);
}

#[tokio::test]
async fn test_prediction_without_history() {
    let (_, service) = service_with(Dataset::default());

    let err = service
        .predict_score_range(1, 1, CourseConditions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RatingError::InsufficientData { .. }));
    assert_eq!(err.kind(), ErrorKind::NotEnoughData);
}

#[tokio::test]
async fn test_predict_tournament_finish() {
    let mut all_rounds = rounds(1, &[80, 81, 79, 80]);
    all_rounds.extend(rounds(2, &[72, 73, 71, 72]));
    all_rounds.extend(rounds(3, &[90, 91, 89, 90]));
    let (_, service) = service_with(Dataset {
        rounds: all_rounds,
        ..Default::default()
    });

    let prediction = service
        .predict_tournament_finish(1, &[1, 2, 3], 1, CourseConditions::default())
        .await
        .unwrap();

    assert_eq!(prediction.predicted_finish, 2);
    assert_abs_diff_eq!(prediction.top_ten_probability, 0.9);
    let opponents: Vec<i32> = prediction.key_matchups.iter().map(|m| m.opponent_id).collect();
    assert_eq!(opponents, vec![2, 3]);

    assert!(matches!(
        service
            .predict_tournament_finish(4, &[1, 2, 3], 1, CourseConditions::default())
            .await,
        Err(RatingError::PlayerNotFound(4))
    ));
}
