use std::{path::PathBuf, process::Command};

use golf_rating::{
    providers::{memory::PlayerTournamentResult, Dataset},
    utils::test_utils::{generate_rounds_from_differentials, generate_tournament_result}
};
use serde_json::Value;

fn binary() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_golf-rating"));
    command
        .env("RUST_LOG", "error")
        .env_remove("RATING_FORM_WINDOW")
        .env_remove("RATING_POLICY");
    command
}

fn write_dataset(name: &str, dataset: &Dataset) -> PathBuf {
    let path = std::env::temp_dir().join(format!("golf-rating-{}-{}.json", name, std::process::id()));
    std::fs::write(&path, serde_json::to_string(dataset).unwrap()).unwrap();
    path
}

#[test]
fn test_batch_report() {
    let dataset = Dataset {
        rounds: generate_rounds_from_differentials(1, &[10.0, 12.0, 8.0, 15.0, 9.0]),
        tournament_results: vec![
            PlayerTournamentResult {
                player_id: 1,
                result: generate_tournament_result(1, 1, 50, 0, Some(1500.0))
            },
            PlayerTournamentResult {
                player_id: 2,
                result: generate_tournament_result(1, 50, 50, 0, Some(1500.0))
            },
        ],
        ..Default::default()
    };
    let path = write_dataset("batch", &dataset);

    let output = binary().arg("--dataset").arg(&path).output().expect("Failed to run golf-rating");
    std::fs::remove_file(&path).ok();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let players = report.as_array().unwrap();
    assert_eq!(players.len(), 2);

    let first = &players[0];
    assert_eq!(first["playerId"], 1);
    assert!((first["handicap"]["index"].as_f64().unwrap() - 7.68).abs() < 1e-9);
    assert!((first["competitiveRating"]["rating"].as_f64().unwrap() - 1516.0).abs() < 1e-9);
    assert_eq!(first["rank"], 1);

    // Player 2 has no rounds: reported without a handicap, not as a failure
    let second = &players[1];
    assert!(second["handicap"].is_null());
    assert_eq!(second["rank"], 2);
    assert!(second["errors"].as_array().unwrap().is_empty());
}

#[test]
fn test_single_player() {
    let dataset = Dataset {
        rounds: [
            generate_rounds_from_differentials(1, &[10.0, 12.0, 8.0]),
            generate_rounds_from_differentials(2, &[5.0, 6.0, 7.0]),
        ]
        .concat(),
        ..Default::default()
    };
    let path = write_dataset("single", &dataset);

    let output = binary()
        .args(["--player", "2", "--dataset"])
        .arg(&path)
        .output()
        .expect("Failed to run golf-rating");
    std::fs::remove_file(&path).ok();

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let players = report.as_array().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["playerId"], 2);
}

#[test]
fn test_missing_dataset_fails() {
    let output = binary()
        .args(["--dataset", "/nonexistent/golf-rating.json"])
        .output()
        .expect("Failed to run golf-rating");

    assert!(!output.status.success(), "Process should fail without a dataset");
    assert!(output.stdout.is_empty());
}
