use std::{process::ExitCode, sync::Arc};

use chrono::{DateTime, FixedOffset, Utc};
use clap::Parser;
use golf_rating::{
    args::Args,
    config::{load_policy, ConfigError, EngineConfig},
    error::{ErrorKind, RatingResult},
    messaging::{LiveFeedConfig, LiveUpdatePublisher},
    model::structures::{competitive_rating::CompetitiveRating, form_rating::FormRating, handicap_index::HandicapIndex},
    providers::{Dataset, InMemoryProvider},
    service::{Providers, RatingService},
    utils::progress_utils::progress_bar
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write report: {0}")]
    Report(#[from] serde_json::Error)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerReport {
    player_id: i32,
    handicap: Option<HandicapIndex>,
    form: Option<FormRating>,
    competitive_rating: Option<CompetitiveRating>,
    rank: Option<usize>,
    percentile: Option<f64>,
    errors: Vec<String>
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(EnvFilter::new(&args.log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let mut config = EngineConfig::from_env()?;
    if let Some(window) = args.form_window {
        config.form_window = window;
    }
    if let Some(path) = &args.policy {
        config = config.with_policy(load_policy(path)?);
    }

    let dataset = Dataset::load(&args.dataset)?;
    info!(
        rounds = dataset.rounds.len(),
        tournament_results = dataset.tournament_results.len(),
        "Loaded dataset"
    );

    let provider = Arc::new(InMemoryProvider::from_dataset(dataset));
    let players = match args.player {
        Some(player_id) => vec![player_id],
        None => provider.player_ids().await
    };

    let publisher = Arc::new(LiveUpdatePublisher::from_config(&LiveFeedConfig::from_env()?));
    let service = RatingService::new(Providers::from_single(provider), config, publisher);
    let as_of = Utc::now().fixed_offset();

    let bar = progress_bar(players.len() as u64, "Rating players".to_string());
    let mut reports = Vec::with_capacity(players.len());
    for player_id in players {
        reports.push(player_report(&service, player_id, as_of).await);
        bar.inc(1);
    }
    bar.finish_and_clear();

    // Ranks are only final once every player has been rated
    for report in &mut reports {
        if let Some(rank) = service.rank(report.player_id).await {
            report.rank = Some(rank.rank);
            report.percentile = Some(rank.percentile);
        }
    }

    let failed = reports.iter().filter(|r| !r.errors.is_empty()).count();
    info!(players = reports.len(), failed, "Finished processing");

    println!("{}", serde_json::to_string_pretty(&reports)?);

    Ok(())
}

async fn player_report(service: &RatingService, player_id: i32, as_of: DateTime<FixedOffset>) -> PlayerReport {
    let mut errors = Vec::new();

    let handicap = keep(service.handicap_index(player_id, as_of).await, &mut errors);
    let form = keep(service.form_rating(player_id).await, &mut errors);
    let competitive_rating = keep(service.update_competitive_rating(player_id).await, &mut errors);

    PlayerReport {
        player_id,
        handicap,
        form,
        competitive_rating,
        rank: None,
        percentile: None,
        errors
    }
}

/// Players without enough data are expected in any dataset and are not reported as errors.
fn keep<T>(result: RatingResult<T>, errors: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.kind() == ErrorKind::NotEnoughData => {
            debug!("{}", e);
            None
        }
        Err(e) => {
            warn!("{}", e);
            errors.push(e.to_string());
            None
        }
    }
}
