use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Clone, Debug)]
#[command(
    display_name = "Golf Rating",
    long_about = "Calculates handicap indexes, form and competitive ratings for a dataset of golf rounds"
)]
pub struct Args {
    /// JSON file with rounds, tournament results, leaderboards, benchmarks and stored ratings
    #[arg(short, long, env = "RATING_DATASET", help = "Path to the dataset")]
    pub dataset: PathBuf,

    /// JSON file overriding the field strength offsets and anomaly sigma
    #[arg(short, long, env = "RATING_POLICY", help = "Path to a field strength policy")]
    pub policy: Option<PathBuf>,

    /// Only process this player
    #[arg(long)]
    pub player: Option<i32>,

    /// Number of recent rounds the form rating considers
    #[arg(short, long, env = "RATING_FORM_WINDOW")]
    pub form_window: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}
