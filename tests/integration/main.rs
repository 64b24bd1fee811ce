#[path = "../common/mod.rs"]
mod common;

mod cli_tests;
mod competitive_tests;
mod handicap_tests;
mod live_tests;
mod prediction_tests;
