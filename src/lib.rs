pub mod args;
pub mod config;
pub mod error;
pub mod messaging;
pub mod model;
pub mod providers;
pub mod service;
pub mod utils;
