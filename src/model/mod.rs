//! Pure rating computations. Nothing in here performs I/O; the service layer
//! fetches data from providers and hands it to these functions.

pub mod competitive;
pub mod constants;
pub mod form;
pub mod handicap;
pub mod leaderboard;
pub mod live;
pub mod policy;
pub mod prediction;
pub mod rating_tracker;
pub mod stats;
pub mod strokes_gained;
pub mod structures;
