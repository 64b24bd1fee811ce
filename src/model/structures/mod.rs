pub mod competitive_rating;
pub mod field_tier;
pub mod form_rating;
pub mod handicap_index;
pub mod leaderboard;
pub mod live_update;
pub mod prediction;
pub mod rating_adjustment_type;
pub mod round_state;
pub mod score_round;
pub mod strokes_gained;
