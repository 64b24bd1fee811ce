// Handicap constants
pub const STANDARD_SLOPE: f64 = 113.0;
pub const MIN_HANDICAP_ROUNDS: usize = 3;
pub const MAX_HANDICAP_ROUNDS: usize = 20;
pub const HANDICAP_MULTIPLIER: f64 = 0.96;
pub const HANDICAP_INDEX_MIN: f64 = -5.0;
pub const HANDICAP_INDEX_MAX: f64 = 54.0;
pub const REVISION_PERIOD_DAYS: i64 = 14;
pub const TREND_WINDOW: usize = 5;
pub const TREND_THRESHOLD: f64 = 0.5;
pub const DIFFERENTIAL_VOLATILITY_SCALE: f64 = 10.0;
// Form constants
pub const DEFAULT_FORM_WINDOW: usize = 10;
pub const FORM_RECENT_WINDOW: usize = 5;
pub const FORM_BASELINE: f64 = 50.0;
pub const FORM_POINTS_PER_STROKE: f64 = 10.0;
pub const MOMENTUM_WINDOW: usize = 3;
pub const MOMENTUM_THRESHOLD: f64 = 0.5;
pub const FORM_CONSISTENCY_SCALE: f64 = 5.0;
pub const STREAK_LOOKBACK: usize = 3;
pub const STREAK_THRESHOLD: f64 = 1.0;
pub const SHORT_TERM_WINDOW: usize = 3;
pub const MEDIUM_TERM_WINDOW: usize = 10;
pub const SEASONAL_WINDOW: usize = 20;
// Strokes gained constants
pub const MIN_SKILL_AREA_ROUNDS: usize = 3;
// Competitive rating constants
pub const DEFAULT_RATING: f64 = 1500.0;
pub const K_FACTOR: f64 = 32.0;
pub const ELO_SCALE: f64 = 400.0;
pub const MAX_CONFIDENCE: f64 = 0.9;
pub const CONFIDENCE_TOURNAMENTS: f64 = 20.0;
pub const FINISH_VOLATILITY_SCALE: f64 = 25.0;
pub const RATING_MOMENTUM_WINDOW: usize = 3;
// Prediction constants
pub const WEATHER_WEIGHT: f64 = 0.3;
pub const FORM_WEIGHT: f64 = 0.4;
pub const COURSE_FIT_WEIGHT: f64 = 0.2;
pub const FORM_STROKES_PER_POINT: f64 = 0.1;
pub const CONFIDENCE_SAMPLE_SIZE: f64 = 20.0;
pub const CONFIDENCE_PENALTY_PER_STROKE: f64 = 0.05;
pub const MAX_CONFIDENCE_PENALTY: f64 = 0.5;
pub const MIN_RANGE_HALF_WIDTH: i32 = 2;
pub const RANGE_STD_DEV_MULTIPLIER: f64 = 1.5;
pub const PROBABILITY_DECAY_STROKES: f64 = 3.0;
pub const COURSE_BASELINE_WEIGHT: f64 = 0.5;
pub const RECENT_BASELINE_WEIGHT: f64 = 0.3;
pub const HANDICAP_BASELINE_WEIGHT: f64 = 0.2;
pub const FINISH_RANGE_FRACTION: f64 = 0.1;
pub const MIN_TOP_TEN_PROBABILITY: f64 = 0.1;
pub const MAX_TOP_TEN_PROBABILITY: f64 = 0.9;
pub const MAX_KEY_MATCHUPS: usize = 3;
pub const HEAD_TO_HEAD_PER_STROKE: f64 = 0.1;
pub const MIN_HEAD_TO_HEAD: f64 = 0.05;
pub const MAX_HEAD_TO_HEAD: f64 = 0.95;
// Live projection constants
pub const HOLES_PER_ROUND: u8 = 18;
pub const LIVE_PACE_WEIGHT: f64 = 0.6;
pub const LIVE_CONSISTENCY_WEIGHT: f64 = 0.3;
pub const LIVE_DIFFICULTY_WEIGHT: f64 = 0.1;
pub const LIVE_RATING_POINTS_PER_STROKE: f64 = 10.0;
pub const LIVE_MOMENTUM_WINDOW: usize = 3;
