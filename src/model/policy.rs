use serde::{Deserialize, Serialize};

use crate::model::structures::{field_tier::FieldTier, leaderboard::LeaderboardConditions};

/// Tunable offsets applied when rating a player against a specific field.
///
/// The numbers have no derivation behind them, so they are loaded from configuration
/// rather than baked into the rating math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldStrengthPolicy {
    pub recreational: f64,
    pub competitive: f64,
    pub elite: f64,
    pub professional: f64,
    /// Rounds further than this many standard deviations from the mean are anomalous
    pub anomaly_sigma: f64
}

impl Default for FieldStrengthPolicy {
    fn default() -> Self {
        Self {
            recreational: -2.0,
            competitive: 0.0,
            elite: 2.0,
            professional: 4.0,
            anomaly_sigma: 2.5
        }
    }
}

impl FieldStrengthPolicy {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn tier_offset(&self, tier: FieldTier) -> f64 {
        match tier {
            FieldTier::Recreational => self.recreational,
            FieldTier::Competitive => self.competitive,
            FieldTier::Elite => self.elite,
            FieldTier::Professional => self.professional
        }
    }

    /// `rating + tier offset + conditions stroke adjustment`
    pub fn adjust_rating(&self, rating: f64, conditions: &LeaderboardConditions) -> f64 {
        rating + self.tier_offset(conditions.field_tier) + conditions.stroke_adjustment
    }
}
