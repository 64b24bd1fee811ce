use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Strength classification of a tournament field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldTier {
    Recreational,
    #[default]
    Competitive,
    Elite,
    Professional
}
