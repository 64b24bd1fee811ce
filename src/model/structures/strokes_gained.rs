use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum StrokesCategory {
    Driving,
    Approach,
    ShortGame,
    Putting
}

/// Strokes (or strokes gained) split across the four categories.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStrokes {
    pub driving: f64,
    pub approach: f64,
    pub short_game: f64,
    pub putting: f64
}

impl CategoryStrokes {
    pub fn get(&self, category: StrokesCategory) -> f64 {
        match category {
            StrokesCategory::Driving => self.driving,
            StrokesCategory::Approach => self.approach,
            StrokesCategory::ShortGame => self.short_game,
            StrokesCategory::Putting => self.putting
        }
    }

    pub fn total(&self) -> f64 {
        self.driving + self.approach + self.short_game + self.putting
    }
}

/// How a player spent their strokes on a single hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolePerformance {
    pub hole_number: u8,
    pub strokes: CategoryStrokes
}

/// Benchmark averages for a course. `holes` may be empty, in which case
/// `course_average` is used for every hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benchmark {
    pub course_id: i32,
    pub course_average: CategoryStrokes,
    #[serde(default)]
    pub holes: Vec<CategoryStrokes>
}

impl Benchmark {
    pub fn for_hole(&self, hole_number: u8) -> &CategoryStrokes {
        (hole_number as usize)
            .checked_sub(1)
            .and_then(|i| self.holes.get(i))
            .unwrap_or(&self.course_average)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleStrokesGained {
    pub hole_number: u8,
    pub gained: CategoryStrokes,
    pub total: f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokesGainedResult {
    pub total: f64,
    pub driving: f64,
    pub approach: f64,
    pub short_game: f64,
    pub putting: f64,
    pub holes: Vec<HoleStrokesGained>
}

/// Strokes gained averaged over several rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAreaAnalysis {
    pub rounds_analyzed: usize,
    pub average: CategoryStrokes,
    pub strongest: StrokesCategory,
    pub weakest: StrokesCategory
}
