use itertools::Itertools;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    error::{RatingError, RatingResult},
    model::{
        constants::MIN_SKILL_AREA_ROUNDS,
        structures::strokes_gained::{
            Benchmark, CategoryStrokes, HolePerformance, HoleStrokesGained, SkillAreaAnalysis, StrokesCategory,
            StrokesGainedResult
        }
    }
};

/// Strokes gained per category on one hole: benchmark strokes minus the player's strokes.
/// Positive values mean the player beat the benchmark.
pub fn hole_strokes_gained(hole: &HolePerformance, benchmark: &Benchmark) -> HoleStrokesGained {
    let expected = benchmark.for_hole(hole.hole_number);
    let gained = CategoryStrokes {
        driving: expected.driving - hole.strokes.driving,
        approach: expected.approach - hole.strokes.approach,
        short_game: expected.short_game - hole.strokes.short_game,
        putting: expected.putting - hole.strokes.putting
    };

    HoleStrokesGained {
        hole_number: hole.hole_number,
        total: gained.total(),
        gained
    }
}

/// Decomposes a round into driving, approach, short game and putting relative to `benchmark`.
pub fn analyze_round(holes: &[HolePerformance], benchmark: &Benchmark) -> RatingResult<StrokesGainedResult> {
    if holes.is_empty() {
        return Err(RatingError::InvalidInput(format!(
            "no hole data supplied for course {}",
            benchmark.course_id
        )));
    }

    let per_hole: Vec<HoleStrokesGained> = holes
        .iter()
        .sorted_by_key(|h| h.hole_number)
        .map(|h| hole_strokes_gained(h, benchmark))
        .collect();

    let totals = per_hole.iter().fold(CategoryStrokes::default(), |acc, h| CategoryStrokes {
        driving: acc.driving + h.gained.driving,
        approach: acc.approach + h.gained.approach,
        short_game: acc.short_game + h.gained.short_game,
        putting: acc.putting + h.gained.putting
    });

    debug!(
        course_id = benchmark.course_id,
        holes = per_hole.len(),
        total = totals.total(),
        "Analyzed strokes gained"
    );

    Ok(StrokesGainedResult {
        total: totals.total(),
        driving: totals.driving,
        approach: totals.approach,
        short_game: totals.short_game,
        putting: totals.putting,
        holes: per_hole
    })
}

/// Averages several rounds of strokes gained and names the strongest and weakest area.
pub fn analyze_skill_areas(results: &[StrokesGainedResult]) -> RatingResult<SkillAreaAnalysis> {
    if results.len() < MIN_SKILL_AREA_ROUNDS {
        return Err(RatingError::InsufficientData {
            required: MIN_SKILL_AREA_ROUNDS,
            found: results.len()
        });
    }

    let n = results.len() as f64;
    let average = CategoryStrokes {
        driving: results.iter().map(|r| r.driving).sum::<f64>() / n,
        approach: results.iter().map(|r| r.approach).sum::<f64>() / n,
        short_game: results.iter().map(|r| r.short_game).sum::<f64>() / n,
        putting: results.iter().map(|r| r.putting).sum::<f64>() / n
    };

    // Non-empty: there are always four categories
    let strongest = StrokesCategory::iter()
        .max_by(|a, b| average.get(*a).total_cmp(&average.get(*b)))
        .unwrap_or(StrokesCategory::Driving);
    let weakest = StrokesCategory::iter()
        .min_by(|a, b| average.get(*a).total_cmp(&average.get(*b)))
        .unwrap_or(StrokesCategory::Driving);

    Ok(SkillAreaAnalysis {
        rounds_analyzed: results.len(),
        average,
        strongest,
        weakest
    })
}
