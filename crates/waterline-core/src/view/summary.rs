use serde::Serialize;

use crate::model::SensorReading;

/// Average, maximum, and minimum water level over a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LevelSummary {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    /// Number of readings that contributed.
    pub count: usize,
}

/// Summarize `water_level` over the finite values in `readings`.
///
/// An empty input (or one with no finite levels) yields all zeros.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn summarize(readings: &[SensorReading]) -> LevelSummary {
    let mut levels = readings
        .iter()
        .map(|r| r.water_level)
        .filter(|l| l.is_finite());

    let Some(first) = levels.next() else {
        return LevelSummary::default();
    };

    let (sum, max, min, count) = levels.fold((first, first, first, 1_usize), |acc, l| {
        (acc.0 + l, acc.1.max(l), acc.2.min(l), acc.3 + 1)
    });

    LevelSummary {
        average: sum / count as f64,
        max,
        min,
        count,
    }
}
