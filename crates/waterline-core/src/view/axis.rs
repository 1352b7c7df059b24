use std::fmt;

use chrono::{DateTime, TimeZone};

use crate::model::SensorReading;

/// "Low" reference line.
pub const LOW_REFERENCE_CM: f64 = 5.0;
/// "High" reference line.
pub const HIGH_REFERENCE_CM: f64 = 25.0;
/// Headroom above and below the visible data.
pub const AXIS_PADDING_CM: f64 = 5.0;
/// Upper data bound assumed when nothing is visible.
pub const EMPTY_AXIS_MAX_CM: f64 = 30.0;

/// X-axis tick label style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFormat {
    /// `14:05`
    Clock,
    /// `Mar 9`
    MonthDay,
    /// `Mar 9, 24`
    MonthDayYear,
}

impl TickFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Clock => "%H:%M",
            Self::MonthDay => "%b %-d",
            Self::MonthDayYear => "%b %-d, %y",
        }
    }

    /// Label for `epoch_ms` in `tz`; empty when out of range.
    pub fn format<Tz>(self, epoch_ms: i64, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        DateTime::from_timestamp_millis(epoch_ms)
            .map(|at| at.with_timezone(tz).format(self.pattern()).to_string())
            .unwrap_or_default()
    }
}

/// Y-axis `[lower, upper]` for a chart over `readings`: the level range
/// padded by [`AXIS_PADDING_CM`], never below zero.
pub fn level_bounds(readings: &[SensorReading]) -> [f64; 2] {
    let (min, max) = readings
        .iter()
        .map(|r| r.water_level)
        .fold(None, |acc: Option<(f64, f64)>, l| {
            Some(acc.map_or((l, l), |(lo, hi)| (lo.min(l), hi.max(l))))
        })
        .unwrap_or((0.0, EMPTY_AXIS_MAX_CM));

    [(min - AXIS_PADDING_CM).max(0.0), max + AXIS_PADDING_CM]
}
