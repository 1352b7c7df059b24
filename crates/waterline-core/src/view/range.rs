use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::axis::TickFormat;
use crate::model::SensorReading;

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Fixed lookback windows ending now.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum RangePreset {
    #[default]
    #[strum(serialize = "24h")]
    Last24Hours,
    #[strum(serialize = "7d")]
    Last7Days,
    #[strum(serialize = "30d")]
    Last30Days,
    #[strum(serialize = "all")]
    All,
}

impl RangePreset {
    pub fn label(self) -> &'static str {
        match self {
            Self::Last24Hours => "24 Hours",
            Self::Last7Days => "1 Week",
            Self::Last30Days => "1 Month",
            Self::All => "All Data",
        }
    }

    /// Window length in milliseconds; `None` for all time.
    pub fn lookback_ms(self) -> Option<i64> {
        match self {
            Self::Last24Hours => Some(DAY_MS),
            Self::Last7Days => Some(7 * DAY_MS),
            Self::Last30Days => Some(30 * DAY_MS),
            Self::All => None,
        }
    }
}

/// A chart/filter range: a preset or explicit calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Preset(RangePreset),
    /// Whole calendar days, midnight to midnight UTC. Unset start means no
    /// lower bound; unset end means now.
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Preset(RangePreset::default())
    }
}

impl From<RangePreset> for TimeRange {
    fn from(preset: RangePreset) -> Self {
        Self::Preset(preset)
    }
}

impl TimeRange {
    /// Inclusive `[start, end]` epoch window, or `None` for all time.
    pub fn window(&self, now: DateTime<Utc>) -> Option<(i64, i64)> {
        let now_ms = now.timestamp_millis();
        match *self {
            Self::Preset(preset) => preset
                .lookback_ms()
                .map(|lookback| (now_ms.saturating_sub(lookback), now_ms)),
            Self::Custom { start, end } => {
                let start_ms = start.map_or(0, day_start_ms);
                let end_ms = end.map_or(now_ms, |day| day_start_ms(day) + DAY_MS - 1);
                Some((start_ms, end_ms))
            }
        }
    }

    /// X-axis tick style for charts over this range.
    pub fn tick_format(&self) -> TickFormat {
        match self {
            Self::Preset(RangePreset::Last24Hours) => TickFormat::Clock,
            Self::Preset(RangePreset::Last7Days | RangePreset::Last30Days) => TickFormat::MonthDay,
            Self::Preset(RangePreset::All) | Self::Custom { .. } => TickFormat::MonthDayYear,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Preset(preset) => preset.label().to_owned(),
            Self::Custom { start, end } => {
                let fmt = |d: Option<NaiveDate>, open: &str| {
                    d.map_or_else(|| open.to_owned(), |d| d.format("%Y-%m-%d").to_string())
                };
                format!("{} to {}", fmt(*start, "beginning"), fmt(*end, "now"))
            }
        }
    }
}

/// UTC midnight of `day`, the same instant a bare `YYYY-MM-DD` timestamp
/// parses to.
fn day_start_ms(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Contiguous run of `readings` inside the inclusive window.
///
/// `readings` must be sorted ascending by epoch; the result borrows from it
/// and keeps its order. `None` returns everything.
pub fn filter_window(readings: &[SensorReading], window: Option<(i64, i64)>) -> &[SensorReading] {
    let Some((start, end)) = window else {
        return readings;
    };
    let lo = readings.partition_point(|r| r.timestamp_epoch < start);
    let hi = readings.partition_point(|r| r.timestamp_epoch <= end);
    readings.get(lo..hi).unwrap_or_default()
}

/// Apply `range` as of `now`.
pub fn filter_range<'a>(
    readings: &'a [SensorReading],
    range: &TimeRange,
    now: DateTime<Utc>,
) -> &'a [SensorReading] {
    filter_window(readings, range.window(now))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::FixedOffset;

    use super::*;
    use crate::model::fixtures::reading;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn utc_ms(s: &str) -> i64 {
        DateTime::parse_from_rfc3339(s).unwrap().timestamp_millis()
    }

    fn epochs(readings: &[SensorReading]) -> Vec<i64> {
        readings.iter().map(|r| r.timestamp_epoch).collect()
    }

    fn hourly(hours_back: i64) -> Vec<SensorReading> {
        let now_ms = now().timestamp_millis();
        (0..=hours_back)
            .rev()
            .map(|h| reading(now_ms - h * HOUR_MS, 1.0))
            .collect()
    }

    #[test]
    fn last_24_hours_is_inclusive() {
        let data = hourly(48);
        let filtered = filter_range(&data, &RangePreset::Last24Hours.into(), now());
        assert_eq!(filtered.len(), 25);
        assert_eq!(
            filtered.first().map(|r| r.timestamp_epoch),
            Some(now().timestamp_millis() - DAY_MS)
        );
    }

    #[test]
    fn all_returns_everything() {
        let data = hourly(5);
        let filtered = filter_range(&data, &RangePreset::All.into(), now());
        assert_eq!(filtered.len(), data.len());
    }

    #[test]
    fn future_readings_are_outside_presets() {
        let mut data = hourly(2);
        data.push(reading(now().timestamp_millis() + 1, 1.0));
        let filtered = filter_range(&data, &RangePreset::Last7Days.into(), now());
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn filter_is_idempotent_subsequence() {
        let data = hourly(24 * 40);
        let range = TimeRange::from(RangePreset::Last30Days);
        let once = filter_range(&data, &range, now());
        let twice = filter_range(once, &range, now());
        assert_eq!(epochs(once), epochs(twice));
        assert!(once.windows(2).all(|w| w[0].timestamp_epoch <= w[1].timestamp_epoch));
        assert!(epochs(once).iter().all(|e| data.iter().any(|r| r.timestamp_epoch == *e)));
    }

    #[test]
    fn custom_end_covers_the_whole_day() {
        let range = TimeRange::Custom {
            start: Some(day("2024-03-01")),
            end: Some(day("2024-03-02")),
        };
        let (start, end) = range.window(now()).unwrap();
        assert_eq!(start, day("2024-03-01").and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        assert_eq!(end, day("2024-03-03").and_time(NaiveTime::MIN).and_utc().timestamp_millis() - 1);
    }

    #[test]
    fn custom_days_are_utc_whatever_the_viewer_zone() {
        let range = TimeRange::Custom {
            start: Some(day("2024-03-01")),
            end: Some(day("2024-03-01")),
        };
        let (start, end) = range.window(now()).unwrap();
        assert_eq!(start, utc_ms("2024-03-01T00:00:00Z"));
        assert_eq!(end, utc_ms("2024-03-01T23:59:59.999Z"));

        // 01:30 on Mar 2 at +05:30 is still Mar 1 in UTC.
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let evening = DateTime::parse_from_rfc3339("2024-03-01T20:00:00Z").unwrap();
        assert_eq!(
            evening.with_timezone(&ist).date_naive(),
            day("2024-03-02")
        );
        let data = vec![
            reading(utc_ms("2024-02-29T23:59:59.999Z"), 1.0),
            reading(evening.timestamp_millis(), 2.0),
            reading(utc_ms("2024-03-02T00:00:00Z"), 3.0),
        ];
        let kept = filter_range(&data, &range, now());
        assert_eq!(epochs(kept), vec![evening.timestamp_millis()]);
    }

    #[test]
    fn custom_day_matches_bare_date_timestamp() {
        let parsed = crate::convert::parse_timestamp(&serde_json::json!("2024-03-01"), &Utc)
            .unwrap()
            .timestamp_millis();
        let range = TimeRange::Custom {
            start: Some(day("2024-03-01")),
            end: None,
        };
        assert_eq!(range.window(now()).map(|w| w.0), Some(parsed));
    }

    #[test]
    fn custom_without_start_has_no_lower_bound() {
        let data = vec![reading(0, 1.0), reading(1_000, 2.0)];
        let range = TimeRange::Custom {
            start: None,
            end: None,
        };
        assert_eq!(filter_range(&data, &range, now()).len(), 2);
    }

    #[test]
    fn inverted_custom_range_is_empty() {
        let data = hourly(24 * 20);
        let range = TimeRange::Custom {
            start: Some(day("2024-03-08")),
            end: Some(day("2024-03-01")),
        };
        assert!(filter_range(&data, &range, now()).is_empty());
    }

    #[test]
    fn presets_parse_from_short_names() {
        assert_eq!("7d".parse::<RangePreset>().ok(), Some(RangePreset::Last7Days));
        assert_eq!(RangePreset::Last30Days.to_string(), "30d");
        assert!("1y".parse::<RangePreset>().is_err());
    }

    #[test]
    fn tick_format_by_range() {
        assert_eq!(TimeRange::from(RangePreset::Last24Hours).tick_format(), TickFormat::Clock);
        assert_eq!(TimeRange::from(RangePreset::Last7Days).tick_format(), TickFormat::MonthDay);
        assert_eq!(TimeRange::from(RangePreset::All).tick_format(), TickFormat::MonthDayYear);
        let custom = TimeRange::Custom {
            start: None,
            end: None,
        };
        assert_eq!(custom.tick_format(), TickFormat::MonthDayYear);
    }
}
