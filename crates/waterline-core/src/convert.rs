// ── Feed-to-domain conversion ──
//
// Turns loosely typed feed records into `SensorReading`s. Records without a
// usable timestamp are dropped; every other field is coerced with a
// fallback so a reading is never partially populated. Output is sorted
// ascending by epoch.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use waterline_api::feed::is_present;
use waterline_api::Payload;

use crate::model::{DataType, SensorReading};

/// Display format for `SensorReading::timestamp`.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Wall-clock layouts interpreted in the viewer's zone.
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Digit strings at least this long are epoch milliseconds.
const MIN_EPOCH_DIGITS: usize = 10;

// ── Pipeline ───────────────────────────────────────────────────────

/// Normalize a resolved payload into a sorted reading set.
///
/// Notices produce an empty set and are logged, never raised.
pub fn normalize_payload<Tz>(payload: Payload, tz: &Tz) -> Vec<SensorReading>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if let Payload::Notice(ref notice) = payload {
        warn!(%notice, "feed returned a notice instead of readings");
    }
    normalize_records(payload.into_records(), tz)
}

/// Normalize raw records, drop unusable ones, and sort ascending by epoch.
pub fn normalize_records<Tz>(records: Vec<Value>, tz: &Tz) -> Vec<SensorReading>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let total = records.len();
    let mut readings: Vec<SensorReading> = records
        .iter()
        .filter_map(|record| normalize_record(record, tz))
        .collect();

    let dropped = total - readings.len();
    if dropped > 0 {
        warn!(dropped, kept = readings.len(), "dropped feed records without a usable timestamp");
    }

    readings.sort_by_key(|r| r.timestamp_epoch);
    readings
}

/// Convert one raw record. `None` when it is not an object or its
/// timestamp is missing or unparseable.
pub fn normalize_record<Tz>(record: &Value, tz: &Tz) -> Option<SensorReading>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Value::Object(fields) = record else {
        debug!("skipping non-object feed entry");
        return None;
    };

    let raw_timestamp = fields.get("timestamp");
    if !is_present(raw_timestamp) {
        debug!("skipping feed record without timestamp");
        return None;
    }
    let Some(at) = raw_timestamp.and_then(|v| parse_timestamp(v, tz)) else {
        debug!(timestamp = ?raw_timestamp, "skipping feed record with unparseable timestamp");
        return None;
    };

    Some(SensorReading {
        timestamp: format_display(at, tz),
        timestamp_epoch: at.timestamp_millis(),
        network: coerce_text(fields.get("network"), "Unknown"),
        sim: coerce_text(fields.get("sim"), ""),
        sim_operator: coerce_text(fields.get("simOperator"), ""),
        wifi_strength: coerce_number(fields.get("wifiStrength")),
        gsm_strength: coerce_number(fields.get("gsmStrength")),
        water_level: coerce_number(fields.get("waterLevel")),
        status: coerce_text(fields.get("status"), "Unknown"),
        sd_size: coerce_number(fields.get("sdSize")),
        sd_remaining: coerce_number(fields.get("sdRemaining")),
        device: coerce_text(fields.get("device"), "Device"),
        data_type: DataType::from_label(&coerce_text(fields.get("dataType"), "Reading")),
        sms_status: coerce_text(fields.get("smsStatus"), "None"),
    })
}

// ── Timestamps ─────────────────────────────────────────────────────

/// Parse a feed timestamp into an instant.
///
/// Accepts epoch milliseconds (number or long digit string), RFC 3339,
/// RFC 2822, ISO-like wall-clock times and `MM/DD/YYYY` (read in `tz`),
/// and bare `YYYY-MM-DD` dates (UTC midnight).
pub fn parse_timestamp<Tz: TimeZone>(value: &Value, tz: &Tz) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate_millis))
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => parse_timestamp_str(s, tz),
        _ => None,
    }
}

fn parse_timestamp_str<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() >= MIN_EPOCH_DIGITS && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok().and_then(DateTime::from_timestamp_millis);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return local_to_utc(&naive, tz);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return date
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| local_to_utc(&naive, tz));
    }

    None
}

/// Wall-clock time in `tz` to an instant. Ambiguous times take the earlier
/// instant; times skipped by a DST jump are rejected.
fn local_to_utc<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn truncate_millis(ms: f64) -> Option<i64> {
    // Beyond ±2^53 the value is not an exact integer anyway.
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    (ms.is_finite() && ms.abs() < LIMIT).then(|| ms.trunc() as i64)
}

/// Render an instant as `DD/MM/YYYY HH:MM:SS` in `tz`.
pub fn format_display<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}

// ── Field coercion ─────────────────────────────────────────────────

/// Loose numeric coercion: numbers, numeric strings, and booleans.
/// Anything else, and any non-finite result, is `0`.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

/// Present scalars become text; absent or falsy values take `fallback`.
/// Arrays and objects are not meaningful text and also take `fallback`.
pub fn coerce_text(value: Option<&Value>, fallback: &str) -> String {
    if !is_present(value) {
        return fallback.to_owned();
    }
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => fallback.to_owned(),
    }
}
