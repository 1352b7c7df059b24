//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use waterline_core::view::filter_range;
use waterline_core::{Monitor, MonitorConfig, RangePreset, SensorReading, TimeRange};

use crate::cli::{GlobalOpts, RangeArgs, RangeChoice};
use crate::error::CliError;

// ── Fetching ────────────────────────────────────────────────────────

/// Load the feed once and return the sorted dataset.
pub async fn fetch_readings(
    config: MonitorConfig,
    global: &GlobalOpts,
) -> Result<Arc<Vec<SensorReading>>, CliError> {
    let endpoint = config.endpoint.clone();
    let pb = spinner(&format!("Fetching {endpoint}"), global.quiet);

    let result = Monitor::oneshot(config, |monitor| async move { Ok(monitor.readings()) }).await;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let readings = result?;
    tracing::debug!(count = readings.len(), %endpoint, "feed loaded");
    Ok(readings)
}

/// Stderr spinner, only when a human is watching.
pub fn spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet || !io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

// ── Ranges ──────────────────────────────────────────────────────────

/// Translate `--range` / `--from` / `--to` into a [`TimeRange`], falling
/// back to `default` when none is given.
pub fn time_range(args: &RangeArgs, default: RangePreset) -> Result<TimeRange, CliError> {
    if args.from.is_none() && args.to.is_none() {
        return Ok(TimeRange::Preset(args.range.map_or(default, preset)));
    }

    let start = args.from.as_deref().map(|s| parse_day("from", s)).transpose()?;
    let end = args.to.as_deref().map(|s| parse_day("to", s)).transpose()?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(CliError::Validation {
                field: "from".into(),
                reason: format!("{start} is after --to {end}"),
            });
        }
    }
    Ok(TimeRange::Custom { start, end })
}

fn preset(choice: RangeChoice) -> RangePreset {
    match choice {
        RangeChoice::Day => RangePreset::Last24Hours,
        RangeChoice::Week => RangePreset::Last7Days,
        RangeChoice::Month => RangePreset::Last30Days,
        RangeChoice::All => RangePreset::All,
    }
}

fn parse_day(field: &str, raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("expected YYYY-MM-DD, got '{raw}' ({e})"),
    })
}

/// Readings inside `range` as of now. Custom days are UTC calendar days.
pub fn in_range<'a>(readings: &'a [SensorReading], range: &TimeRange) -> &'a [SensorReading] {
    filter_range(readings, range, Utc::now())
}

// ── Shared table row ────────────────────────────────────────────────

/// Log-table row; the same columns as the CSV export.
#[derive(Tabled)]
pub struct ReadingRow {
    #[tabled(rename = "Timestamp")]
    pub timestamp: String,
    #[tabled(rename = "Level (cm)")]
    pub level: f64,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Network")]
    pub network: String,
    #[tabled(rename = "Signal")]
    pub signal: String,
    #[tabled(rename = "Device")]
    pub device: String,
    #[tabled(rename = "SMS")]
    pub sms: String,
}

impl From<&SensorReading> for ReadingRow {
    fn from(r: &SensorReading) -> Self {
        Self {
            timestamp: r.timestamp.clone(),
            level: r.water_level,
            status: r.status.clone(),
            network: r.network.clone(),
            signal: r.signal_label(),
            device: r.device.clone(),
            sms: r.sms_status.clone(),
        }
    }
}

/// Tab-separated plain line for scripting.
pub fn plain_line(r: &SensorReading) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        r.timestamp_epoch,
        r.water_level,
        r.status,
        r.signal_label()
    )
}
