//! `waterline latest`: the newest reading with its derived gauges.

use serde::Serialize;

use waterline_core::{MonitorConfig, SensorReading, StorageHealth};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LatestView {
    #[serde(flatten)]
    reading: SensorReading,
    gauge_percent: f64,
    signal_percent: f64,
    sd_total_mb: f64,
    sd_free_percent: f64,
    storage_health: StorageHealth,
}

impl LatestView {
    fn new(reading: SensorReading, max_level_cm: f64) -> Self {
        Self {
            gauge_percent: reading.gauge_percent(max_level_cm),
            signal_percent: reading.signal_percent(),
            sd_total_mb: reading.sd_total_mb(),
            sd_free_percent: reading.sd_free_percent(),
            storage_health: reading.storage_health(),
            reading,
        }
    }
}

fn detail(v: &LatestView, color: bool) -> String {
    let r = &v.reading;
    let sim = match (r.sim_operator.as_str(), r.sim.as_str()) {
        ("", "") => "-".to_owned(),
        (op, "") | ("", op) => op.to_owned(),
        (op, sim) => format!("{op} ({sim})"),
    };
    [
        format!("Timestamp: {}", r.timestamp),
        format!(
            "Level:     {} cm ({:.0}% of gauge)",
            r.water_level, v.gauge_percent
        ),
        format!("Status:    {}", output::paint_status(&r.status, color)),
        format!("Device:    {} ({})", r.device, r.data_type),
        format!(
            "Network:   {} {} ({:.0}% signal)",
            r.network,
            r.signal_label(),
            v.signal_percent
        ),
        format!("SIM:       {sim}"),
        format!("SMS:       {}", r.sms_status),
        format!(
            "Storage:   {} / {} MB free ({:.0}%, {})",
            r.sd_remaining, v.sd_total_mb, v.sd_free_percent, v.storage_health
        ),
    ]
    .join("\n")
}

pub async fn handle(config: MonitorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let max_level_cm = config.max_level_cm;
    let readings = util::fetch_readings(config, global).await?;
    let latest = readings.last().cloned().ok_or(CliError::NoData)?;

    let view = LatestView::new(latest, max_level_cm);
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| util::plain_line(&v.reading),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
