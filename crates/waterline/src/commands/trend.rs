//! `waterline trend`: the downsampled chart series for a range.

use chrono::Local;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use waterline_core::view::{HIGH_REFERENCE_CM, LOW_REFERENCE_CM, downsample, level_bounds};
use waterline_core::{MonitorConfig, RangePreset};

use crate::cli::{GlobalOpts, TrendArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct TrendPoint {
    #[tabled(skip)]
    epoch: i64,
    #[tabled(rename = "Time")]
    label: String,
    #[tabled(rename = "Level (cm)")]
    level: f64,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrendView {
    range: String,
    /// strftime pattern used for `label`.
    tick_format: &'static str,
    /// Y-axis `[lower, upper]`.
    axis: [f64; 2],
    reference_lines: [f64; 2],
    /// Readings in range before downsampling.
    source_count: usize,
    points: Vec<TrendPoint>,
}

fn detail(v: &TrendView) -> String {
    let table = Table::new(&v.points).with(Style::rounded()).to_string();
    format!(
        "{table}\n{} points from {} readings ({}), axis {:.1}-{:.1} cm, reference lines {} / {} cm",
        v.points.len(),
        v.source_count,
        v.range,
        v.axis[0],
        v.axis[1],
        v.reference_lines[0],
        v.reference_lines[1],
    )
}

pub async fn handle(
    config: MonitorConfig,
    args: &TrendArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let range = util::time_range(&args.range, RangePreset::Last24Hours)?;
    let readings = util::fetch_readings(config, global).await?;

    let visible = util::in_range(&readings, &range);
    let sampled = downsample(visible, args.points);
    let ticks = range.tick_format();

    let view = TrendView {
        range: range.label(),
        tick_format: ticks.pattern(),
        axis: level_bounds(&sampled),
        reference_lines: [LOW_REFERENCE_CM, HIGH_REFERENCE_CM],
        source_count: visible.len(),
        points: sampled
            .iter()
            .map(|r| TrendPoint {
                epoch: r.timestamp_epoch,
                label: ticks.format(r.timestamp_epoch, &Local),
                level: r.water_level,
                status: r.status.clone(),
            })
            .collect(),
    };

    let out = output::render_single(&global.output, &view, detail, |v| {
        v.points
            .iter()
            .map(|p| format!("{}\t{}", p.epoch, p.level))
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
