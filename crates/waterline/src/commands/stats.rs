//! `waterline stats`: level summary over a range.

use serde::Serialize;

use waterline_core::view::summarize;
use waterline_core::{LevelSummary, MonitorConfig, RangePreset};

use crate::cli::{GlobalOpts, RangeArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct StatsView {
    range: String,
    #[serde(flatten)]
    summary: LevelSummary,
}

fn detail(v: &StatsView) -> String {
    [
        format!("Range:    {}", v.range),
        format!("Readings: {}", v.summary.count),
        format!("Average:  {:.2} cm", v.summary.average),
        format!("Max:      {:.2} cm", v.summary.max),
        format!("Min:      {:.2} cm", v.summary.min),
    ]
    .join("\n")
}

pub async fn handle(
    config: MonitorConfig,
    args: &RangeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let range = util::time_range(args, RangePreset::All)?;
    let readings = util::fetch_readings(config, global).await?;

    let view = StatsView {
        range: range.label(),
        summary: summarize(util::in_range(&readings, &range)),
    };
    let out = output::render_single(&global.output, &view, detail, |v| {
        format!(
            "{}\t{}\t{}\t{}",
            v.summary.average, v.summary.max, v.summary.min, v.summary.count
        )
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
