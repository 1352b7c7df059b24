//! `waterline watch`: poll the feed and stream new readings until Ctrl-C.

use std::time::Duration;

use waterline_core::config::DEFAULT_REFRESH_INTERVAL;
use waterline_core::{FeedStatus, Monitor, MonitorConfig, SensorReading};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    mut config: MonitorConfig,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.interval {
        Some(0) => {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        Some(secs) => config.refresh_interval = Duration::from_secs(secs),
        None if config.refresh_interval.is_zero() => {
            config.refresh_interval = DEFAULT_REFRESH_INTERVAL;
        }
        None => {}
    }

    let period = config.refresh_interval;
    let monitor = Monitor::new(config)?;
    let mut readings = monitor.subscribe();
    let mut status = monitor.status();
    monitor.start().await;

    if !global.quiet {
        eprintln!(
            "Watching {} every {}s (Ctrl-C to stop)",
            monitor.config().endpoint,
            period.as_secs()
        );
    }

    let color = output::should_color(&global.color);
    let mut last_seen: Option<i64> = None;

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            snap = readings.changed() => {
                let Some(snap) = snap else { break Ok(()) };
                if let Err(e) = emit_new(&snap, &mut last_seen, global, color) {
                    break Err(e);
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = status.borrow_and_update().clone();
                report_status(&current, global.quiet);
            }
        }
    };

    monitor.stop().await;
    result
}

/// Print readings newer than `last_seen`. The first snapshot prints only its
/// newest reading.
fn emit_new(
    snapshot: &[SensorReading],
    last_seen: &mut Option<i64>,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let fresh: Vec<&SensorReading> = match *last_seen {
        Some(seen) => snapshot.iter().filter(|r| r.timestamp_epoch > seen).collect(),
        None => snapshot.last().into_iter().collect(),
    };

    for reading in &fresh {
        let line = format_line(reading, &global.output, color)?;
        output::print_output(&line, global.quiet);
    }
    if let Some(newest) = snapshot.last() {
        *last_seen = Some(newest.timestamp_epoch);
    }
    Ok(())
}

fn format_line(r: &SensorReading, format: &OutputFormat, color: bool) -> Result<String, CliError> {
    match format {
        // One JSON document per line.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(r, true),
        OutputFormat::Yaml => Ok(format!("---\n{}", serde_yaml::to_string(r)?)),
        OutputFormat::Plain => Ok(super::util::plain_line(r)),
        OutputFormat::Table => Ok(format!(
            "{}  {:>6} cm  {:<11}  {} {}",
            r.timestamp,
            r.water_level,
            output::paint_status(&r.status, color),
            r.network,
            r.signal_label()
        )),
    }
}

fn report_status(status: &FeedStatus, quiet: bool) {
    match status {
        FeedStatus::Degraded { error } => {
            tracing::warn!(%error, "refresh failed; keeping previous readings");
            if !quiet {
                eprintln!("⚠ Refresh failed, showing previous readings: {error}");
            }
        }
        FeedStatus::Failed { error } => {
            tracing::warn!(%error, "refresh failed with no data loaded");
            if !quiet {
                eprintln!("✗ Could not load the feed: {error}");
            }
        }
        FeedStatus::Idle | FeedStatus::Loading | FeedStatus::Ready => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ColorMode;

    fn reading(epoch: i64, level: f64) -> SensorReading {
        SensorReading {
            timestamp: format!("t{epoch}"),
            timestamp_epoch: epoch,
            network: "GSM".into(),
            sim: String::new(),
            sim_operator: String::new(),
            wifi_strength: 0.0,
            gsm_strength: 20.0,
            water_level: level,
            status: "Good".into(),
            sd_size: 0.0,
            sd_remaining: 0.0,
            device: "Device".into(),
            data_type: waterline_core::DataType::Reading,
            sms_status: "None".into(),
        }
    }

    fn quiet_plain() -> GlobalOpts {
        GlobalOpts {
            profile: None,
            endpoint: None,
            output: OutputFormat::Plain,
            color: ColorMode::Never,
            verbose: 0,
            quiet: true,
            insecure: false,
            timeout: None,
        }
    }

    #[test]
    fn tracks_the_newest_epoch() {
        let global = quiet_plain();
        let mut seen = None;

        emit_new(&[reading(1, 1.0), reading(2, 2.0)], &mut seen, &global, false).ok();
        assert_eq!(seen, Some(2));

        emit_new(&[reading(1, 1.0), reading(2, 2.0), reading(5, 3.0)], &mut seen, &global, false)
            .ok();
        assert_eq!(seen, Some(5));

        emit_new(&[], &mut seen, &global, false).ok();
        assert_eq!(seen, Some(5));
    }

    #[test]
    fn table_line_shows_level_and_signal() {
        let line = format_line(&reading(1, 12.5), &OutputFormat::Table, false).ok();
        let line = line.unwrap_or_default();
        assert!(line.contains("12.5 cm"));
        assert!(line.contains("GSM 20CSQ"));
    }
}
