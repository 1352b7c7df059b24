//! `waterline export`: the whole dataset as CSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use waterline_core::{MonitorConfig, write_csv};

use crate::cli::{ExportArgs, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn handle(
    config: MonitorConfig,
    args: &ExportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let to_stdout = args.file.as_os_str() == "-";
    if !to_stdout && !args.force && args.file.exists() {
        return Err(CliError::FileExists {
            path: args.file.display().to_string(),
        });
    }

    let readings = util::fetch_readings(config, global).await?;

    if to_stdout {
        let stdout = io::stdout().lock();
        write_csv(&readings, stdout)?;
        return Ok(());
    }

    let rows = write_file(&readings, &args.file)?;
    tracing::info!(rows, path = %args.file.display(), "export written");
    if !global.quiet {
        eprintln!("✓ Exported {rows} readings to {}", args.file.display());
    }
    Ok(())
}

fn write_file(readings: &[waterline_core::SensorReading], path: &Path) -> Result<usize, CliError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let rows = write_csv(readings, &mut writer)?;
    writer.flush()?;
    Ok(rows)
}
