//! CSV export of the full dataset to the working directory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use waterline_core::{EXPORT_FILE_NAME, SensorReading};

pub fn default_path() -> PathBuf {
    PathBuf::from(EXPORT_FILE_NAME)
}

/// Write every reading, newest first, replacing `path`. Returns the row count.
pub fn write_file(readings: &[SensorReading], path: &Path) -> Result<usize> {
    let file = File::create(path).wrap_err_with(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let rows = waterline_core::write_csv(readings, &mut writer)?;
    writer.flush()?;
    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support;
    use pretty_assertions::assert_eq;

    fn reading(epoch: i64, level: f64) -> SensorReading {
        let mut r = test_support::reading(epoch, level);
        r.timestamp = format!("01/01/2024 10:0{epoch}:00");
        r.network = "WiFi".into();
        r.wifi_strength = -61.0;
        r
    }

    #[test]
    fn writes_newest_first_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        std::fs::write(&path, "stale").unwrap();

        let rows = write_file(&[reading(1, 10.0), reading(2, 12.5)], &path).unwrap();
        assert_eq!(rows, 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Timestamp,Level (cm),Status,Network,Signal,Device,SMS",
                "01/01/2024 10:02:00,12.5,Good,WiFi,-61dBm,Tank,None",
                "01/01/2024 10:01:00,10,Good,WiFi,-61dBm,Tank,None",
            ]
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join(EXPORT_FILE_NAME);
        assert!(write_file(&[reading(1, 1.0)], &path).is_err());
    }
}
