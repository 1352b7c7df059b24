// ── CSV export ──
//
// Serializes the full authoritative dataset, newest first. Range filters,
// downsampling, and pagination never apply here.

use std::io;

use serde::Serialize;

use crate::error::CoreError;
use crate::model::SensorReading;
use crate::view::newest_first;

/// Default file name for exports.
pub const EXPORT_FILE_NAME: &str = "water_monitor_data.csv";

pub const EXPORT_HEADER: [&str; 7] = [
    "Timestamp",
    "Level (cm)",
    "Status",
    "Network",
    "Signal",
    "Device",
    "SMS",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    timestamp: &'a str,
    level: String,
    status: &'a str,
    network: &'a str,
    signal: String,
    device: &'a str,
    sms: &'a str,
}

impl<'a> From<&'a SensorReading> for ExportRow<'a> {
    fn from(r: &'a SensorReading) -> Self {
        Self {
            timestamp: &r.timestamp,
            level: r.water_level.to_string(),
            status: &r.status,
            network: &r.network,
            signal: r.signal_label(),
            device: &r.device,
            sms: &r.sms_status,
        }
    }
}

/// Write `readings` as CSV to `writer`, header first. Returns the row count.
pub fn write_csv<W: io::Write>(readings: &[SensorReading], writer: W) -> Result<usize, CoreError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(EXPORT_HEADER)?;
    for reading in newest_first(readings) {
        csv.serialize(ExportRow::from(reading))?;
    }
    csv.flush().map_err(|e| CoreError::Export {
        message: e.to_string(),
    })?;

    Ok(readings.len())
}

/// Render `readings` as a CSV string.
pub fn to_csv_string(readings: &[SensorReading]) -> Result<String, CoreError> {
    let mut buf = Vec::new();
    write_csv(readings, &mut buf)?;
    String::from_utf8(buf).map_err(|e| CoreError::Export {
        message: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::fixtures::reading;
    use crate::view::{RangePreset, TimeRange, filter_range};

    fn sample() -> Vec<SensorReading> {
        let mut gsm = reading(1_000, 12.5);
        gsm.timestamp = "01/01/2024 10:00:00".into();
        gsm.network = "GSM".into();
        gsm.gsm_strength = 18.0;
        gsm.status = "Good".into();
        gsm.device = "Tank-A".into();
        gsm.sms_status = "Sent".into();

        let mut wifi = reading(2_000, 27.0);
        wifi.timestamp = "01/01/2024 11:00:00".into();
        wifi.network = "WiFi".into();
        wifi.wifi_strength = -67.0;
        wifi.status = "Flood Alert".into();
        wifi.device = "Tank-A".into();

        vec![gsm, wifi]
    }

    #[test]
    fn rows_are_newest_first_with_signal_units() {
        let csv = to_csv_string(&sample()).unwrap();
        insta::assert_snapshot!(csv, @r"
        Timestamp,Level (cm),Status,Network,Signal,Device,SMS
        01/01/2024 11:00:00,27,Flood Alert,WiFi,-67dBm,Tank-A,None
        01/01/2024 10:00:00,12.5,Good,GSM,18CSQ,Tank-A,Sent
        ");
    }

    #[test]
    fn empty_dataset_still_has_header() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(csv, "Timestamp,Level (cm),Status,Network,Signal,Device,SMS\n");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let mut data = sample();
        data[0].device = "Tank A, north".into();
        let csv = to_csv_string(&data).unwrap();
        assert!(csv.contains("\"Tank A, north\""));
    }

    #[test]
    fn device_status_is_written_as_reported() {
        let mut data = sample();
        data[1].status = "Normal".into();
        let csv = to_csv_string(&data).unwrap();
        assert!(csv.contains("01/01/2024 11:00:00,27,Normal,WiFi"));
    }

    #[test]
    fn export_ignores_active_range() {
        let data = sample();
        let filtered = filter_range(
            &data,
            &TimeRange::from(RangePreset::Last24Hours),
            chrono::Utc::now(),
        );
        assert!(filtered.is_empty());

        let rows = write_csv(&data, io::sink()).unwrap();
        assert_eq!(rows, 2);
    }
}
