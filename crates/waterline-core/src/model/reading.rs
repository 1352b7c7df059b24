use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{DataType, LevelStatus, StorageHealth};

/// Assumed SD card size when the device reports none.
pub const DEFAULT_SD_TOTAL_MB: f64 = 1024.0;

/// One normalized sensor record.
///
/// Every field is populated; absent feed values are replaced by fallbacks
/// during conversion. `timestamp_epoch` is the sort and filter key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Local `DD/MM/YYYY HH:MM:SS`.
    pub timestamp: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_epoch: i64,
    pub network: String,
    pub sim: String,
    pub sim_operator: String,
    /// dBm.
    pub wifi_strength: f64,
    /// CSQ, 0-31.
    pub gsm_strength: f64,
    /// Centimetres.
    pub water_level: f64,
    /// Device label as reported (`Low`, `Good`, `Flood Alert`, ...).
    pub status: String,
    /// MB.
    pub sd_size: f64,
    /// MB.
    pub sd_remaining: f64,
    pub device: String,
    pub data_type: DataType,
    pub sms_status: String,
}

impl SensorReading {
    /// `status` classified for coloring; unrecognized labels are `Unknown`.
    pub fn level_status(&self) -> LevelStatus {
        LevelStatus::from_label(&self.status)
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_epoch)
    }

    /// WiFi is the primary link only when the network is exactly `"WiFi"`.
    pub fn is_wifi(&self) -> bool {
        self.network == "WiFi"
    }

    /// Primary-link signal, e.g. `-67dBm` or `18CSQ`.
    pub fn signal_label(&self) -> String {
        if self.is_wifi() {
            format!("{}dBm", self.wifi_strength)
        } else {
            format!("{}CSQ", self.gsm_strength)
        }
    }

    /// Gauge fill, 0-100.
    pub fn gauge_percent(&self, max_level_cm: f64) -> f64 {
        if max_level_cm <= 0.0 {
            return 0.0;
        }
        (self.water_level / max_level_cm * 100.0).clamp(0.0, 100.0)
    }

    /// -100 dBm maps to 0 %, -50 dBm and stronger to 100 %.
    pub fn wifi_quality_percent(&self) -> f64 {
        (2.0 * (self.wifi_strength + 100.0)).clamp(0.0, 100.0)
    }

    pub fn gsm_quality_percent(&self) -> f64 {
        (self.gsm_strength / 31.0 * 100.0).clamp(0.0, 100.0)
    }

    /// Quality of whichever link is active.
    pub fn signal_percent(&self) -> f64 {
        if self.is_wifi() {
            self.wifi_quality_percent()
        } else {
            self.gsm_quality_percent()
        }
    }

    pub fn sd_total_mb(&self) -> f64 {
        if self.sd_size > 0.0 {
            self.sd_size
        } else {
            DEFAULT_SD_TOTAL_MB
        }
    }

    pub fn sd_free_percent(&self) -> f64 {
        (self.sd_remaining / self.sd_total_mb() * 100.0).clamp(0.0, 100.0)
    }

    pub fn storage_health(&self) -> StorageHealth {
        StorageHealth::from_free_percent(self.sd_free_percent())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Reading at `epoch` ms with `level` cm and otherwise fallback fields.
    pub(crate) fn reading(epoch: i64, level: f64) -> SensorReading {
        SensorReading {
            timestamp: String::new(),
            timestamp_epoch: epoch,
            network: "Unknown".into(),
            sim: String::new(),
            sim_operator: String::new(),
            wifi_strength: 0.0,
            gsm_strength: 0.0,
            water_level: level,
            status: "Unknown".into(),
            sd_size: 0.0,
            sd_remaining: 0.0,
            device: "Device".into(),
            data_type: DataType::Reading,
            sms_status: "None".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::reading;
    use super::*;

    #[test]
    fn signal_label_follows_active_network() {
        let mut r = reading(0, 10.0);
        r.wifi_strength = -67.0;
        r.gsm_strength = 18.0;
        assert_eq!(r.signal_label(), "18CSQ");

        r.network = "WiFi".into();
        assert_eq!(r.signal_label(), "-67dBm");

        r.network = "wifi".into();
        assert_eq!(r.signal_label(), "18CSQ");
    }

    #[test]
    fn level_status_classifies_the_raw_label() {
        let mut r = reading(0, 10.0);
        r.status = "Flood Alert".into();
        assert_eq!(r.level_status(), LevelStatus::FloodAlert);
        r.status = "Normal".into();
        assert_eq!(r.level_status(), LevelStatus::Unknown);
        assert_eq!(r.status, "Normal");
    }

    #[test]
    fn gauge_percent_clamps() {
        let r = reading(0, 15.0);
        assert!((r.gauge_percent(30.0) - 50.0).abs() < f64::EPSILON);
        assert!((reading(0, 45.0).gauge_percent(30.0) - 100.0).abs() < f64::EPSILON);
        assert!(reading(0, -3.0).gauge_percent(30.0).abs() < f64::EPSILON);
        assert!(r.gauge_percent(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn signal_quality_scales() {
        let mut r = reading(0, 0.0);
        r.wifi_strength = -75.0;
        r.gsm_strength = 31.0;
        assert!((r.wifi_quality_percent() - 50.0).abs() < f64::EPSILON);
        assert!((r.gsm_quality_percent() - 100.0).abs() < f64::EPSILON);

        r.wifi_strength = -20.0;
        assert!((r.wifi_quality_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sd_defaults_to_one_gigabyte() {
        let mut r = reading(0, 0.0);
        r.sd_remaining = 512.0;
        assert!((r.sd_free_percent() - 50.0).abs() < f64::EPSILON);
        assert_eq!(r.storage_health(), StorageHealth::Ok);

        r.sd_size = 4096.0;
        r.sd_remaining = 300.0;
        assert_eq!(r.storage_health(), StorageHealth::Critical);
    }

    #[test]
    fn serializes_with_feed_field_names() {
        let json = serde_json::to_value(reading(1_000, 12.5)).unwrap_or_default();
        assert_eq!(json["timestampEpoch"], 1_000);
        assert_eq!(json["waterLevel"], 12.5);
        assert_eq!(json["smsStatus"], "None");
        assert_eq!(json["dataType"], "Reading");
    }
}
