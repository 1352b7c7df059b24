use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Known level classifications. Derived from the device's label, never
/// recomputed from `water_level`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum LevelStatus {
    Low,
    Good,
    Excess,
    #[serde(rename = "Flood Alert")]
    #[strum(serialize = "Flood Alert")]
    FloodAlert,
    #[default]
    Unknown,
}

impl LevelStatus {
    /// Parse a device label, falling back to `Unknown` for anything unrecognized.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }

    /// `Excess` and `Flood Alert` both need attention.
    pub fn is_alarm(self) -> bool {
        matches!(self, Self::Excess | Self::FloodAlert)
    }
}

/// How the device produced a reading.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum DataType {
    #[default]
    Reading,
    Live,
    Backup,
}

impl DataType {
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

/// SD card free-space severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum StorageHealth {
    Ok,
    Warning,
    Critical,
}

impl StorageHealth {
    /// Below 10 % free is critical, below 25 % a warning.
    pub fn from_free_percent(percent: f64) -> Self {
        if percent < 10.0 {
            Self::Critical
        } else if percent < 25.0 {
            Self::Warning
        } else {
            Self::Ok
        }
    }
}
