// ── Domain model ──
//
// Canonical, fully populated reading types. Everything downstream of
// `convert` works with these and never with raw feed JSON.

mod reading;
mod status;

pub use reading::{DEFAULT_SD_TOTAL_MB, SensorReading};
pub use status::{DataType, LevelStatus, StorageHealth};

#[cfg(test)]
pub(crate) use reading::fixtures;
