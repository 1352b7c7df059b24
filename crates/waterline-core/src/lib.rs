//! Reactive data layer between `waterline-api` and the CLI / TUI front-ends.
//!
//! - **[`Monitor`]**: lifecycle facade. [`refresh()`](Monitor::refresh)
//!   fetches, normalizes, and swaps in a new dataset; [`start()`](Monitor::start)
//!   spawns the periodic refresh task; [`Monitor::oneshot()`] serves single
//!   CLI invocations.
//!
//! - **[`ReadingStore`]**: the authoritative, chronologically sorted dataset.
//!   Replace-only; readers get `Arc` snapshots or a [`ReadingStream`].
//!
//! - **[`convert`]**: turns loosely typed feed records into [`SensorReading`]s.
//!
//! - **[`view`]**: pure derivations over a snapshot (range filter,
//!   downsampling, summary statistics, pagination, chart axes).
//!
//! - **[`export`]**: CSV serialization of the full dataset.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod export;
pub mod model;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{MonitorConfig, TlsVerification};
pub use controller::{FeedStatus, Monitor, RefreshOutcome};
pub use error::CoreError;
pub use export::{EXPORT_FILE_NAME, write_csv};
pub use model::{DataType, LevelStatus, SensorReading, StorageHealth};
pub use store::ReadingStore;
pub use stream::ReadingStream;
pub use view::{LevelSummary, Page, RangePreset, TickFormat, TimeRange};
