// ── Analytics views ──
//
// Pure derivations over a dataset snapshot. Nothing here mutates the
// store or reorders its input.

mod axis;
mod downsample;
mod page;
mod range;
mod summary;

pub use axis::{
    AXIS_PADDING_CM, EMPTY_AXIS_MAX_CM, HIGH_REFERENCE_CM, LOW_REFERENCE_CM, TickFormat,
    level_bounds,
};
pub use downsample::{CHART_POINT_CAP, downsample};
pub use page::{PAGE_SIZE, Page, newest_first, paginate, total_pages};
pub use range::{RangePreset, TimeRange, filter_range, filter_window};
pub use summary::{LevelSummary, summarize};
