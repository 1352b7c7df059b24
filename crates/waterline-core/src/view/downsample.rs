use std::borrow::Cow;

/// Maximum points handed to a chart.
pub const CHART_POINT_CAP: usize = 500;

/// Keep every Nth item, N = ceil(len / cap), starting at index 0.
///
/// Inputs at or below `cap` (and any input when `cap` is zero) are returned
/// borrowed and untouched. Display only; exports use the full dataset.
pub fn downsample<T: Clone>(items: &[T], cap: usize) -> Cow<'_, [T]> {
    if cap == 0 || items.len() <= cap {
        return Cow::Borrowed(items);
    }
    let step = items.len().div_ceil(cap);
    Cow::Owned(items.iter().step_by(step).cloned().collect())
}
