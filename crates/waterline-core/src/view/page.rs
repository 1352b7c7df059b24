use serde::Serialize;

use crate::model::SensorReading;

/// Rows per log-table page.
pub const PAGE_SIZE: usize = 50;

/// One page of the newest-first log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<'a> {
    pub items: Vec<&'a SensorReading>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

/// Ascending input viewed newest first.
pub fn newest_first(readings: &[SensorReading]) -> impl Iterator<Item = &SensorReading> {
    readings.iter().rev()
}

/// Page `page` (1-based) of `readings` in reverse chronological order.
///
/// Pages outside `1..=total_pages` come back with no items.
pub fn paginate(readings: &[SensorReading], page: usize, page_size: usize) -> Page<'_> {
    let items = match page.checked_sub(1) {
        Some(index) if page_size > 0 => newest_first(readings)
            .skip(index.saturating_mul(page_size))
            .take(page_size)
            .collect(),
        _ => Vec::new(),
    };

    Page {
        items,
        page,
        page_size,
        total_pages: total_pages(readings.len(), page_size),
        total_items: readings.len(),
    }
}
