//! Text progress bars and size formatting.

use bytesize::ByteSize;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::theme;

/// `(filled, empty)` runs of `█`/`░` spanning `width` cells.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn pct_bar(pct: f64, width: u16) -> (String, String) {
    let pct = if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 };
    let filled = ((pct / 100.0) * f64::from(width)).round() as u16;
    let empty = width.saturating_sub(filled);
    ("█".repeat(usize::from(filled)), "░".repeat(usize::from(empty)))
}

/// Styled bar line; the empty part is dimmed.
pub fn bar_line(pct: f64, width: u16, color: Color) -> Line<'static> {
    let (filled, empty) = pct_bar(pct, width);
    Line::from(vec![
        Span::raw(" "),
        Span::styled(filled, Style::default().fg(color)),
        Span::styled(empty, Style::default().fg(theme::BG_HIGHLIGHT)),
    ])
}

/// Device-reported megabytes as a binary size, e.g. `1.0 GiB`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn fmt_megabytes(mb: f64) -> String {
    let kib = if mb.is_finite() { (mb * 1024.0).max(0.0).round() } else { 0.0 };
    ByteSize::kib(kib as u64).to_string_as(true)
}
