//! Signal strength bars (▂▄▆█) for both radio links.

use ratatui::style::Style;
use ratatui::text::Span;

use crate::theme;

const BARS: [(&str, ratatui::style::Color); 5] = [
    ("▂▄▆█", theme::SUCCESS_GREEN),
    ("▂▄▆ ", theme::NEON_CYAN),
    ("▂▄  ", theme::ELECTRIC_YELLOW),
    ("▂   ", theme::CORAL),
    ("·   ", theme::ERROR_RED),
];

fn span(tier: usize) -> Span<'static> {
    let (bars, color) = BARS[tier.min(BARS.len() - 1)];
    Span::styled(bars, Style::default().fg(color))
}

/// WiFi RSSI in dBm: -50 and up is full strength, below -80 is nothing.
pub fn wifi_span(dbm: f64) -> Span<'static> {
    let tier = [-50.0, -60.0, -70.0, -80.0]
        .iter()
        .position(|&floor| dbm >= floor)
        .unwrap_or(4);
    span(tier)
}

/// GSM CSQ on the 0-31 scale: 20 and up is excellent, below 2 is no service.
pub fn gsm_span(csq: f64) -> Span<'static> {
    let tier = [20.0, 15.0, 10.0, 2.0]
        .iter()
        .position(|&floor| csq >= floor)
        .unwrap_or(4);
    span(tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wifi_thresholds() {
        assert_eq!(wifi_span(-42.0).content, "▂▄▆█");
        assert_eq!(wifi_span(-60.0).content, "▂▄▆ ");
        assert_eq!(wifi_span(-79.9).content, "▂   ");
        assert_eq!(wifi_span(-95.0).content, "·   ");
    }

    #[test]
    fn gsm_thresholds() {
        assert_eq!(gsm_span(31.0).content, "▂▄▆█");
        assert_eq!(gsm_span(12.0).content, "▂▄  ");
        assert_eq!(gsm_span(0.0).content, "·   ");
    }
}
