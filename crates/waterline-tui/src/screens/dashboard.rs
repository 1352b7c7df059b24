//! Dashboard: level gauge, connectivity, system health, session trends.

use std::sync::Arc;

use color_eyre::eyre::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Sparkline, Wrap},
};
use throbber_widgets_tui::{Throbber, ThrobberState};

use waterline_core::view::{LevelSummary, summarize};
use waterline_core::{FeedStatus, SensorReading};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{bars, panel, signal_bars};

/// Readings kept for the trend sparkline.
const SPARKLINE_POINTS: usize = 240;

pub struct DashboardScreen {
    focused: bool,
    max_level_cm: f64,
    readings: Arc<Vec<SensorReading>>,
    status: FeedStatus,
    summary: LevelSummary,
    /// Most recent levels in tenths of a centimetre, oldest first.
    trend: Vec<u64>,
    throbber: ThrobberState,
}

impl DashboardScreen {
    pub fn new(max_level_cm: f64) -> Self {
        Self {
            focused: false,
            max_level_cm,
            readings: Arc::default(),
            status: FeedStatus::Idle,
            summary: LevelSummary::default(),
            trend: Vec::new(),
            throbber: ThrobberState::default(),
        }
    }

    fn render_gauge(&self, frame: &mut Frame, area: Rect, latest: &SensorReading) {
        let block = panel("Water Level", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(2), // reading + status
            Constraint::Min(3),    // tank
            Constraint::Length(1), // percent
            Constraint::Length(1), // capacity caption
        ])
        .split(inner);

        let color = theme::status_color(latest.level_status());
        let header = vec![
            Line::from(Span::styled(
                format!("{} cm", latest.water_level),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("● {}", latest.status),
                Style::default().fg(color),
            )),
        ];
        frame.render_widget(Paragraph::new(header).centered(), layout[0]);

        let pct = latest.gauge_percent(self.max_level_cm);
        let tank_width = layout[1].width.saturating_sub(4).clamp(4, 18);
        frame.render_widget(
            Paragraph::new(tank_lines(pct, layout[1].height, tank_width)).centered(),
            layout[1],
        );

        frame.render_widget(
            Paragraph::new(Span::styled(format!("{pct:.0}% full"), theme::value())).centered(),
            layout[2],
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("Capacity estimate based on {} cm depth", self.max_level_cm),
                theme::key_hint(),
            ))
            .centered(),
            layout[3],
        );
    }

    fn render_waiting(&self, frame: &mut Frame, area: Rect) {
        let block = panel("Live Status", self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        match &self.status {
            FeedStatus::Idle | FeedStatus::Loading => {
                let throbber = Throbber::default()
                    .label("  Fetching sensor data…")
                    .style(Style::default().fg(theme::NEON_CYAN))
                    .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
                let width = inner.width.min(28);
                let x = inner.x + inner.width.saturating_sub(width) / 2;
                frame.render_stateful_widget(
                    throbber,
                    Rect::new(x, layout[1].y, width, 1),
                    &mut self.throbber.clone(),
                );
            }
            other => {
                let message = other
                    .error()
                    .map_or_else(|| "The feed has no readings yet".to_owned(), str::to_owned);
                frame.render_widget(
                    Paragraph::new(Span::styled(message, theme::key_hint()))
                        .centered()
                        .wrap(Wrap { trim: true }),
                    layout[1].union(layout[2]),
                );
            }
        }
    }

    fn render_trends(&self, frame: &mut Frame, area: Rect) {
        let block = panel("Water Level Trends (Session)", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cols = Layout::horizontal([
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(0),
        ])
        .split(inner);

        let stats = [
            ("AVERAGE", self.summary.average, theme::LIGHT_BLUE),
            ("MAX", self.summary.max, theme::DIM_WHITE),
            ("MIN", self.summary.min, theme::DIM_WHITE),
        ];
        for ((label, value, color), col) in stats.into_iter().zip(cols.iter()) {
            let text = vec![
                Line::from(Span::styled(label, theme::caption())),
                Line::from(Span::styled(
                    format!("{value:.1}"),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled("cm", theme::key_hint())),
            ];
            frame.render_widget(Paragraph::new(text).centered(), *col);
        }

        let Some(spark_area) = cols.get(3).copied() else {
            return;
        };
        let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(spark_area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {} readings this session", self.summary.count),
                theme::key_hint(),
            )),
            rows[0],
        );
        let skip = self.trend.len().saturating_sub(usize::from(rows[1].width));
        frame.render_widget(
            Sparkline::default()
                .data(self.trend.iter().skip(skip).copied())
                .style(Style::default().fg(theme::WATER)),
            rows[1],
        );
    }
}

impl Component for DashboardScreen {
    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ReadingsUpdated(readings) => {
                self.summary = summarize(readings);
                self.trend = trend_points(readings, SPARKLINE_POINTS);
                self.readings = Arc::clone(readings);
            }
            Action::FeedStatusChanged(status) => {
                self.status = status.clone();
            }
            Action::Tick if self.readings.is_empty() => {
                self.throbber.calc_next();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(latest) = self.readings.last() else {
            self.render_waiting(frame, area);
            return;
        };

        let columns =
            Layout::horizontal([Constraint::Percentage(32), Constraint::Min(30)]).split(area);
        self.render_gauge(frame, columns[0], latest);

        let right = Layout::vertical([Constraint::Min(12), Constraint::Length(5)]).split(columns[1]);
        let cards =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(right[0]);

        render_connectivity(frame, cards[0], latest);
        render_system_health(frame, cards[1], latest);
        self.render_trends(frame, right[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

fn render_connectivity(frame: &mut Frame, area: Rect, r: &SensorReading) {
    let block = panel("Connectivity", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let bar_width = inner.width.saturating_sub(2);
    let wifi = r.is_wifi();
    let (wifi_color, gsm_color) = if wifi {
        (theme::LIGHT_BLUE, theme::BORDER_GRAY)
    } else {
        (theme::BORDER_GRAY, theme::ELECTRIC_PURPLE)
    };
    let source_color = if wifi { theme::LIGHT_BLUE } else { theme::ELECTRIC_PURPLE };
    let sms = if r.sms_status.trim().is_empty() {
        "No messages"
    } else {
        r.sms_status.as_str()
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(" Active source  ", theme::table_row()),
            Span::styled(
                format!("[{}]", r.network),
                Style::default().fg(source_color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" WiFi  ", Style::default().fg(wifi_color)),
            signal_bars::wifi_span(r.wifi_strength),
            Span::styled(format!("  {} dBm", r.wifi_strength), theme::key_hint()),
        ]),
        bars::bar_line(r.wifi_quality_percent(), bar_width, wifi_color),
        Line::from(vec![
            Span::styled(" GSM   ", Style::default().fg(gsm_color)),
            signal_bars::gsm_span(r.gsm_strength),
            Span::styled(
                format!("  {} CSQ  ({})", r.gsm_strength, r.sim_operator),
                theme::key_hint(),
            ),
        ]),
        bars::bar_line(r.gsm_quality_percent(), bar_width, gsm_color),
        Line::from(""),
        Line::from(Span::styled(" LAST SMS", theme::caption())),
        Line::from(Span::styled(format!(" {sms}"), theme::table_row())),
    ];

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_system_health(frame: &mut Frame, area: Rect, r: &SensorReading) {
    let block = panel("System Health", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let health = r.storage_health();
    let color = theme::storage_color(health);
    let free_pct = r.sd_free_percent();

    let mut lines = vec![
        Line::from(Span::styled(" SD CARD", theme::caption())),
        Line::from(vec![
            Span::styled(format!(" {}", bars::fmt_megabytes(r.sd_remaining)), theme::value()),
            Span::styled(
                format!(" free of {}", bars::fmt_megabytes(r.sd_total_mb())),
                theme::key_hint(),
            ),
        ]),
        bars::bar_line(free_pct, inner.width.saturating_sub(2), color),
        Line::from(Span::styled(
            format!(" {free_pct:.0}% free · {health}"),
            Style::default().fg(color),
        )),
        Line::from(""),
        Line::from(Span::styled(" LAST SEEN", theme::caption())),
        Line::from(Span::styled(format!(" {}", r.timestamp), theme::table_row())),
        Line::from(""),
        Line::from(Span::styled(" DEVICE", theme::caption())),
        Line::from(vec![
            Span::styled(format!(" {}", r.device), theme::table_row()),
            Span::styled(format!("  {}", r.data_type), theme::key_hint()),
        ]),
    ];
    if !r.sim.is_empty() {
        lines.push(Line::from(Span::styled(format!(" SIM {}", r.sim), theme::key_hint())));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Filled rows of a `rows`-tall tank at `pct` full.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn tank_fill_rows(pct: f64, rows: u16) -> u16 {
    let pct = if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 };
    ((pct / 100.0) * f64::from(rows)).round() as u16
}

/// A walled tank, filled from the bottom, plus its base.
fn tank_lines(pct: f64, height: u16, width: u16) -> Vec<Line<'static>> {
    let rows = height.saturating_sub(1);
    let filled = tank_fill_rows(pct, rows);
    let wall = Style::default().fg(theme::BORDER_GRAY);
    let inner = usize::from(width);

    let mut lines: Vec<Line> = (0..rows)
        .map(|row| {
            let water = rows - row <= filled;
            let body = if water {
                Span::styled("█".repeat(inner), Style::default().fg(theme::WATER))
            } else {
                Span::raw(" ".repeat(inner))
            };
            Line::from(vec![Span::styled("│", wall), body, Span::styled("│", wall)])
        })
        .collect();
    lines.push(Line::from(Span::styled(format!("╰{}╯", "─".repeat(inner)), wall)));
    lines
}

/// Last `cap` levels in tenths of a centimetre.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn trend_points(readings: &[SensorReading], cap: usize) -> Vec<u64> {
    let skip = readings.len().saturating_sub(cap);
    readings
        .iter()
        .skip(skip)
        .map(|r| (r.water_level * 10.0).round().max(0.0) as u64)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{buffer_text, reading};
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn tank_fills_from_the_bottom() {
        assert_eq!(tank_fill_rows(0.0, 10), 0);
        assert_eq!(tank_fill_rows(50.0, 10), 5);
        assert_eq!(tank_fill_rows(140.0, 10), 10);

        let lines = tank_lines(50.0, 5, 3);
        assert_eq!(lines.len(), 5);
        let text = |l: &Line| l.spans.iter().map(|s| s.content.to_string()).collect::<String>();
        assert_eq!(text(&lines[0]), "│   │");
        assert_eq!(text(&lines[3]), "│███│");
        assert_eq!(text(&lines[4]), "╰───╯");
    }

    #[test]
    fn trend_keeps_the_newest_points() {
        let data: Vec<_> = [0.0, 1.0, 2.0, 3.0, 4.0]
            .into_iter()
            .zip(0..)
            .map(|(level, epoch)| reading(epoch, level))
            .collect();
        assert_eq!(trend_points(&data, 3), vec![20, 30, 40]);
    }

    #[test]
    fn tracks_summary_of_the_whole_session() {
        let mut screen = DashboardScreen::new(30.0);
        let data = Arc::new(vec![reading(1, 10.0), reading(2, 20.0)]);
        screen.update(&Action::ReadingsUpdated(data)).unwrap();
        assert_eq!(screen.summary.count, 2);
        assert_eq!(screen.summary.max.to_string(), "20");
        assert_eq!(screen.summary.average.to_string(), "15");
    }

    #[test]
    fn renders_cards_for_the_latest_reading() {
        let mut screen = DashboardScreen::new(30.0);
        let mut latest = reading(2, 18.0);
        latest.sms_status = "Alert sent".into();
        screen
            .update(&Action::ReadingsUpdated(Arc::new(vec![reading(1, 12.0), latest])))
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let text = buffer_text(terminal.backend().buffer());

        assert!(text.contains("18 cm"));
        assert!(text.contains("60% full"));
        assert!(text.contains("Connectivity"));
        assert!(text.contains("Alert sent"));
        assert!(text.contains("System Health"));
    }

    #[test]
    fn shows_the_error_when_nothing_loaded() {
        let mut screen = DashboardScreen::new(30.0);
        screen
            .update(&Action::FeedStatusChanged(FeedStatus::Failed {
                error: "HTTP 500".into(),
            }))
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("HTTP 500"));
    }
}
