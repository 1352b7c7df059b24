//! History: range-selectable level chart over a paginated, newest-first log.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
};

use waterline_core::view::{
    CHART_POINT_CAP, HIGH_REFERENCE_CM, LOW_REFERENCE_CM, PAGE_SIZE, downsample, filter_range,
    level_bounds, paginate, total_pages,
};
use waterline_core::{RangePreset, SensorReading, TimeRange};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::date_range_form::{DateRangeForm, FormOutcome};
use crate::widgets::{panel, sub_tabs};

/// Preset picker keys, in display order. `c` follows for a custom range.
const RANGES: [(char, RangePreset); 4] = [
    ('d', RangePreset::Last24Hours),
    ('w', RangePreset::Last7Days),
    ('m', RangePreset::Last30Days),
    ('a', RangePreset::All),
];

const CUSTOM_KEY: char = 'c';

/// Chart data for one range, computed when the data or range changes.
#[derive(Debug, Clone, PartialEq)]
struct ChartSeries {
    /// `(epoch ms, level cm)`, downsampled.
    points: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_labels: Vec<String>,
    /// Readings inside the range before downsampling.
    in_range: usize,
}

impl Default for ChartSeries {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            x_bounds: [0.0, 1.0],
            y_bounds: level_bounds(&[]),
            x_labels: Vec::new(),
            in_range: 0,
        }
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn chart_series<Tz>(
    readings: &[SensorReading],
    range: &TimeRange,
    now: DateTime<Utc>,
    tz: &Tz,
) -> ChartSeries
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let visible = filter_range(readings, range, now);
    let sampled = downsample(visible, CHART_POINT_CAP);

    let (Some(first), Some(last)) = (sampled.first(), sampled.last()) else {
        return ChartSeries::default();
    };

    let ticks = range.tick_format();
    let mid = &sampled[sampled.len() / 2];
    let x_min = first.timestamp_epoch as f64;
    // A single point still needs a non-empty axis.
    let x_max = (last.timestamp_epoch as f64).max(x_min + 1.0);

    ChartSeries {
        points: sampled
            .iter()
            .map(|r| (r.timestamp_epoch as f64, r.water_level))
            .collect(),
        x_bounds: [x_min, x_max],
        y_bounds: level_bounds(&sampled),
        x_labels: [first, mid, last]
            .iter()
            .map(|r| ticks.format(r.timestamp_epoch, tz))
            .collect(),
        in_range: visible.len(),
    }
}

/// Keep `page` inside `1..=total` (page 1 when there is nothing).
fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

pub struct HistoryScreen {
    focused: bool,
    readings: Arc<Vec<SensorReading>>,
    range: TimeRange,
    /// 1-based.
    page: usize,
    chart: ChartSeries,
    /// Open while custom dates are being entered.
    form: Option<DateRangeForm>,
}

impl Default for HistoryScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            readings: Arc::default(),
            range: TimeRange::default(),
            page: 1,
            chart: ChartSeries::default(),
            form: None,
        }
    }

    fn total_pages(&self) -> usize {
        total_pages(self.readings.len(), PAGE_SIZE)
    }

    fn set_range(&mut self, range: TimeRange) {
        self.range = range;
        self.rebuild_chart();
    }

    /// Step through the presets. From a custom range, forward starts at the
    /// first preset and backward at the last.
    fn cycle_range(&mut self, forward: bool) {
        let n = RANGES.len();
        let next = match (self.preset_index(), forward) {
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
            (None, true) => 0,
            (None, false) => n - 1,
        };
        self.set_range(RANGES[next].1.into());
    }

    fn open_custom_form(&mut self) {
        let form = match self.range {
            TimeRange::Custom { start, end } => DateRangeForm::new(start, end),
            TimeRange::Preset(_) => DateRangeForm::default(),
        };
        self.form = Some(form);
    }

    fn rebuild_chart(&mut self) {
        self.chart = chart_series(&self.readings, &self.range, Utc::now(), &Local);
    }

    fn go_to_page(&mut self, page: usize) {
        self.page = clamp_page(page, self.total_pages());
    }

    fn preset_index(&self) -> Option<usize> {
        match self.range {
            TimeRange::Preset(preset) => RANGES.iter().position(|(_, r)| *r == preset),
            TimeRange::Custom { .. } => None,
        }
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect) {
        let block = panel(&format!("Water Level · {}", self.range.label()), false);

        if self.chart.points.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  No readings in this range")
                    .style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
            return;
        }

        let [x_min, x_max] = self.chart.x_bounds;
        let [y_min, y_max] = self.chart.y_bounds;
        let low = [(x_min, LOW_REFERENCE_CM), (x_max, LOW_REFERENCE_CM)];
        let high = [(x_min, HIGH_REFERENCE_CM), (x_max, HIGH_REFERENCE_CM)];

        // Reference lines first so the level line draws over them.
        let datasets = vec![
            Dataset::default()
                .name(format!("Low {LOW_REFERENCE_CM}cm"))
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::ELECTRIC_YELLOW))
                .data(&low),
            Dataset::default()
                .name(format!("High {HIGH_REFERENCE_CM}cm"))
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::ERROR_RED))
                .data(&high),
            Dataset::default()
                .name("Level")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::WATER))
                .data(&self.chart.points),
        ];

        let y_labels = [y_min, (y_min + y_max) / 2.0, y_max]
            .iter()
            .map(|v| format!("{v:.0}"))
            .collect::<Vec<_>>();

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([x_min, x_max])
                    .labels(self.chart.x_labels.clone())
                    .style(Style::default().fg(theme::BORDER_GRAY)),
            )
            .y_axis(
                Axis::default()
                    .title("cm")
                    .bounds([y_min, y_max])
                    .labels(y_labels)
                    .style(Style::default().fg(theme::BORDER_GRAY)),
            );

        frame.render_widget(chart, area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let page = paginate(&self.readings, self.page, PAGE_SIZE);
        let title = format!(
            "Data Logs · Page {} of {} · {} records loaded",
            page.page,
            page.total_pages.max(1),
            page.total_items
        );
        let block = panel(&title, self.focused);

        let header = Row::new(
            ["Timestamp", "Level", "Status", "Network", "Signal", "Device", "SMS"]
                .map(|h| Cell::from(Span::styled(h, theme::table_header()))),
        );

        let newest_on_page = page.page == 1;
        let rows = page.items.iter().enumerate().map(|(i, r)| {
            let style = if newest_on_page && i == 0 {
                theme::table_newest()
            } else {
                theme::table_row()
            };
            Row::new(vec![
                Cell::from(r.timestamp.clone()),
                Cell::from(format!("{:>5.1} cm", r.water_level)),
                Cell::from(Span::styled(
                    r.status.clone(),
                    Style::default().fg(theme::status_color(r.level_status())),
                )),
                Cell::from(r.network.clone()),
                Cell::from(r.signal_label()),
                Cell::from(r.device.clone()),
                Cell::from(r.sms_status.clone()),
            ])
            .style(style)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(20),
                Constraint::Length(9),
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Min(10),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(block);

        frame.render_widget(table, area);
    }
}

impl Component for HistoryScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(form) = self.form.as_mut() {
            match form.handle_key(key) {
                FormOutcome::Editing => {}
                FormOutcome::Cancelled => self.form = None,
                FormOutcome::Applied { start, end } => {
                    self.form = None;
                    self.set_range(TimeRange::Custom { start, end });
                }
            }
            return Ok(None);
        }

        if let KeyCode::Char(c) = key.code {
            if let Some(&(_, preset)) = RANGES.iter().find(|(k, _)| *k == c) {
                self.set_range(preset.into());
                return Ok(None);
            }
        }

        match key.code {
            KeyCode::Char(CUSTOM_KEY) => self.open_custom_form(),
            KeyCode::Char(']') => self.cycle_range(true),
            KeyCode::Char('[') => self.cycle_range(false),
            KeyCode::Char('n' | 'l') | KeyCode::Right | KeyCode::PageDown => {
                self.go_to_page(self.page + 1);
            }
            KeyCode::Char('p' | 'h') | KeyCode::Left | KeyCode::PageUp => {
                self.go_to_page(self.page.saturating_sub(1));
            }
            KeyCode::Char('g') | KeyCode::Home => self.go_to_page(1),
            KeyCode::Char('G') | KeyCode::End => self.go_to_page(self.total_pages()),
            KeyCode::Char('e') => return Ok(Some(Action::ExportCsv)),
            _ => {}
        }
        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.form.is_some() {
            return Ok(None);
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => self.go_to_page(self.page + 1),
            MouseEventKind::ScrollUp => self.go_to_page(self.page.saturating_sub(1)),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::ReadingsUpdated(readings) = action {
            self.readings = Arc::clone(readings);
            self.page = clamp_page(self.page, self.total_pages());
            self.rebuild_chart();
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(1),      // range picker
            Constraint::Percentage(45), // chart
            Constraint::Min(6),         // log table
        ])
        .split(area);

        let mut options: Vec<(char, &str)> = RANGES.iter().map(|(k, r)| (*k, r.label())).collect();
        options.push((CUSTOM_KEY, "Custom"));
        let active = self.preset_index().unwrap_or(RANGES.len());
        let mut picker = sub_tabs::render_sub_tabs(&options, active);
        picker.spans.push(Span::styled(
            format!("   {} readings in range", self.chart.in_range),
            theme::key_hint(),
        ));
        frame.render_widget(Paragraph::new(picker), layout[0]);

        self.render_chart(frame, layout[1]);
        self.render_table(frame, layout[2]);

        if let Some(form) = &self.form {
            form.render(frame, area);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.form.is_some()
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        if self.form.is_some() {
            return &[("Tab", "switch"), ("Enter", "apply"), ("Esc", "cancel")];
        }
        &[("d/w/m/a", "range"), ("c", "custom"), ("←/→", "page"), ("e", "export")]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{buffer_text, reading};
    use chrono::{Duration, NaiveDate};
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    const HOUR_MS: i64 = 3_600_000;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()
    }

    fn hours_ago(h: i64, level: f64) -> SensorReading {
        reading(now().timestamp_millis() - h * HOUR_MS, level)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn loaded(n: i64) -> HistoryScreen {
        let mut screen = HistoryScreen::new();
        let data = Arc::new((0..n).map(|i| reading(i, 10.0)).collect());
        screen.update(&Action::ReadingsUpdated(data)).unwrap();
        screen
    }

    #[test]
    fn chart_covers_only_the_selected_range() {
        let data = vec![hours_ago(48, 2.0), hours_ago(5, 10.0), hours_ago(1, 20.0)];

        let day = chart_series(&data, &RangePreset::Last24Hours.into(), now(), &Utc);
        assert_eq!(day.in_range, 2);
        assert_eq!(day.points.len(), 2);
        assert_eq!(day.y_bounds, [5.0, 25.0]);
        assert_eq!(day.x_labels, vec!["07:00", "11:00", "11:00"]);

        let all = chart_series(&data, &RangePreset::All.into(), now(), &Utc);
        assert_eq!(all.in_range, 3);
        assert_eq!(all.y_bounds, [0.0, 25.0]);
        assert_eq!(all.x_labels[0], "Mar 7, 24");
    }

    #[test]
    fn chart_downsamples_long_ranges() {
        let data: Vec<_> = (0..1_200).map(|i| reading(i, 10.0)).collect();
        let series = chart_series(&data, &RangePreset::All.into(), now(), &Utc);
        assert_eq!(series.in_range, 1_200);
        assert_eq!(series.points.len(), 400);
    }

    #[test]
    fn empty_range_has_default_axes() {
        let series = chart_series(
            &[hours_ago(100, 3.0)],
            &RangePreset::Last24Hours.into(),
            now(),
            &Utc,
        );
        assert_eq!(series, ChartSeries::default());
        assert_eq!(series.y_bounds, [0.0, 35.0]);
    }

    #[test]
    fn single_point_gets_a_usable_axis() {
        let series = chart_series(&[hours_ago(1, 12.0)], &RangePreset::All.into(), now(), &Utc);
        assert!(series.x_bounds[1] > series.x_bounds[0]);
    }

    #[test]
    fn page_clamping() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(4, 0), 1);
    }

    #[test]
    fn keys_move_between_pages() {
        let mut screen = loaded(120);
        assert_eq!(screen.page, 1);

        screen.handle_key_event(key('n')).unwrap();
        assert_eq!(screen.page, 2);
        screen.handle_key_event(key('G')).unwrap();
        assert_eq!(screen.page, 3);
        screen.handle_key_event(key('n')).unwrap();
        assert_eq!(screen.page, 3);
        screen.handle_key_event(key('g')).unwrap();
        screen.handle_key_event(key('p')).unwrap();
        assert_eq!(screen.page, 1);
    }

    #[test]
    fn shrinking_dataset_pulls_the_page_back() {
        let mut screen = loaded(120);
        screen.handle_key_event(key('G')).unwrap();
        assert_eq!(screen.page, 3);

        let fewer = Arc::new((0..30).map(|i| reading(i, 1.0)).collect());
        screen.update(&Action::ReadingsUpdated(fewer)).unwrap();
        assert_eq!(screen.page, 1);
    }

    #[test]
    fn range_keys_and_export() {
        let mut screen = loaded(3);
        screen.handle_key_event(key('w')).unwrap();
        assert_eq!(screen.range, TimeRange::Preset(RangePreset::Last7Days));
        screen.handle_key_event(key(']')).unwrap();
        assert_eq!(screen.range, TimeRange::Preset(RangePreset::Last30Days));
        screen.handle_key_event(key('[')).unwrap();
        screen.handle_key_event(key('[')).unwrap();
        assert_eq!(screen.range, TimeRange::Preset(RangePreset::Last24Hours));

        let action = screen.handle_key_event(key('e')).unwrap();
        assert!(matches!(action, Some(Action::ExportCsv)));
    }

    fn press(screen: &mut HistoryScreen, code: KeyCode) {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    #[test]
    fn custom_range_chart_uses_calendar_days() {
        let data = vec![hours_ago(72, 4.0), hours_ago(30, 8.0), hours_ago(1, 12.0)];
        let range = TimeRange::Custom {
            start: NaiveDate::from_ymd_opt(2024, 3, 8),
            end: NaiveDate::from_ymd_opt(2024, 3, 8),
        };
        let series = chart_series(&data, &range, now(), &Utc);
        assert_eq!(series.in_range, 1);
        assert_eq!(series.points.len(), 1);
        assert!((series.points[0].1 - 8.0).abs() < f64::EPSILON);
        assert_eq!(series.x_labels[0], "Mar 8, 24");
    }

    #[test]
    fn custom_form_sets_the_range_and_holds_keys() {
        let mut screen = loaded(120);
        press(&mut screen, KeyCode::Char('c'));
        assert!(screen.captures_input());

        // Page keys type into the form instead of paging.
        for c in "2024-03-01".chars() {
            press(&mut screen, KeyCode::Char(c));
        }
        press(&mut screen, KeyCode::Char('n'));
        assert_eq!(screen.page, 1);
        press(&mut screen, KeyCode::Enter);

        assert!(!screen.captures_input());
        assert_eq!(
            screen.range,
            TimeRange::Custom {
                start: NaiveDate::from_ymd_opt(2024, 3, 1),
                end: None,
            }
        );

        // Reopening keeps the dates; Esc leaves the range alone.
        press(&mut screen, KeyCode::Char('c'));
        press(&mut screen, KeyCode::Esc);
        assert!(!screen.captures_input());
        assert!(matches!(screen.range, TimeRange::Custom { .. }));

        press(&mut screen, KeyCode::Char(']'));
        assert_eq!(screen.range, TimeRange::Preset(RangePreset::Last24Hours));
    }

    #[test]
    fn renders_custom_picker_and_form() {
        let mut screen = loaded(3);
        press(&mut screen, KeyCode::Char('c'));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Custom Range"));
        assert!(text.contains("c: Custom"));

        press(&mut screen, KeyCode::Enter);
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("c:[Custom]"));
        assert!(text.contains("Water Level · beginning to now"));
        assert!(!text.contains("Custom Range"));
    }

    #[test]
    fn renders_newest_rows_first() {
        let mut screen = HistoryScreen::new();
        let now = Utc::now();
        let older = reading((now - Duration::hours(2)).timestamp_millis(), 11.0);
        let newer = reading((now - Duration::hours(1)).timestamp_millis(), 13.5);
        screen
            .update(&Action::ReadingsUpdated(Arc::new(vec![older, newer])))
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let text = buffer_text(terminal.backend().buffer());

        assert!(text.contains("Page 1 of 1 · 2 records loaded"));
        assert!(text.contains("2 readings in range"));
        let first = text.find("13.5 cm").unwrap();
        let second = text.find("11.0 cm").unwrap();
        assert!(first < second);
    }
}
