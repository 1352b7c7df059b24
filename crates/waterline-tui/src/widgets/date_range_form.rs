//! Start/end date entry for a custom chart range.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use super::hint_line;
use crate::theme;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_LEN: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Field {
    #[default]
    Start,
    End,
}

/// What a key press did to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Editing,
    Cancelled,
    /// Inclusive calendar days; `None` leaves that side open.
    Applied {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DateRangeForm {
    start: String,
    end: String,
    active: Field,
    error: Option<String>,
}

impl DateRangeForm {
    /// Form prefilled with `start` / `end`.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let text = |d: Option<NaiveDate>| {
            d.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        Self {
            start: text(start),
            end: text(end),
            active: Field::Start,
            error: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancelled,
            KeyCode::Enter => return self.submit(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.active = match self.active {
                    Field::Start => Field::End,
                    Field::End => Field::Start,
                };
            }
            KeyCode::Backspace => {
                self.input_mut().pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                let input = self.input_mut();
                if input.len() < DATE_LEN {
                    input.push(c);
                }
            }
            _ => return FormOutcome::Editing,
        }
        self.error = None;
        FormOutcome::Editing
    }

    fn input_mut(&mut self) -> &mut String {
        match self.active {
            Field::Start => &mut self.start,
            Field::End => &mut self.end,
        }
    }

    fn submit(&mut self) -> FormOutcome {
        match self.parse() {
            Ok((start, end)) => FormOutcome::Applied { start, end },
            Err(msg) => {
                self.error = Some(msg);
                FormOutcome::Editing
            }
        }
    }

    fn parse(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), String> {
        let start = parse_day("Start", &self.start)?;
        let end = parse_day("End", &self.end)?;
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(format!("Start {s} is after end {e}"));
            }
        }
        Ok((start, end))
    }

    /// Centered popup over `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = 44u16.min(area.width.saturating_sub(2));
        let height = 12u16.min(area.height);
        let popup = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(" Custom Range ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ELECTRIC_PURPLE))
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let [start, end, error, hints] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        render_field(
            frame,
            start,
            "Start (blank: beginning)",
            &self.start,
            self.active == Field::Start,
        );
        render_field(
            frame,
            end,
            "End (blank: now)",
            &self.end,
            self.active == Field::End,
        );
        if let Some(msg) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {msg}"),
                    Style::default().fg(theme::ERROR_RED),
                )),
                error,
            );
        }
        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("Tab", "switch"),
                ("Enter", "apply"),
                ("Esc", "cancel"),
            ])),
            hints,
        );
    }
}

fn parse_day(field: &str, raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| format!("{field} must be YYYY-MM-DD"))
}

/// Label line over a bordered box; the active box shows a block cursor.
fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    if area.height < 4 {
        return;
    }
    let (label_color, border_color) = if active {
        (theme::NEON_CYAN, theme::ELECTRIC_PURPLE)
    } else {
        (theme::DIM_WHITE, theme::BORDER_GRAY)
    };

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {label}"),
            Style::default().fg(label_color),
        )),
        Rect::new(area.x, area.y, area.width, 1),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));
    let box_area = Rect::new(area.x, area.y + 1, area.width, 3);
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let text = if active {
        format!("{value}\u{2588}")
    } else {
        value.to_owned()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(theme::NEON_CYAN))),
        inner,
    );
}
