//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use waterline_core::{FeedStatus, Monitor, RefreshOutcome};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::widgets::hint_line;
use crate::{export, theme};

/// Toasts disappear after this long.
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

const GLOBAL_HINTS: &[(&str, &str)] = &[("r", "refresh"), ("?", "help"), ("q", "quit")];

pub struct App {
    monitor: Monitor,
    active_screen: ScreenId,
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    feed_status: FeedStatus,
    /// Size of the latest dataset pushed by the bridge.
    reading_count: usize,
    help_visible: bool,
    notification: Option<(Notification, Instant)>,
    export_path: PathBuf,
    /// Stops the data bridge (and with it the monitor).
    data_cancel: CancellationToken,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(monitor: Monitor) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(monitor.config().max_level_cm)
            .into_iter()
            .collect();

        Self {
            monitor,
            active_screen: ScreenId::Dashboard,
            previous_screen: None,
            screens,
            running: true,
            feed_status: FeedStatus::Idle,
            reading_count: 0,
            help_visible: false,
            notification: None,
            export_path: export::default_path(),
            data_cancel: CancellationToken::new(),
            action_tx,
            action_rx,
        }
    }

    /// Fetching failed and there is nothing to show: the whole content
    /// area becomes a retry prompt.
    fn connection_lost(&self) -> bool {
        self.reading_count == 0 && matches!(self.feed_status, FeedStatus::Failed { .. })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = crate::tui::Tui::new()?;
        tui.enter()?;
        debug!(size = ?tui.size().ok(), "terminal ready");

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }

        let monitor = self.monitor.clone();
        let cancel = self.data_cancel.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(monitor, tx, cancel).await;
        });

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Tick => self.action_tx.send(Action::Tick)?,
                // ratatui resizes its buffers on the next draw.
                Event::Render | Event::Resize(..) => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if action == Action::Render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // An open form takes everything except Ctrl-C.
        if let Some(screen) = self
            .screens
            .get_mut(&self.active_screen)
            .filter(|s| s.captures_input())
        {
            if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
                return Ok(Some(Action::Quit));
            }
            return screen.handle_key_event(key);
        }

        let quit = matches!(
            (key.modifiers, key.code),
            (KeyModifiers::CONTROL, KeyCode::Char('c')) | (KeyModifiers::NONE, KeyCode::Char('q'))
        );
        if quit {
            return Ok(Some(Action::Quit));
        }

        if self.connection_lost() {
            return Ok(match key.code {
                KeyCode::Char('r') | KeyCode::Enter => Some(Action::RefreshNow),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::RefreshNow)),

            (KeyModifiers::NONE, KeyCode::Char(c)) if c.is_ascii_digit() => {
                let screen = c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(ScreenId::from_number);
                if let Some(screen) = screen {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }

            (KeyModifiers::NONE, KeyCode::Esc) => {
                return Ok(Some(if self.notification.is_some() {
                    Action::DismissNotification
                } else {
                    Action::GoBack
                }));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.connection_lost() || self.help_visible {
            return Ok(None);
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_mouse_event(mouse);
        }
        Ok(None)
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Render => {}

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.previous_screen = Some(self.active_screen);
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::RefreshNow => self.refresh_now(),

            Action::ExportCsv => self.export_csv(),

            Action::Notify(n) => self.notification = Some((n.clone(), Instant::now())),

            Action::DismissNotification => self.notification = None,

            Action::ReadingsUpdated(readings) => {
                self.reading_count = readings.len();
                self.broadcast(action)?;
            }

            Action::FeedStatusChanged(status) => {
                let newly_degraded = matches!(status, FeedStatus::Degraded { .. })
                    && !matches!(self.feed_status, FeedStatus::Degraded { .. });
                if newly_degraded {
                    self.action_tx.send(Action::Notify(Notification::error(
                        "Refresh failed; showing previous readings",
                    )))?;
                }
                self.feed_status = status.clone();
                self.broadcast(action)?;
            }

            Action::Tick => {
                let expired = self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL);
                if expired {
                    self.notification = None;
                }
                self.broadcast(action)?;
            }
        }
        Ok(())
    }

    /// Deliver `action` to every screen.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        debug_assert!(action.is_broadcast());
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Manual refresh on a background task. Shares the monitor's in-flight
    /// guard with the periodic refresh.
    fn refresh_now(&self) {
        if self.monitor.is_refreshing() {
            let _ = self
                .action_tx
                .send(Action::Notify(Notification::info("Refresh already in progress")));
            return;
        }

        let monitor = self.monitor.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notification = match monitor.refresh().await {
                Ok(RefreshOutcome::Refreshed { count }) => {
                    Notification::success(format!("Loaded {count} readings"))
                }
                Ok(RefreshOutcome::Skipped) => Notification::info("Refresh already in progress"),
                Ok(RefreshOutcome::Cancelled) => return,
                Err(e) => {
                    warn!(error = %e, "manual refresh failed");
                    Notification::error(e.to_string())
                }
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    fn export_csv(&self) {
        let readings = self.monitor.readings();
        let notification = if readings.is_empty() {
            Notification::error("No readings to export")
        } else {
            match export::write_file(&readings, &self.export_path) {
                Ok(rows) => {
                    info!(rows, path = %self.export_path.display(), "exported CSV");
                    Notification::success(format!(
                        "Exported {rows} readings to {}",
                        self.export_path.display()
                    ))
                }
                Err(e) => {
                    warn!(error = %e, "CSV export failed");
                    Notification::error(format!("Export failed: {e}"))
                }
            }
        };
        let _ = self.action_tx.send(Action::Notify(notification));
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        if self.connection_lost() {
            self.render_connection_error(frame, layout[0]);
        } else if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }

        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        if self.help_visible {
            render_help_overlay(frame, area);
        }
        if let Some((ref notification, _)) = self.notification {
            render_notification(frame, area, notification);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(self.active_screen.index());

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" "), feed_indicator(&self.feed_status)];

        if self.reading_count > 0 {
            spans.push(Span::styled(
                format!(" · {} readings", self.reading_count),
                theme::key_hint(),
            ));
        }
        if let Some(age) = age_label(self.monitor.last_refresh(), Utc::now()) {
            spans.push(Span::styled(format!(" · updated {age}"), theme::key_hint()));
        }
        spans.push(Span::styled(" │", theme::key_hint()));

        if let Some(screen) = self.screens.get(&self.active_screen) {
            spans.extend(hint_line(screen.key_hints()).spans);
        }
        spans.extend(hint_line(GLOBAL_HINTS).spans);

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_connection_error(&self, frame: &mut Frame, area: Rect) {
        let error = self.feed_status.error().unwrap_or("unknown error");

        let width = 64u16.min(area.width.saturating_sub(4));
        let height = 11u16.min(area.height.saturating_sub(2));
        let popup = centered(area, width, height);

        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(" Connection Error ")
            .title_style(Style::default().fg(theme::ERROR_RED).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ERROR_RED))
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Failed to load data from the sensor feed.",
                theme::value(),
            )),
            Line::from(Span::styled(
                self.monitor.config().endpoint.to_string(),
                theme::key_hint(),
            )),
            Line::from(""),
            Line::from(Span::styled(error.to_owned(), Style::default().fg(theme::CORAL))),
            Line::from(""),
            Line::from(vec![
                Span::styled("r ", theme::key_hint_key()),
                Span::styled("try again   ", theme::key_hint()),
                Span::styled("q ", theme::key_hint_key()),
                Span::styled("quit", theme::key_hint()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(text).centered().wrap(Wrap { trim: true }),
            inner,
        );
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn feed_indicator(status: &FeedStatus) -> Span<'static> {
    let (text, color) = match status {
        FeedStatus::Idle => ("○ waiting", theme::BORDER_GRAY),
        FeedStatus::Loading => ("◐ refreshing", theme::ELECTRIC_YELLOW),
        FeedStatus::Ready => ("● live", theme::SUCCESS_GREEN),
        FeedStatus::Degraded { .. } => ("◐ stale", theme::CORAL),
        FeedStatus::Failed { .. } => ("○ offline", theme::ERROR_RED),
    };
    Span::styled(text, Style::default().fg(color))
}

/// `"2m 5s ago"` for the time since `last`, to the second.
fn age_label(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<String> {
    let secs = u64::try_from((now - last?).num_seconds()).unwrap_or(0);
    if secs == 0 {
        return Some("just now".into());
    }
    Some(format!(
        "{} ago",
        humantime::format_duration(Duration::from_secs(secs))
    ))
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(
        area,
        56u16.min(area.width.saturating_sub(4)),
        22u16.min(area.height.saturating_sub(4)),
    );

    frame.render_widget(Clear, help_area);
    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(format!("  {title}"), Style::default().fg(theme::NEON_CYAN)))
    };
    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };

    let text = vec![
        Line::from(""),
        section("Navigation"),
        entry("1-2", "Jump to screen"),
        entry("Tab", "Next screen"),
        entry("Esc", "Back / dismiss"),
        Line::from(""),
        section("Feed"),
        entry("r", "Refresh now"),
        entry("e", "Export CSV (History)"),
        Line::from(""),
        section("History"),
        entry("d w m a", "24 hours / week / month / all"),
        entry("c", "Custom date range"),
        entry("[ ]", "Previous / next range"),
        entry("←/→ n/p", "Previous / next page"),
        entry("g/G", "First / last page"),
        Line::from(""),
        entry("?", "This help"),
        entry("q", "Quit"),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let len = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = len.saturating_add(6).clamp(20, 72).min(area.width);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast = Rect::new(area.x + x, area.y + y, width, height);

    let (color, icon) = match notification.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast);
    frame.render_widget(block, toast);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notification.message.clone(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
