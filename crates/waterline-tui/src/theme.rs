//! SilkCircuit Neon palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};
use waterline_core::{LevelStatus, StorageHealth};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29
pub const LIGHT_BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

/// Water in the tank and the level line in the chart.
pub const WATER: Color = LIGHT_BLUE;

// ── Domain Colors ─────────────────────────────────────────────────────

pub fn status_color(status: LevelStatus) -> Color {
    match status {
        LevelStatus::Low => ELECTRIC_YELLOW,
        LevelStatus::Good => SUCCESS_GREEN,
        LevelStatus::Excess => CORAL,
        LevelStatus::FloodAlert => ERROR_RED,
        LevelStatus::Unknown => BORDER_GRAY,
    }
}

pub fn storage_color(health: StorageHealth) -> Color {
    match health {
        StorageHealth::Ok => SUCCESS_GREEN,
        StorageHealth::Warning => ELECTRIC_YELLOW,
        StorageHealth::Critical => ERROR_RED,
    }
}

// ── Semantic Styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// The newest reading in the log.
pub fn table_newest() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Small uppercase caption above a value.
pub fn caption() -> Style {
    Style::default().fg(BORDER_GRAY).add_modifier(Modifier::BOLD)
}

pub fn value() -> Style {
    Style::default().fg(DIM_WHITE).add_modifier(Modifier::BOLD)
}

pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}
