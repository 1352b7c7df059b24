//! Every state change in the TUI flows through an [`Action`].

use std::sync::Arc;

use waterline_core::{FeedStatus, SensorReading};

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A short-lived toast above the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Lifecycle ─────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Feed ──────────────────────────────────────────────────────
    /// A new authoritative dataset, oldest first.
    ReadingsUpdated(Arc<Vec<SensorReading>>),
    FeedStatusChanged(FeedStatus),
    /// Fetch now. Dropped if a fetch is already in flight.
    RefreshNow,
    /// Write the whole dataset to the CSV export file.
    ExportCsv,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}

impl Action {
    /// Data actions reach every screen, not just the visible one.
    pub fn is_broadcast(&self) -> bool {
        matches!(
            self,
            Self::ReadingsUpdated(_) | Self::FeedStatusChanged(_) | Self::Tick
        )
    }
}
