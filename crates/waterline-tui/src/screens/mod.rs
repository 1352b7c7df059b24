//! Screen implementations. Each screen is a top-level Component.

pub mod dashboard;
pub mod history;

use crate::component::Component;
use crate::screen::ScreenId;

pub fn create_screens(max_level_cm: f64) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new(max_level_cm)),
        ),
        (ScreenId::History, Box::new(history::HistoryScreen::new())),
    ]
}
