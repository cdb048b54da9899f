//! Screen implementations. Each screen is a top-level Component.

pub mod alarms;
pub mod cards;
pub mod dashboard;
pub mod settings;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::{Block, BorderType, Borders};
use tui_input::InputRequest;

use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;

pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Dashboard, Box::new(dashboard::DashboardScreen::new())),
        (ScreenId::Settings, Box::new(settings::SettingsScreen::new())),
        (ScreenId::Cards, Box::new(cards::CardsScreen::new())),
        (ScreenId::Alarms, Box::new(alarms::AlarmsScreen::new())),
    ]
}

/// Translate an editing key into a text-input request.
///
/// `accept` filters inserted characters.
pub(crate) fn input_request(key: KeyEvent, accept: impl Fn(char) -> bool) -> Option<InputRequest> {
    match key.code {
        KeyCode::Char(c) if accept(c) => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

/// Rounded panel block, highlighted when focused.
pub(crate) fn panel_block(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            theme::border_focused()
        } else {
            theme::border_default()
        })
}

/// Move a table selection by `delta`, clamped to `len`.
pub(crate) fn step(selected: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    selected.saturating_add_signed(delta).min(len - 1)
}
