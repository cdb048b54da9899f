//! Settings screen: device thresholds read-out and the editable form.
//!
//! `e`/Enter edits the selected field, `s` submits the whole form, `d` asks
//! to restore factory values into the form (nothing is sent until `s`).

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use strum::IntoEnumIterator;
use tui_input::Input;

use evse_core::format::format_reading;
use evse_core::view::text;
use evse_core::{ConfigUpdate, ConfigView, DeviceConfig, FormField};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;

use super::{input_request, panel_block, step};

const LABEL_WIDTH: u16 = 20;

pub struct SettingsScreen {
    focused: bool,
    /// `None` until the first load answers.
    view: Option<ConfigView>,
    fields: Vec<(FormField, Input)>,
    selected: usize,
    editing: bool,
    /// Local validation error for the form.
    form_error: Option<String>,
}

impl SettingsScreen {
    pub fn new() -> Self {
        let mut screen = Self {
            focused: false,
            view: None,
            fields: Vec::new(),
            selected: 0,
            editing: false,
            form_error: None,
        };
        screen.fill(&ConfigUpdate::FACTORY);
        screen
    }

    fn fill(&mut self, form: &ConfigUpdate) {
        self.fields = FormField::iter()
            .map(|field| (field, Input::new(form.get(field).to_string())))
            .collect();
        self.editing = false;
        self.form_error = None;
    }

    /// Parse every field into an update, or name the first bad one.
    fn parse_form(&self) -> Result<ConfigUpdate, String> {
        let mut update = ConfigUpdate::FACTORY;
        for (field, input) in &self.fields {
            let value = input
                .value()
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("{field} must be a whole number"))?;
            update.set(*field, value);
        }
        Ok(update)
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.editing = false,
            KeyCode::Tab | KeyCode::Down => {
                self.selected = step(self.selected, 1, self.fields.len());
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.selected = step(self.selected, -1, self.fields.len());
            }
            _ => {
                if let Some(req) = input_request(key, |c| c.is_ascii_digit()) {
                    if let Some((_, input)) = self.fields.get_mut(self.selected) {
                        let _ = input.handle(req);
                    }
                }
            }
        }
        None
    }

    fn render_device(&self, frame: &mut Frame, area: Rect) {
        let block = panel_block("Device", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = match &self.view {
            None => vec![Line::from(Span::styled(
                format!("  {}", text::LOADING),
                theme::key_hint(),
            ))],
            Some(ConfigView { device: None, error, .. }) => vec![Line::from(Span::styled(
                format!("  {}", error.as_deref().unwrap_or(text::LOAD_FAILED)),
                Style::default().fg(theme::ERROR_RED),
            ))],
            Some(ConfigView {
                device: Some(device),
                ..
            }) => device_lines(device),
        };
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let block = panel_block("Form", self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows: Vec<Rect> = Layout::vertical(
            self.fields
                .iter()
                .map(|_| Constraint::Length(1))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner)
        .to_vec();

        for (i, ((field, input), row)) in self.fields.iter().zip(rows.iter()).enumerate() {
            let selected = i == self.selected;
            let label_style = if selected {
                theme::table_selected()
            } else {
                theme::key_hint()
            };
            let value_style = if selected && self.editing {
                Style::default().fg(theme::NEON_CYAN)
            } else {
                theme::table_row()
            };
            let line = Line::from(vec![
                Span::styled(format!("  {:<18}", field.to_string()), label_style),
                Span::styled(format!("{:<8}", input.value()), value_style),
                Span::styled(field.unit(), theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(line), *row);

            if selected && self.editing {
                let offset = u16::try_from(input.visual_cursor()).unwrap_or(0);
                frame.set_cursor_position(Position::new(row.x + LABEL_WIDTH + offset, row.y));
            }
        }
    }
}

fn device_lines(device: &DeviceConfig) -> Vec<Line<'static>> {
    let row = |name: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {name:<22}"), theme::key_hint()),
            Span::styled(value, theme::table_row()),
        ])
    };
    vec![
        row("Over-voltage threshold", format_reading(Some(device.ov_threshold), "V")),
        row("Under-voltage threshold", format_reading(Some(device.uv_threshold), "V")),
        row("AC leakage", format_reading(Some(device.leakage_ac), "mA")),
        row("DC leakage", format_reading(Some(device.leakage_dc), "mA")),
        row("Max current", format_reading(Some(device.max_current), "A")),
    ]
}

impl Component for SettingsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing {
            return Ok(self.handle_edit_key(key));
        }

        let len = self.fields.len();
        let action = match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                self.selected = step(self.selected, 1, len);
                None
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.selected = step(self.selected, -1, len);
                None
            }
            (KeyModifiers::NONE, KeyCode::Char('e') | KeyCode::Enter) => {
                self.editing = true;
                self.form_error = None;
                None
            }
            (KeyModifiers::NONE, KeyCode::Char('s')) => match self.parse_form() {
                Ok(update) => Some(Action::SaveSettings(update)),
                Err(msg) => {
                    self.form_error = Some(msg);
                    None
                }
            },
            (KeyModifiers::NONE, KeyCode::Char('d')) => {
                Some(Action::ShowConfirm(ConfirmAction::ResetSettings))
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => Some(Action::ReloadConfig),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ConfigLoaded(view) => {
                self.fill(&view.form);
                self.view = Some(view.clone());
            }
            Action::FillSettingsForm(form) => self.fill(form),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel_block("Settings", self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Min(7),
            Constraint::Length(1), // error
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let columns =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(layout[0]);
        self.render_device(frame, columns[0]);
        self.render_form(frame, columns[1]);

        if let Some(ref err) = self.form_error {
            frame.render_widget(
                Paragraph::new(Span::styled(err.as_str(), Style::default().fg(theme::ERROR_RED)))
                    .alignment(Alignment::Center),
                layout[1],
            );
        }

        let hints = if self.editing {
            "0-9 type  Tab next  Enter/Esc done"
        } else {
            "j/k select  e edit  s save  d defaults  r reload"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hints, theme::key_hint())).alignment(Alignment::Center),
            layout[2],
        );
    }

    fn captures_input(&self) -> bool {
        self.editing
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::{KeyEventKind, KeyEventState};
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press(screen: &mut SettingsScreen, code: KeyCode) -> Option<Action> {
        screen.handle_key_event(key(code)).unwrap()
    }

    #[test]
    fn loaded_config_seeds_the_form() {
        let mut screen = SettingsScreen::new();
        let view = ConfigView::loaded(DeviceConfig::DEFAULT);
        screen.update(&Action::ConfigLoaded(view.clone())).unwrap();

        assert_eq!(screen.parse_form().unwrap(), view.form);
        assert_eq!(screen.view, Some(view));
    }

    #[test]
    fn edit_then_save_submits_the_form() {
        let mut screen = SettingsScreen::new();

        // Second field is max current
        press(&mut screen, KeyCode::Char('j'));
        press(&mut screen, KeyCode::Char('e'));
        assert!(screen.captures_input());

        press(&mut screen, KeyCode::End);
        press(&mut screen, KeyCode::Backspace);
        press(&mut screen, KeyCode::Backspace);
        press(&mut screen, KeyCode::Char('1'));
        press(&mut screen, KeyCode::Char('x')); // ignored
        press(&mut screen, KeyCode::Char('6'));
        press(&mut screen, KeyCode::Enter);
        assert!(!screen.captures_input());

        match press(&mut screen, KeyCode::Char('s')) {
            Some(Action::SaveSettings(update)) => {
                assert_eq!(update.get(FormField::MaxCurrent), 16);
                assert_eq!(
                    update.get(FormField::VoltageDeviation),
                    ConfigUpdate::FACTORY.get(FormField::VoltageDeviation)
                );
            }
            other => panic!("expected SaveSettings, got {other:?}"),
        }
    }

    #[test]
    fn empty_field_blocks_save() {
        let mut screen = SettingsScreen::new();
        press(&mut screen, KeyCode::Char('e'));
        press(&mut screen, KeyCode::End);
        for _ in 0..4 {
            press(&mut screen, KeyCode::Backspace);
        }
        press(&mut screen, KeyCode::Esc);

        assert!(press(&mut screen, KeyCode::Char('s')).is_none());
        assert_eq!(
            screen.form_error.as_deref(),
            Some("Voltage deviation must be a whole number")
        );
    }

    #[test]
    fn defaults_key_asks_first() {
        let mut screen = SettingsScreen::new();
        assert!(matches!(
            press(&mut screen, KeyCode::Char('d')),
            Some(Action::ShowConfirm(ConfirmAction::ResetSettings))
        ));
    }

    #[test]
    fn fill_replaces_form_values() {
        let mut screen = SettingsScreen::new();
        let seeded = ConfigUpdate::seeded_from(&DeviceConfig::DEFAULT);
        screen.fill(&seeded);
        screen
            .update(&Action::FillSettingsForm(ConfigUpdate::FACTORY))
            .unwrap();
        assert_eq!(screen.parse_form().unwrap(), ConfigUpdate::FACTORY);
    }
}
