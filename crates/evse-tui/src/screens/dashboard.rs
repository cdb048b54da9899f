//! Dashboard: connection indicator and live telemetry.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use evse_core::view::text;
use evse_core::{ConnectionState, StatusText, TelemetryView, Tone};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

use super::panel_block;

pub struct DashboardScreen {
    focused: bool,
    connection: ConnectionState,
    telemetry: TelemetryView,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            connection: ConnectionState::Unknown,
            telemetry: TelemetryView::pending(),
        }
    }

    fn connection_text(&self) -> StatusText {
        let tone = match self.connection {
            ConnectionState::Unknown => Tone::Neutral,
            ConnectionState::Connected => Tone::Success,
            ConnectionState::Disconnected => Tone::Danger,
        };
        StatusText::new(self.connection.label(), tone)
    }

    /// Optional variant-build readings, in display order.
    fn extras(&self) -> Vec<(&'static str, Span<'_>)> {
        let t = &self.telemetry;
        let mut rows = Vec::new();
        if let Some(ref v) = t.leakage_ac {
            rows.push(("AC leakage", Span::styled(v.as_str(), theme::table_row())));
        }
        if let Some(ref v) = t.leakage_dc {
            rows.push(("DC leakage", Span::styled(v.as_str(), theme::table_row())));
        }
        if let Some(ref v) = t.cp_voltage {
            rows.push(("CP voltage", Span::styled(v.as_str(), theme::table_row())));
        }
        if let Some(ref cover) = t.cover {
            rows.push(("Cover", status_span(cover)));
        }
        rows
    }
}

fn status_span(status: &StatusText) -> Span<'_> {
    Span::styled(status.text.as_str(), theme::tone_style(status.tone))
}

fn reading_tile(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let block = panel_block(title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let y = inner.y + inner.height.saturating_sub(1) / 2;
    let line = Rect::new(inner.x, y, inner.width, 1.min(inner.height));
    frame.render_widget(
        Paragraph::new(Span::styled(value, theme::reading())).alignment(Alignment::Center),
        line,
    );
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Char('p') => Some(Action::Reprobe),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Connection(state) => self.connection = *state,
            Action::Telemetry(view) => self.telemetry = view.clone(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel_block("Dashboard", self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let extras = self.extras();
        let extras_height = u16::try_from(extras.len()).unwrap_or(0);

        let layout = Layout::vertical([
            Constraint::Length(1), // connection
            Constraint::Length(1), // spacer
            Constraint::Length(5), // reading tiles
            Constraint::Length(1), // spacer
            Constraint::Length(2), // charge + network
            Constraint::Length(extras_height),
            Constraint::Min(0),
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let connection = self.connection_text();
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  Device  ", theme::key_hint()),
                status_span(&connection),
            ])),
            layout[0],
        );

        let tiles = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(layout[2]);
        let t = &self.telemetry;
        reading_tile(frame, tiles[0], "Voltage", &t.voltage, false);
        reading_tile(frame, tiles[1], "Current", &t.current, false);
        reading_tile(frame, tiles[2], "Power", &t.power, false);

        let label = |name: &'static str| Span::styled(format!("  {name:<12}"), theme::key_hint());
        let states = vec![
            Line::from(vec![label("Charge"), status_span(&t.charge)]),
            Line::from(vec![label("Network"), status_span(&t.network)]),
        ];
        frame.render_widget(Paragraph::new(states), layout[4]);

        let extra_lines: Vec<Line> = extras
            .into_iter()
            .map(|(name, value)| Line::from(vec![label(name), value]))
            .collect();
        frame.render_widget(Paragraph::new(extra_lines), layout[5]);

        let hint = if self.connection == ConnectionState::Disconnected {
            format!("{}  ·  p probe again", text::DISCONNECTED)
        } else {
            "p probe again".to_owned()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, theme::key_hint())).alignment(Alignment::Center),
            layout[7],
        );
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
