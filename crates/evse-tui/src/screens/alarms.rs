//! Alarm log, newest first.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Span, Text},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use evse_core::view::text;
use evse_core::{AlarmRow, CollectionView, StatusText};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;

use super::{panel_block, step};

pub struct AlarmsScreen {
    focused: bool,
    view: Option<CollectionView<AlarmRow>>,
    selected: usize,
}

impl AlarmsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            view: None,
            selected: 0,
        }
    }

    fn rows(&self) -> &[AlarmRow] {
        match &self.view {
            Some(view) => view.rows(),
            None => &[],
        }
    }
}

fn toned_cell(status: &StatusText) -> Cell<'_> {
    Cell::from(Text::styled(
        status.text.as_str(),
        theme::tone_style(status.tone),
    ))
}

impl Component for AlarmsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let len = self.rows().len();
        let action = match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                self.selected = step(self.selected, 1, len);
                None
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.selected = step(self.selected, -1, len);
                None
            }
            (KeyModifiers::NONE, KeyCode::Char('c')) => {
                Some(Action::ShowConfirm(ConfirmAction::ClearAlarms))
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => Some(Action::ReloadAlarms),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::AlarmsLoaded(view) = action {
            self.view = Some(view.clone());
            self.selected = step(self.selected, 0, self.rows().len());
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel_block("Alarm records", self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        let message = match &self.view {
            None => Some((text::LOADING, theme::key_hint())),
            Some(CollectionView::Failed { message }) => {
                Some((message.as_str(), Style::default().fg(theme::ERROR_RED)))
            }
            Some(CollectionView::Empty { message }) => Some((message.as_str(), theme::key_hint())),
            Some(CollectionView::Rows { .. }) => None,
        };

        if let Some((message, style)) = message {
            frame.render_widget(
                Paragraph::new(Span::styled(message, style)).alignment(Alignment::Center),
                layout[0],
            );
        } else {
            let header = Row::new(["#", "Time", "Cover", "Status"]).style(theme::table_header());
            let rows = self.rows().iter().map(|r| {
                Row::new(vec![
                    Cell::from(r.index.to_string()),
                    Cell::from(r.time.as_str()),
                    toned_cell(&r.cover),
                    toned_cell(&r.handled),
                ])
                .style(theme::table_row())
            });
            let table = Table::new(
                rows,
                [
                    Constraint::Length(4),
                    Constraint::Min(20),
                    Constraint::Length(18),
                    Constraint::Length(10),
                ],
            )
            .header(header)
            .row_highlight_style(theme::table_selected());

            let mut state = TableState::default().with_selected(Some(self.selected));
            frame.render_stateful_widget(table, layout[0], &mut state);
        }

        frame.render_widget(
            Paragraph::new(Span::styled(
                "j/k select  c clear all  r reload",
                theme::key_hint(),
            ))
            .alignment(Alignment::Center),
            layout[1],
        );
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
