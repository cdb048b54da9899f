//! Authorized cards: table, add form, delete.

use chrono::NaiveDate;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph, Row, Table, TableState},
};
use tui_input::Input;

use evse_core::view::text;
use evse_core::{CardRow, CollectionView, default_expiry};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;

use super::{input_request, panel_block, step};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddField {
    Id,
    Expires,
}

/// The add-card form overlay.
struct AddForm {
    id: Input,
    expires: Input,
    field: AddField,
    error: Option<String>,
    /// Request in flight; input is ignored until it answers.
    submitting: bool,
}

impl AddForm {
    fn new(today: NaiveDate) -> Self {
        Self {
            id: Input::default(),
            expires: Input::new(default_expiry(today).format(DATE_FORMAT).to_string()),
            field: AddField::Id,
            error: None,
            submitting: false,
        }
    }

    fn active_input(&mut self) -> &mut Input {
        match self.field {
            AddField::Id => &mut self.id,
            AddField::Expires => &mut self.expires,
        }
    }

    /// The id is validated by the panel; only the date is checked here.
    fn submit(&mut self) -> Option<Action> {
        let raw = self.expires.value().trim();
        match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(expires) => {
                self.error = None;
                self.submitting = true;
                Some(Action::AddCard {
                    id: self.id.value().to_owned(),
                    expires,
                })
            }
            Err(_) => {
                self.error = Some("Expiry must be YYYY-MM-DD".into());
                None
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.field = match self.field {
                    AddField::Id => AddField::Expires,
                    AddField::Expires => AddField::Id,
                };
                None
            }
            KeyCode::Enter => self.submit(),
            _ => {
                let field = self.field;
                let accept = move |c: char| match field {
                    AddField::Id => c.is_ascii_digit(),
                    AddField::Expires => c.is_ascii_digit() || c == '-',
                };
                if let Some(req) = input_request(key, accept) {
                    let _ = self.active_input().handle(req);
                }
                None
            }
        }
    }
}

pub struct CardsScreen {
    focused: bool,
    /// `None` until the first load answers.
    view: Option<CollectionView<CardRow>>,
    selected: usize,
    form: Option<AddForm>,
}

impl CardsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            view: None,
            selected: 0,
            form: None,
        }
    }

    fn rows(&self) -> &[CardRow] {
        match &self.view {
            Some(view) => view.rows(),
            None => &[],
        }
    }

    fn selected_id(&self) -> Option<&str> {
        self.rows().get(self.selected).map(|r| r.id.as_str())
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
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
                area,
            );
            return;
        }

        let header = Row::new(["#", "Card ID", "Expires"]).style(theme::table_header());
        let rows = self.rows().iter().map(|r| {
            Row::new([r.index.to_string(), r.id.clone(), r.expires.clone()])
                .style(theme::table_row())
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(12),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected());

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_form(frame: &mut Frame, area: Rect, form: &AddForm) {
        let width = 44u16.min(area.width.saturating_sub(4));
        let height = 7u16.min(area.height);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let dialog = Rect::new(x, y, width, height);

        frame.render_widget(Clear, dialog);
        let block = panel_block("Add card", true);
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let field_line = |label: &'static str, input: &Input, active: bool| {
            let style = if active {
                Style::default().fg(theme::NEON_CYAN)
            } else {
                theme::table_row()
            };
            Line::from(vec![
                Span::styled(format!("  {label:<9}"), theme::key_hint()),
                Span::styled(input.value().to_owned(), style),
            ])
        };
        frame.render_widget(
            Paragraph::new(field_line("Card ID", &form.id, form.field == AddField::Id)),
            rows[0],
        );
        frame.render_widget(
            Paragraph::new(field_line(
                "Expires",
                &form.expires,
                form.field == AddField::Expires,
            )),
            rows[1],
        );

        if let Some(ref err) = form.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  {err}"),
                    Style::default().fg(theme::ERROR_RED),
                )),
                rows[3],
            );
        }

        let hint = if form.submitting {
            "  Submitting..."
        } else {
            "  Tab switch  Enter add  Esc cancel"
        };
        frame.render_widget(Paragraph::new(Span::styled(hint, theme::key_hint())), rows[4]);

        if !form.submitting {
            let (input, row) = match form.field {
                AddField::Id => (&form.id, rows[0]),
                AddField::Expires => (&form.expires, rows[1]),
            };
            let offset = u16::try_from(input.visual_cursor()).unwrap_or(0);
            frame.set_cursor_position(Position::new(row.x + 11 + offset, row.y));
        }
    }
}

impl Component for CardsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(form) = self.form.as_mut() {
            if key.code == KeyCode::Esc {
                self.form = None;
                return Ok(None);
            }
            if form.submitting {
                return Ok(None);
            }
            return Ok(form.handle_key(key));
        }

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
            (KeyModifiers::NONE, KeyCode::Char('a')) => {
                self.form = Some(AddForm::new(chrono::Local::now().date_naive()));
                None
            }
            (KeyModifiers::NONE, KeyCode::Char('x') | KeyCode::Delete) => self
                .selected_id()
                .map(|id| Action::ShowConfirm(ConfirmAction::DeleteCard { id: id.to_owned() })),
            (KeyModifiers::NONE, KeyCode::Char('r')) => Some(Action::ReloadCards),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::CardsLoaded(view) => {
                self.view = Some(view.clone());
                self.selected = step(self.selected, 0, self.rows().len());
            }
            Action::CardRejected(reason) => {
                if let Some(form) = self.form.as_mut() {
                    form.submitting = false;
                    form.error = Some(reason.clone());
                }
            }
            Action::CardSubmitted { success } => {
                if *success {
                    self.form = None;
                } else if let Some(form) = self.form.as_mut() {
                    form.submitting = false;
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel_block("Authorized cards", self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        self.render_table(frame, layout[0]);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "j/k select  a add  x delete  r reload",
                theme::key_hint(),
            ))
            .alignment(Alignment::Center),
            layout[1],
        );

        if let Some(ref form) = self.form {
            Self::render_form(frame, area, form);
        }
    }

    fn captures_input(&self) -> bool {
        self.form.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
