//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use evse_core::view::text;
use evse_core::{AutoApprove, ConnectionState, NOTICE_TTL, Notice, Panel, Tone};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    /// Probe result; `Unknown` while a probe is in flight.
    connection: ConnectionState,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    panel: Panel,
    /// Cancels the data bridge (and with it the poller).
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Active notice toast with display timestamp.
    notice: Option<(Notice, Instant)>,
    throbber_state: ThrobberState,
}

impl App {
    pub fn new(panel: Panel) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();

        Self {
            active_screen: ScreenId::Dashboard,
            screens,
            running: true,
            connection: ConnectionState::Unknown,
            help_visible: false,
            action_tx,
            action_rx,
            panel,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notice: None,
            throbber_state: ThrobberState::default(),
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }

        let bridge = {
            let panel = self.panel.clone();
            let tx = self.action_tx.clone();
            let cancel = self.data_cancel.clone();
            tokio::spawn(data_bridge::run_data_bridge(panel, tx, cancel))
        };

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(device = %self.panel.config().url, "TUI event loop started");

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
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        // Teardown releases the poll handle exactly once.
        self.data_cancel.cancel();
        let _ = bridge.await;
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Confirmation dialog captures all input
        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        // Text entry captures everything except Ctrl+C
        let capturing = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());
        if capturing {
            if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
                return Ok(Some(Action::Quit));
            }
            if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                return screen.handle_key_event(key);
            }
            return Ok(None);
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='4')) => {
                let n = u8::try_from(c).map_or(0, |b| b - b'0');
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Render | Action::Resize(..) => {}

            Action::Tick => {
                if self
                    .notice
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTICE_TTL)
                {
                    self.notice = None;
                }
                if self.connection == ConnectionState::Unknown {
                    self.throbber_state.calc_next();
                }
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Connection(state) => {
                self.connection = *state;
                self.broadcast(action)?;
            }

            // Data updates go to ALL screens so they stay in sync
            Action::Telemetry(_)
            | Action::ConfigLoaded(_)
            | Action::CardsLoaded(_)
            | Action::AlarmsLoaded(_)
            | Action::CardRejected(_)
            | Action::CardSubmitted { .. }
            | Action::FillSettingsForm(_) => self.broadcast(action)?,

            // ── Device requests ───────────────────────────────────────
            Action::Reprobe => data_bridge::spawn_probe(&self.panel, &self.action_tx),
            Action::ReloadConfig => data_bridge::spawn_load_config(&self.panel, &self.action_tx),
            Action::ReloadCards => data_bridge::spawn_load_cards(&self.panel, &self.action_tx),
            Action::ReloadAlarms => data_bridge::spawn_load_alarms(&self.panel, &self.action_tx),

            Action::SaveSettings(update) => {
                let (panel, tx, update) = (self.panel.clone(), self.action_tx.clone(), *update);
                tokio::spawn(async move {
                    let outcome = panel.save_config(&update).await;
                    let _ = tx.send(Action::Notify(outcome.notice));
                    if let Some(view) = outcome.reloaded {
                        let _ = tx.send(Action::ConfigLoaded(view));
                    }
                });
            }

            Action::AddCard { id, expires } => {
                let (panel, tx) = (self.panel.clone(), self.action_tx.clone());
                let (id, expires) = (id.clone(), *expires);
                tokio::spawn(async move {
                    match panel.add_card(&id, expires).await {
                        Err(e) => {
                            let _ = tx.send(Action::CardRejected(e.to_string()));
                        }
                        Ok(outcome) => {
                            let success = outcome.is_success();
                            let _ = tx.send(Action::CardSubmitted { success });
                            let _ = tx.send(Action::Notify(outcome.notice));
                            if let Some(view) = outcome.reloaded {
                                let _ = tx.send(Action::CardsLoaded(view));
                            }
                        }
                    }
                });
            }

            // ── Confirmation dialog ───────────────────────────────────
            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(confirm.clone());
            }

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm);
                }
            }

            Action::ConfirmNo => {
                if let Some(confirm) = self.pending_confirm.take() {
                    debug!(%confirm, "declined");
                }
            }

            Action::Notify(notice) => {
                self.notice = Some((notice.clone(), Instant::now()));
            }
        }

        Ok(())
    }

    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Run a confirmed action. The dialog already asked, so the panel gets
    /// an approving gate.
    fn execute_confirm(&self, confirm: ConfirmAction) {
        let (panel, tx) = (self.panel.clone(), self.action_tx.clone());
        match confirm {
            ConfirmAction::DeleteCard { id } => {
                tokio::spawn(async move {
                    if let Some(outcome) = panel.delete_card(&id, &AutoApprove).await {
                        let _ = tx.send(Action::Notify(outcome.notice));
                        if let Some(view) = outcome.reloaded {
                            let _ = tx.send(Action::CardsLoaded(view));
                        }
                    }
                });
            }
            ConfirmAction::ClearAlarms => {
                tokio::spawn(async move {
                    if let Some(outcome) = panel.clear_alarms(&AutoApprove).await {
                        let _ = tx.send(Action::Notify(outcome.notice));
                        if let Some(view) = outcome.reloaded {
                            let _ = tx.send(Action::AlarmsLoaded(view));
                        }
                    }
                });
            }
            ConfirmAction::ResetSettings => {
                if let Some(form) = panel.reset_form(&AutoApprove) {
                    let _ = tx.send(Action::FillSettingsForm(form));
                    let _ = tx.send(Action::Notify(Notice::success(text::SETTINGS_RESET)));
                }
            }
        }
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

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }

        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays: last = topmost
        if let Some((ref notice, _)) = self.notice {
            render_notice(frame, area, notice);
        }

        if let Some(ref confirm) = self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }

        if self.help_visible {
            render_help_overlay(frame, area);
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
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let indicator = match self.connection {
            ConnectionState::Connected => {
                Span::styled("● connected", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionState::Disconnected => {
                Span::styled("○ disconnected", Style::default().fg(theme::ERROR_RED))
            }
            ConnectionState::Unknown => Throbber::default()
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE))
                .to_symbol_span(&self.throbber_state),
        };

        let mut spans = vec![Span::raw(" "), indicator];
        if self.connection == ConnectionState::Unknown {
            spans.push(Span::styled(" probing", Style::default().fg(theme::ELECTRIC_YELLOW)));
        }
        spans.push(Span::styled(
            format!(" │ {}", self.panel.config().url),
            theme::key_hint(),
        ));
        spans.push(Span::styled(" │ ? help  q quit", theme::key_hint()));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = centered(area, 50, 5);

    frame.render_widget(Clear, dialog_area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        dialog_area,
    );

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            format!("  {confirm}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

/// Notice toast in the bottom-right corner, above the status bar.
fn render_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let msg_len = u16::try_from(notice.text.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width.min(area.width), height.min(area.height));

    let color = theme::tone_color(notice.tone);
    let icon = match notice.tone {
        Tone::Success => "✓",
        Tone::Danger => "✗",
        Tone::Warning => "!",
        Tone::Info | Tone::Neutral => "·",
    };

    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        toast_area,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));

    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notice.text.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 56, 18);

    frame.render_widget(Clear, help_area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        help_area,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let row = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };
    let heading = |title: &'static str| {
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::NEON_CYAN),
        ))
    };

    let help_text = vec![
        Line::from(""),
        heading("Navigation"),
        row("1-4", "Jump to screen"),
        row("Tab", "Next screen"),
        row("j/k ↑/↓", "Move up/down"),
        Line::from(""),
        heading("Screens"),
        row("p", "Probe again (dashboard)"),
        row("e / s / d", "Edit / save / defaults (settings)"),
        row("a / x", "Add / delete card"),
        row("c", "Clear alarm log"),
        row("r", "Reload the current list"),
        Line::from(""),
        row("?", "This help"),
        row("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "                    Esc or ? to close",
            theme::key_hint(),
        )),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::{KeyEvent, KeyEventKind, KeyEventState};
    use pretty_assertions::assert_eq;

    use evse_core::{ConfigUpdate, PanelConfig};

    use super::*;

    fn app() -> App {
        let url = evse_config::parse_device_url("127.0.0.1:1").unwrap();
        App::new(Panel::new(PanelConfig::new(url)).unwrap())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn number_keys_switch_screens() {
        let mut app = app();
        let action = app.handle_key_event(key(KeyCode::Char('3'))).unwrap();
        assert!(matches!(action, Some(Action::SwitchScreen(ScreenId::Cards))));

        app.process_action(&Action::SwitchScreen(ScreenId::Cards)).unwrap();
        assert_eq!(app.active_screen, ScreenId::Cards);
    }

    #[test]
    fn confirm_dialog_captures_keys() {
        let mut app = app();
        app.process_action(&Action::ShowConfirm(ConfirmAction::ClearAlarms))
            .unwrap();

        // Global shortcuts are swallowed while the dialog is open
        assert!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap().is_none());
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('y'))).unwrap(),
            Some(Action::ConfirmYes)
        ));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::ConfirmNo)
        ));
    }

    #[test]
    fn declining_sends_nothing() {
        let mut app = app();
        app.process_action(&Action::ShowConfirm(ConfirmAction::ResetSettings))
            .unwrap();
        app.process_action(&Action::ConfirmNo).unwrap();

        assert_eq!(app.pending_confirm, None);
        assert!(app.action_rx.try_recv().is_err());
    }

    #[test]
    fn confirmed_reset_fills_form_and_notifies() {
        let mut app = app();
        app.process_action(&Action::ShowConfirm(ConfirmAction::ResetSettings))
            .unwrap();
        app.process_action(&Action::ConfirmYes).unwrap();

        assert!(matches!(
            app.action_rx.try_recv().unwrap(),
            Action::FillSettingsForm(form) if form == ConfigUpdate::FACTORY
        ));
        match app.action_rx.try_recv().unwrap() {
            Action::Notify(notice) => assert_eq!(notice, Notice::success(text::SETTINGS_RESET)),
            other => panic!("expected a notice, got {other:?}"),
        }
    }

    #[test]
    fn notice_expires_after_ttl() {
        let mut app = app();
        app.process_action(&Action::Notify(Notice::success("Card added")))
            .unwrap();
        app.process_action(&Action::Tick).unwrap();
        assert!(app.notice.is_some());

        let stale = Instant::now().checked_sub(NOTICE_TTL).unwrap();
        app.notice = Some((Notice::failure("Delete failed"), stale));
        app.process_action(&Action::Tick).unwrap();
        assert!(app.notice.is_none());
    }

    #[test]
    fn connection_state_reaches_status_bar() {
        let mut app = app();
        assert_eq!(app.connection, ConnectionState::Unknown);
        app.process_action(&Action::Connection(ConnectionState::Disconnected))
            .unwrap();
        assert_eq!(app.connection, ConnectionState::Disconnected);
    }
}
