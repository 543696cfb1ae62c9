use std::collections::VecDeque;
use std::sync::mpsc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Block,
    DefaultTerminal, Frame,
};

use crate::config::AppConfig;
use crate::error::CoreError;
use crate::screens::{Action, AppEvent, Notice, Screen, ScreenOrchestrator};
use crate::store::SlotIndex;
use crate::tui::events::{Event, EventHandler};
use crate::tui::form::{Field, FormState};
use crate::tui::theme;
use crate::tui::widgets::{entries, entry_view, form as form_panel, header, statusbar};

/// Ticks a notice stays in the status bar.
const NOTICE_TICKS: u16 = 16;

pub struct App {
    pub config: AppConfig,
    pub orch: ScreenOrchestrator,
    /// Row in the goal list, counted over occupied slots.
    pub selected: usize,
    pub form: Option<FormState>,
    pub should_quit: bool,
    pub today: NaiveDate,
    notices: VecDeque<Notice>,
    notice_ticks: u16,
    events: mpsc::Receiver<AppEvent>,
}

impl App {
    pub fn new(config: AppConfig, mut orch: ScreenOrchestrator, startup: Vec<Notice>) -> Self {
        let (tx, rx) = mpsc::channel();
        orch.subscribe(move |event: &AppEvent| {
            let _ = tx.send(event.clone());
        });

        App {
            config,
            orch,
            selected: 0,
            form: None,
            should_quit: false,
            today: Local::now().date_naive(),
            notices: startup.into(),
            notice_ticks: 0,
            events: rx,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn tick(&mut self) {
        self.today = Local::now().date_naive();
        if self.notices.is_empty() {
            return;
        }
        self.notice_ticks += 1;
        if self.notice_ticks >= NOTICE_TICKS {
            self.notices.pop_front();
            self.notice_ticks = 0;
        }
    }

    fn selected_slot(&self) -> Option<SlotIndex> {
        self.orch
            .slots()
            .occupied()
            .nth(self.selected)
            .map(|(index, _)| index)
    }

    /// Dispatch and pick up whatever the orchestrator published.
    fn act(&mut self, action: Action) {
        match self.orch.dispatch(action) {
            Ok(_) => {}
            Err(CoreError::Validation(failure)) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(failure.to_string());
                }
            }
            Err(e) => debug!("ignored: {e}"),
        }
        self.drain_events();
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                AppEvent::ScreenChanged { to, .. } => self.form = self.form_for(to),
                AppEvent::EntriesChanged => {
                    let count = self.orch.slots().occupied_count();
                    self.selected = self.selected.min(count.saturating_sub(1));
                }
                AppEvent::RatingChanged { .. } => {
                    if let Some(form) = self.form.as_mut() {
                        form.error = None;
                    }
                }
                AppEvent::Notice(notice) => {
                    if self.notices.is_empty() {
                        self.notice_ticks = 0;
                    }
                    self.notices.push_back(notice);
                }
            }
        }
    }

    fn form_for(&self, screen: Screen) -> Option<FormState> {
        match screen {
            Screen::AddEntry => Some(FormState::entry()),
            Screen::EditEntry(index) => self.orch.slots().get(index).map(FormState::entry_from),
            Screen::AddProgress(_) => Some(FormState::progress()),
            Screen::Main | Screen::ViewEntry(_) => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Only handle actual key presses, some terminals also report release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.orch.screen() {
            Screen::Main => self.handle_main_key(key),
            Screen::ViewEntry(_) => self.handle_view_key(key),
            Screen::AddEntry | Screen::EditEntry(_) | Screen::AddProgress(_) => {
                self.handle_form_key(key)
            }
        }
        self.drain_events();
    }

    fn handle_main_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') => self.act(Action::AddTapped),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.orch.slots().occupied_count() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(index) = self.selected_slot() {
                    self.act(Action::OpenEntry(index));
                }
            }
            _ => {}
        }
    }

    fn handle_view_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.act(Action::Back),
            KeyCode::Char('e') => self.act(Action::EditTapped),
            KeyCode::Char('p') => self.act(Action::AddProgressTapped),
            KeyCode::Char('D') => self.act(Action::DeleteTapped),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let on_rating = self
            .form
            .as_ref()
            .is_some_and(|f| f.focused() == Field::Rating);

        match key.code {
            KeyCode::Esc => self.act(Action::Back),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.save(),
            KeyCode::Tab | KeyCode::Down => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
            _ if on_rating => self.handle_rating_key(key),
            KeyCode::Enter => self.move_focus(true),
            KeyCode::Backspace => {
                if let Some(form) = self.form.as_mut() {
                    form.pop_char();
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = self.form.as_mut() {
                    form.push_char(c);
                }
            }
            _ => {}
        }
    }

    fn handle_rating_key(&mut self, key: KeyEvent) {
        let Some(selector) = self.orch.active_rating() else {
            return;
        };
        let last = selector.positions().saturating_sub(1);
        let hovered = selector.preview_position();

        match key.code {
            KeyCode::Left => {
                let p = hovered.unwrap_or(0).saturating_sub(1);
                self.act(Action::PreviewRating(p));
            }
            KeyCode::Right => {
                let p = hovered.map(|p| (p + 1).min(last)).unwrap_or(0);
                self.act(Action::PreviewRating(p));
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(p) = hovered {
                    self.act(Action::SelectRating(p));
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                // '0' stands for the last position
                let p = match c.to_digit(10) {
                    Some(0) | None => last,
                    Some(d) => (d as u8 - 1).min(last),
                };
                self.act(Action::SelectRating(p));
                self.act(Action::PreviewRating(p));
            }
            _ => {}
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let was_rating = form.focused() == Field::Rating;
        if forward {
            form.next_field();
        } else {
            form.prev_field();
        }
        let now_rating = form.focused() == Field::Rating;

        if was_rating && !now_rating {
            self.act(Action::ClearPreview);
        } else if now_rating {
            // Start the hover at the committed rating, if there is one
            let current = self
                .orch
                .active_rating()
                .map(|s| s.current_rating())
                .unwrap_or(0);
            if current > 0 {
                self.act(Action::PreviewRating(current - 1));
            }
        }
    }

    fn save(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let action = match self.orch.screen() {
            Screen::AddEntry => form.entry_draft().map(Action::SaveEntry),
            Screen::EditEntry(_) => form.entry_draft().map(Action::SaveEdit),
            Screen::AddProgress(_) => form.progress_draft().map(Action::SaveProgress),
            Screen::Main | Screen::ViewEntry(_) => return,
        };
        match action {
            Ok(action) => self.act(action),
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(e.to_string());
                }
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let screen = self.orch.screen();
        header::render(frame, chunks[0], self.today);
        statusbar::render(frame, chunks[2], screen, self.notice());

        // Overlays keep the screen they were opened from visible underneath
        match screen.backdrop() {
            Some(backdrop) => {
                self.draw_screen(frame, chunks[1], backdrop);
                if let Some(form) = &self.form {
                    let popup = popup_area(chunks[1], form_panel::height(form));
                    self.draw_form(frame, popup, screen);
                }
            }
            None => self.draw_screen(frame, chunks[1], screen),
        }
    }

    fn draw_screen(&self, frame: &mut Frame, area: Rect, screen: Screen) {
        match screen {
            Screen::Main => {
                entries::render(frame, area, self.orch.slots(), self.selected, self.today)
            }
            Screen::ViewEntry(index) => {
                if let Some(entry) = self.orch.slots().get(index) {
                    entry_view::render(
                        frame,
                        area,
                        index,
                        entry,
                        &self.config.ui.date_format,
                        self.today,
                    );
                }
            }
            Screen::AddEntry | Screen::EditEntry(_) | Screen::AddProgress(_) => {
                self.draw_form(frame, area, screen)
            }
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, screen: Screen) {
        let (Some(form), Some(selector)) = (&self.form, self.orch.active_rating()) else {
            return;
        };
        let title = match screen {
            Screen::AddEntry => "New goal".to_string(),
            Screen::EditEntry(index) => format!("Edit goal {index}"),
            Screen::AddProgress(index) => format!("Add progress to {index}"),
            Screen::Main | Screen::ViewEntry(_) => return,
        };
        form_panel::render(frame, area, &title, form, selector);
    }
}

/// Centered box of the given height inside `area`.
fn popup_area(area: Rect, height: u16) -> Rect {
    let width = (area.width * 3 / 5).max(48).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the TUI event loop.
pub fn run(config: AppConfig, orch: ScreenOrchestrator, startup: Vec<Notice>) -> Result<()> {
    let tick_rate = config.ui.tick_rate_ms;
    let mut app = App::new(config, orch, startup);

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_rate);
    let result = event_loop(&mut terminal, &mut app, &events);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, app: &mut App, events: &EventHandler) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key);
                if app.should_quit {
                    return Ok(());
                }
            }
            Event::Resize => {}
            Event::Tick => app.tick(),
        }
    }
}
