use anyhow::Context as _;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use stackfall_engine::{GameSession, InputEvent, InputQueue, SessionState};

use crate::{
    tui::{App, Tui},
    ui::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay},
};

const FRAME_RATE: f64 = 60.0;

#[derive(Debug)]
pub struct PlayApp {
    session: GameSession,
    input: InputQueue,
    tick_rate: f64,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(session: GameSession, tick_rate: f64) -> Self {
        Self {
            session,
            input: InputQueue::new(),
            tick_rate,
            is_exiting: false,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }
}

/// Maps a key to the session input it triggers.
fn input_for_key(code: KeyCode) -> Option<InputEvent> {
    match code {
        KeyCode::Left => Some(InputEvent::TranslateLeft),
        KeyCode::Right => Some(InputEvent::TranslateRight),
        KeyCode::Down => Some(InputEvent::SoftDown),
        KeyCode::Char(' ') => Some(InputEvent::HardDrop),
        KeyCode::Up | KeyCode::Char('k') => Some(InputEvent::Rotate),
        KeyCode::Char('p') => Some(InputEvent::PauseToggle),
        KeyCode::Enter => Some(InputEvent::Start),
        _ => None,
    }
}

fn key_bindings(state: SessionState) -> &'static [KeyBinding<'static>] {
    match state {
        SessionState::Menu => &[(&["Enter"], "Start"), (&["q"], "Quit")],
        SessionState::Playing => &[
            (&["←", "→"], "Move"),
            (&["↓"], "Soft Drop"),
            (&["Space"], "Hard Drop"),
            (&["↑", "k"], "Rotate"),
            (&["p"], "Pause"),
            (&["q"], "Quit"),
        ],
        SessionState::Paused => &[(&["p"], "Resume"), (&["q"], "Quit")],
        SessionState::GameOver => &[(&["q"], "Quit")],
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(Some(self.tick_rate));
        tui.set_frame_rate(FRAME_RATE);
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: &Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('q') {
            self.is_exiting = true;
        } else if let Some(input) = input_for_key(key.code) {
            self.input.push(input);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(&SessionDisplay::new(&self.session, true), main_area);
        frame.render_widget(
            KeyBindingDisplay::new(key_bindings(self.session.state())),
            help_area,
        );
    }

    fn update(&mut self, _tui: &mut Tui) -> anyhow::Result<()> {
        self.session
            .tick(&mut self.input)
            .context("game session stopped on an internal fault")?;
        Ok(())
    }
}
