use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Tui;

/// An application driven by [`Tui::run`].
pub trait App {
    /// Called once before the loop starts; configure tick and frame rates here.
    fn init(&mut self, tui: &mut Tui);

    fn should_exit(&self) -> bool;

    /// Terminal input (keys, resize, ...).
    fn handle_event(&mut self, tui: &mut Tui, event: &Event);

    fn draw(&self, frame: &mut Frame);

    /// One clock tick. An error stops the loop and is returned from [`Tui::run`].
    fn update(&mut self, tui: &mut Tui) -> anyhow::Result<()>;
}
