use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};
use stackfall_engine::{GameSession, SessionState};

use crate::ui::widgets::{BoardDisplay, ShapeDisplay, StatsDisplay, color, style};

/// Board, next shape and statistics of one session, with state overlays.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    show_ghost: bool,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession, show_ghost: bool) -> Self {
        Self {
            session,
            show_ghost,
        }
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.session.state();
        let border_style = match state {
            SessionState::Menu => color::CYAN,
            SessionState::Playing => color::WHITE,
            SessionState::Paused => color::YELLOW,
            SessionState::GameOver => color::RED,
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(Padding::horizontal(1))
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let snapshot = self.session.snapshot(self.show_ghost);
        let board = BoardDisplay::new(&snapshot).block(
            Block::bordered()
                .border_style(border_style)
                .style(style::DEFAULT),
        );
        let next = {
            let widget = ShapeDisplay::default().block(panel("NEXT"));
            if state.is_menu() {
                widget
            } else {
                widget.shape(self.session.next_shape())
            }
        };
        let stats = StatsDisplay::new(self.session.stats()).block(panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(board.width()),
            Constraint::Length(next.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [board_area] = Layout::vertical([Constraint::Length(board.height())]).areas(center_column);
        let [next_area] = Layout::vertical([Constraint::Length(next.height())]).areas(right_column);

        stats.render(stats_area, buf);
        board.render(board_area, buf);
        next.render(next_area, buf);

        let popup = match state {
            SessionState::Playing => None,
            SessionState::Menu => Some((
                "PRESS ENTER",
                Style::new().fg(color::BLACK).bg(color::CYAN),
            )),
            SessionState::Paused => {
                Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW)))
            }
            SessionState::GameOver => {
                Some(("GAME OVER", Style::new().fg(color::WHITE).bg(color::RED)))
            }
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area = board_area.centered(Constraint::Length(board.width()), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
