use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{
    block_display::*, board_display::*, key_binding_display::*, session_display::*,
    shape_display::*, stats_display::*,
};

mod block_display;
mod board_display;
mod key_binding_display;
mod session_display;
mod shape_display;
mod stats_display;

mod color {
    use ratatui::style::Color;

    pub const YELLOW: Color = Color::Rgb(255, 255, 0);
    pub const RED: Color = Color::Rgb(255, 0, 0);
    pub const CYAN: Color = Color::Rgb(0, 255, 255);
    pub const GRAY: Color = Color::Rgb(127, 127, 127);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);

    /// Engine cell color as a terminal color.
    pub const fn from_engine(color: stackfall_engine::Color) -> Color {
        Color::Rgb(color.r, color.g, color.b)
    }
}

mod style {
    use ratatui::style::{Color, Style};

    use crate::ui::widgets::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    pub const fn bg_only(color: Color) -> Style {
        Style::new().fg(color).bg(color)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const EMPTY: Style = bg_only(color::BLACK);
    pub const EMPTY_DOT: Style = fg_bg(color::GRAY, color::BLACK);
    pub const GHOST: Style = fg_bg(color::WHITE, color::BLACK);
}

/// Columns and rows taken by the borders and padding of `block`.
fn block_margin(block: Option<&BlockWidget>) -> (u16, u16) {
    let Some(block) = block else {
        return (0, 0);
    };
    let outer = Rect::new(0, 0, 100, 100);
    let inner = block.inner(outer);
    (outer.width - inner.width, outer.height - inner.height)
}

/// Grid dimensions are small validated numbers; saturate just in case.
fn cells_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
