use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use stackfall_engine::{Block, Piece, Position, Shape};

use crate::ui::widgets::BlockDisplay;

/// A shape in its spawn rotation, trimmed to its occupied cells.
#[derive(Debug, Default)]
pub struct ShapeDisplay<'a> {
    shape: Option<Shape>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> ShapeDisplay<'a> {
    pub fn shape(self, shape: Shape) -> Self {
        Self {
            shape: Some(shape),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::WIDTH + super::block_margin(self.block.as_ref()).0
    }

    pub fn height(&self) -> u16 {
        2 * BlockDisplay::HEIGHT + super::block_margin(self.block.as_ref()).1
    }
}

impl Widget for &ShapeDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(shape) = self.shape else {
            return;
        };
        let cells = Piece::new(shape, Position::new(0, 0)).minimal_bounding_cells(true);
        let (cols, rows) = (super::cells_u16(cells.cols()), super::cells_u16(cells.rows()));

        let shape_area = area.centered(
            Constraint::Length(cols * BlockDisplay::WIDTH),
            Constraint::Length(rows * BlockDisplay::HEIGHT),
        );
        let horizontal = Layout::horizontal((0..cols).map(|_| Constraint::Length(BlockDisplay::WIDTH)))
            .flex(Flex::Center);
        let vertical = Layout::vertical((0..rows).map(|_| Constraint::Length(BlockDisplay::HEIGHT)));

        let occupied = BlockDisplay::from_block(Block::Falling(cells.color()), false);
        let empty = BlockDisplay::from_block(Block::Empty, false);
        for (row, grid_row) in shape_area.layout_vec(&vertical).into_iter().enumerate() {
            for (col, grid_cell) in grid_row.layout_vec(&horizontal).into_iter().enumerate() {
                let display = if cells.is_occupied(row, col) {
                    &occupied
                } else {
                    &empty
                };
                display.render(grid_cell, buf);
            }
        }
    }
}
