use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use stackfall_engine::GridSnapshot;

use crate::ui::widgets::BlockDisplay;

/// The visible rows of a grid snapshot. Buffer rows are not drawn.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    snapshot: &'a GridSnapshot,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(snapshot: &'a GridSnapshot) -> Self {
        Self {
            snapshot,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        super::cells_u16(self.snapshot.width()) * BlockDisplay::WIDTH
            + super::block_margin(self.block.as_ref()).0
    }

    pub fn height(&self) -> u16 {
        super::cells_u16(self.snapshot.height()) * BlockDisplay::HEIGHT
            + super::block_margin(self.block.as_ref()).1
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.snapshot.width()).map(|_| Constraint::Length(BlockDisplay::WIDTH));
        let row_constraints =
            (0..self.snapshot.height()).map(|_| Constraint::Length(BlockDisplay::HEIGHT));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.snapshot.visible_rows()) {
            for (grid_cell, block) in iter::zip(grid_row, row) {
                BlockDisplay::from_block(*block, true).render(grid_cell, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use stackfall_engine::Grid;

    use super::*;

    #[test]
    fn test_size_covers_visible_rows_and_borders() {
        let snapshot = Grid::new(20, 12, 2).snapshot();
        let board = BoardDisplay::new(&snapshot);
        assert_eq!((board.width(), board.height()), (24, 20));

        let board = board.block(BlockWidget::bordered());
        assert_eq!((board.width(), board.height()), (26, 22));
    }
}
