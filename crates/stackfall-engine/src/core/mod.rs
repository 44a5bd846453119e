//! Board, pieces and the shape catalog.
//!
//! - [`Shape`] - the seven tetromino shapes and their rotation tables
//! - [`Piece`] - a live piece with rotation, anchor and color
//! - [`Grid`] - locked cells, collision, locking and line clears

pub use self::{grid::*, piece::*, shape::*};

pub(crate) mod grid;
pub(crate) mod piece;
pub(crate) mod shape;
