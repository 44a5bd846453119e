//! Session logic on top of the core board types.
//!
//! - [`GameSession`] - one game: lifecycle, gravity, locking, scoring
//! - [`SessionConfig`] - grid dimensions, gravity interval, rotation system
//! - [`ShapeSource`] - injectable supplier of spawned shapes
//! - [`InputQueue`] - deduplicated player input, drained once per tick
//! - [`GameStats`] - score table and lock statistics
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] (it starts in [`SessionState::Menu`])
//! 2. Push a [`InputEvent::Start`] or call [`GameSession::start`]
//! 3. Call [`GameSession::tick`] once per frame with the pending input
//! 4. Pieces fall, lock, clear lines and respawn until a lock reaches row 0
//!
//! # Example
//!
//! ```
//! use stackfall_engine::{
//!     GameSession, InputEvent, InputQueue, ScriptedShapeSource, SessionConfig,
//! };
//!
//! let config = SessionConfig::default();
//! let source = ScriptedShapeSource::from_codes("O");
//! let mut session = GameSession::new(config, Box::new(source)).unwrap();
//! session.start();
//!
//! let mut input = InputQueue::new();
//! while !session.is_over() {
//!     input.push(InputEvent::HardDrop);
//!     session.tick(&mut input).unwrap();
//! }
//! assert_eq!(session.stats().completed_pieces(), 10);
//! ```

pub use self::{config::*, game_session::*, game_stats::*, input::*, shape_source::*};

mod config;
mod game_session;
mod game_stats;
mod input;
mod shape_source;
