pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Internal-consistency fault that kills a session.
///
/// Faults are distinct from game over: game over is a normal end of play,
/// a fault means the engine reached a state that must not exist.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EngineFault {
    #[display("shape source produced unknown shape code {code:?}")]
    UnknownShape { code: char },
    #[display("shape source has no shapes to draw")]
    SourceExhausted,
    #[display("a single lock cleared {count} lines (at most 4 are possible)")]
    ImpossibleLineClear { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("grid width must be at least {min}, got {width}")]
    WidthTooSmall { width: usize, min: usize },
    #[display("grid height must be at least {min}, got {height}")]
    HeightTooSmall { height: usize, min: usize },
    #[display("at least one buffer row is required above the visible field")]
    NoBufferRows,
    #[display("gravity interval must be at least one tick")]
    ZeroGravityInterval,
    #[display("grid is {actual_height}x{actual_width} (+{actual_buffer}), config expects {height}x{width} (+{buffer_rows})")]
    GridMismatch {
        height: usize,
        width: usize,
        buffer_rows: usize,
        actual_height: usize,
        actual_width: usize,
        actual_buffer: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SessionError {
    #[display("invalid session configuration: {_0}")]
    Config(ConfigError),
    #[display("engine fault while starting session: {_0}")]
    Fault(EngineFault),
}
