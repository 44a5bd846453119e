use std::mem;

use log::{debug, error, info};
use serde::Serialize;

use crate::{
    Block, Direction, EngineFault, GameStats, Grid, GridSnapshot, InputEvent, InputQueue, Piece,
    SeededShapeSource, SessionConfig, SessionError, Shape, ShapeSource,
};

/// Lifecycle of a session: `Menu → Playing ⇄ Paused → GameOver`.
///
/// `GameOver` is terminal and nothing leads back to `Menu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::IsVariant)]
pub enum SessionState {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// What happened when the falling piece was locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockOutcome {
    pub cleared_lines: usize,
    pub points: usize,
    pub game_over: bool,
}

/// Result of one [`GameSession::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub state: SessionState,
    pub lock: Option<LockOutcome>,
}

/// A single game: grid, falling piece, upcoming shape, score and lifecycle.
///
/// The session is driven by [`GameSession::tick`], once per frame. While
/// playing, a tick applies at most one input event, then runs gravity, then
/// locks, clears and spawns if gravity could not move the piece.
///
/// # Timing
///
/// Gravity runs once every [`SessionConfig::gravity_interval`] playing
/// ticks. The count is frozen while paused and picks up where it left off
/// on resume. The tick that pauses and the tick that resumes do nothing
/// else. Every newly spawned piece starts from a zero count, whether the
/// previous piece was locked by gravity or by a hard drop, and a hard drop
/// tick runs no gravity.
///
/// # Example
///
/// ```
/// use stackfall_engine::{InputEvent, InputQueue, SessionState};
///
/// let mut session = stackfall_engine::new_session(20, 12).unwrap();
/// let mut input = InputQueue::new();
///
/// input.push(InputEvent::Start);
/// session.tick(&mut input).unwrap();
/// assert_eq!(session.state(), SessionState::Playing);
///
/// input.push(InputEvent::HardDrop);
/// let report = session.tick(&mut input).unwrap();
/// assert!(report.lock.is_some());
/// assert_eq!(session.current_score(), 0);
/// ```
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    grid: Grid,
    falling: Piece,
    next_shape: Shape,
    source: Box<dyn ShapeSource>,
    stats: GameStats,
    state: SessionState,
    gravity_ticks: u32,
    spawn_blocked: bool,
    total_ticks: u64,
    fault: Option<EngineFault>,
}

/// Creates a session on an empty `height × width` grid with default
/// settings and a random seed.
pub fn new_session(height: usize, width: usize) -> Result<GameSession, SessionError> {
    GameSession::new(
        SessionConfig::with_size(height, width),
        Box::new(SeededShapeSource::new()),
    )
}

impl GameSession {
    pub fn new(
        config: SessionConfig,
        source: Box<dyn ShapeSource>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let grid = config.empty_grid();
        Self::with_grid(config, grid, source)
    }

    /// Like [`Self::new`], but starts from an existing grid.
    ///
    /// The grid must have the configured dimensions.
    pub fn with_grid(
        config: SessionConfig,
        grid: Grid,
        mut source: Box<dyn ShapeSource>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        config.check_grid(&grid)?;

        let first = source.next_shape()?;
        let next_shape = source.next_shape()?;
        let falling = Piece::spawn(first, grid.width());
        let spawn_blocked = !grid.is_legal_placement(falling.cells());

        Ok(Self {
            config,
            grid,
            falling,
            next_shape,
            source,
            stats: GameStats::new(),
            state: SessionState::Menu,
            gravity_ticks: 0,
            spawn_blocked,
            total_ticks: 0,
            fault: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.is_game_over()
    }

    #[must_use]
    pub fn current_score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// The piece currently under player control.
    ///
    /// After game over this is the piece that topped out, already part of
    /// the grid.
    #[must_use]
    pub fn falling_piece(&self) -> &Piece {
        &self.falling
    }

    /// Shape that spawns after the current piece locks.
    #[must_use]
    pub fn next_shape(&self) -> Shape {
        self.next_shape
    }

    /// Where the falling piece would land on a hard drop.
    #[must_use]
    pub fn ghost_piece(&self) -> Piece {
        self.falling.dropped(&self.grid)
    }

    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// The fault that killed this session, if any.
    #[must_use]
    pub fn fault(&self) -> Option<&EngineFault> {
        self.fault.as_ref()
    }

    /// Grid cells with the falling piece (and optionally its ghost) painted on.
    ///
    /// The piece is only painted while it is live, i.e. when playing or paused.
    #[must_use]
    pub fn snapshot(&self, show_ghost: bool) -> GridSnapshot {
        let mut snapshot = self.grid.snapshot();
        if self.state.is_playing() || self.state.is_paused() {
            if show_ghost {
                snapshot.overlay(self.ghost_piece().cells(), Block::Ghost);
            }
            snapshot.overlay(self.falling.cells(), Block::Falling(self.falling.color()));
        }
        snapshot
    }

    /// Leaves the menu. Has no effect in any other state.
    pub fn start(&mut self) {
        if self.state.is_menu() {
            info!("session started");
            self.state = SessionState::Playing;
        }
    }

    /// Switches between `Playing` and `Paused`. Has no effect in any other state.
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            state @ (SessionState::Menu | SessionState::GameOver) => state,
        };
        info!("session is now {:?}", self.state);
    }

    /// Advances the session by one frame.
    ///
    /// Drains at most one event from `input` (the rest of the queue is
    /// discarded). Fails only on an internal fault; once that happens the
    /// session is frozen and every later tick returns the same fault.
    pub fn tick(&mut self, input: &mut InputQueue) -> Result<TickReport, EngineFault> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        let event = input.drain_one();
        self.total_ticks += 1;

        let lock = match self.state {
            SessionState::Menu => {
                if event == Some(InputEvent::Start) {
                    self.start();
                }
                None
            }
            SessionState::Paused => {
                if event == Some(InputEvent::PauseToggle) {
                    self.toggle_pause();
                }
                None
            }
            SessionState::GameOver => None,
            SessionState::Playing => self.step(event).inspect_err(|fault| {
                error!("session fault: {fault}");
                self.fault = Some(fault.clone());
            })?,
        };

        Ok(TickReport {
            state: self.state,
            lock,
        })
    }

    fn step(&mut self, event: Option<InputEvent>) -> Result<Option<LockOutcome>, EngineFault> {
        if event == Some(InputEvent::PauseToggle) {
            self.toggle_pause();
            return Ok(None);
        }
        if self.spawn_blocked {
            // the new piece overlaps the stack and can never move
            return self.lock_falling_piece().map(Some);
        }

        match event {
            Some(InputEvent::HardDrop) => {
                let rows = self.falling.hard_drop(&self.grid);
                debug!("hard drop {:?} by {rows} rows", self.falling.shape());
                return self.lock_falling_piece().map(Some);
            }
            Some(InputEvent::TranslateLeft) => {
                self.falling.attempt_translate(Direction::Left, &self.grid);
            }
            Some(InputEvent::TranslateRight) => {
                self.falling.attempt_translate(Direction::Right, &self.grid);
            }
            Some(InputEvent::SoftDown) => {
                self.falling.attempt_translate(Direction::Down, &self.grid);
            }
            Some(InputEvent::Rotate) => {
                self.falling.rotate(&self.grid, self.config.rotation);
            }
            Some(InputEvent::PauseToggle | InputEvent::Start) | None => {}
        }

        self.gravity_ticks += 1;
        if self.gravity_ticks < self.config.gravity_interval {
            return Ok(None);
        }
        self.gravity_ticks = 0;

        if self.falling.attempt_translate(Direction::Down, &self.grid) {
            return Ok(None);
        }
        self.lock_falling_piece().map(Some)
    }

    fn lock_falling_piece(&mut self) -> Result<LockOutcome, EngineFault> {
        let cells = self.falling.minimal_bounding_cells(true);
        let signal = self.grid.lock(cells.positions(), cells.color());
        if signal.is_game_over() {
            info!(
                "game over after {} pieces, score {}",
                self.stats.completed_pieces(),
                self.stats.score()
            );
            self.state = SessionState::GameOver;
            return Ok(LockOutcome {
                cleared_lines: 0,
                points: 0,
                game_over: true,
            });
        }

        let cleared_lines = self.grid.clear_full_lines();
        let points = self.stats.complete_piece_drop(cleared_lines)?;
        debug!(
            "locked {:?} at {:?}: {cleared_lines} lines, {points} points",
            self.falling.shape(),
            cells.origin()
        );

        self.spawn_next()?;
        Ok(LockOutcome {
            cleared_lines,
            points,
            game_over: false,
        })
    }

    fn spawn_next(&mut self) -> Result<(), EngineFault> {
        let upcoming = self.source.next_shape()?;
        let shape = mem::replace(&mut self.next_shape, upcoming);
        self.falling = Piece::spawn(shape, self.grid.width());
        self.gravity_ticks = 0;
        self.spawn_blocked = !self.grid.is_legal_placement(self.falling.cells());
        if self.spawn_blocked {
            info!("spawned {shape:?} overlaps locked cells");
        }
        Ok(())
    }
}
