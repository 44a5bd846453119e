use std::path::PathBuf;

use stackfall_engine::{GameSession, SeededShapeSource, SessionConfig, ShapeSeed};

use crate::{command::play::app::PlayApp, tui::Tui, util};

mod app;

const DEFAULT_TICK_RATE: f64 = 20.0;
/// Ticks per gravity step when no config file is given: two rows per second.
const DEFAULT_GRAVITY_INTERVAL: u32 = 10;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Session config file (JSON)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Seed for the shape sequence (32 hex characters)
    #[clap(long)]
    seed: Option<ShapeSeed>,
    /// Game ticks per second
    #[clap(long, default_value_t = DEFAULT_TICK_RATE)]
    tick_rate: f64,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            config: None,
            seed: None,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        config,
        seed,
        tick_rate,
    } = arg;
    anyhow::ensure!(
        tick_rate.is_finite() && *tick_rate > 0.0,
        "tick rate must be a positive number, got {tick_rate}"
    );

    let default = SessionConfig {
        gravity_interval: DEFAULT_GRAVITY_INTERVAL,
        ..SessionConfig::default()
    };
    let config = util::read_config(config.as_deref(), default)?;
    let source = seed.map_or_else(SeededShapeSource::new, SeededShapeSource::with_seed);
    log::info!("playing with seed {}", source.seed());

    let session = GameSession::new(config, Box::new(source))?;
    let mut app = PlayApp::new(session, *tick_rate);
    Tui::new().run(&mut app)?;

    let stats = app.session().stats();
    println!(
        "Score: {} ({} lines, {} pieces)",
        stats.score(),
        stats.total_cleared_lines(),
        stats.completed_pieces()
    );
    Ok(())
}
