use std::{iter, path::PathBuf};

use serde::Serialize;
use stackfall_engine::{
    GameSession, GameStats, InputEvent, InputQueue, ScriptedShapeSource, SeededShapeSource,
    SessionConfig, SessionState, Shape, ShapeSeed, ShapeSource,
};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Seed for the shape sequence (32 hex characters); random when omitted
    #[clap(long, conflicts_with = "shapes")]
    seed: Option<ShapeSeed>,
    /// Fixed shape sequence such as "IOTSZJL", repeated when exhausted
    #[clap(long)]
    shapes: Option<String>,
    /// Input script, one code per tick: l r d h k p s, or `.` for no input
    #[clap(long, default_value = "")]
    inputs: String,
    /// Stop after this many ticks even if the game is not over
    #[clap(long, default_value_t = 10_000)]
    max_ticks: u64,
    /// Session config file (JSON)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Output file for the JSON summary (stdout when omitted)
    #[clap(long)]
    output: Option<PathBuf>,
}

/// End state of a headless run.
#[derive(Debug, Serialize)]
struct Summary {
    seed: Option<ShapeSeed>,
    config: SessionConfig,
    state: SessionState,
    ticks: u64,
    score: usize,
    stats: GameStats,
    next_shape: Shape,
    fault: Option<String>,
    /// Visible rows, top first: `.` empty, `#` locked, `@` falling.
    board: Vec<String>,
}

impl Summary {
    fn new(session: &GameSession, seed: Option<ShapeSeed>) -> Self {
        Self {
            seed,
            config: session.config().clone(),
            state: session.state(),
            ticks: session.total_ticks(),
            score: session.current_score(),
            stats: session.stats().clone(),
            next_shape: session.next_shape(),
            fault: session.fault().map(ToString::to_string),
            board: session.snapshot(false).visible_text(),
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        seed,
        shapes,
        inputs,
        max_ticks,
        config,
        output,
    } = arg;

    let config = util::read_config(config.as_deref(), SessionConfig::default())?;
    let script = parse_script(inputs)?;

    let (source, seed): (Box<dyn ShapeSource>, _) = match shapes {
        Some(codes) => (Box::new(ScriptedShapeSource::from_codes(codes)), None),
        None => {
            let source = seed.map_or_else(SeededShapeSource::new, SeededShapeSource::with_seed);
            let seed = source.seed();
            (Box::new(source), Some(seed))
        }
    };

    let mut session = GameSession::new(config, source)?;
    session.start();
    simulate(&mut session, &script, *max_ticks);

    let summary = Summary::new(&session, seed);
    util::write_json(&summary, output.as_deref())?;

    if let Some(fault) = session.fault() {
        anyhow::bail!("simulation stopped on an internal fault: {fault}");
    }
    Ok(())
}

/// Parses an input script; whitespace is ignored.
fn parse_script(script: &str) -> anyhow::Result<Vec<Option<InputEvent>>> {
    script
        .chars()
        .filter(|c| !c.is_whitespace())
        .enumerate()
        .map(|(i, code)| match (code, InputEvent::from_code(code)) {
            ('.', _) => Ok(None),
            (_, Some(event)) => Ok(Some(event)),
            (_, None) => Err(anyhow::anyhow!("unknown input code {code:?} at tick {i}")),
        })
        .collect()
}

/// Ticks `session` through `script`, then without input, until the game is
/// over, a fault occurs or `max_ticks` is reached.
///
/// Once the script is used up, a session left in the menu or paused cannot
/// change any more, so the run stops there as well.
fn simulate(session: &mut GameSession, script: &[Option<InputEvent>], max_ticks: u64) {
    let mut input = InputQueue::new();
    let events = script.iter().copied().map(Some).chain(iter::repeat(None));
    for (_, event) in (0..max_ticks).zip(events) {
        // `None` once the script is used up
        if session.is_over() || (event.is_none() && !session.state().is_playing()) {
            break;
        }
        input.extend(event.flatten());
        if session.tick(&mut input).is_err() {
            break;
        }
    }
    log::info!(
        "simulation finished after {} ticks: {:?}, score {}",
        session.total_ticks(),
        session.state(),
        session.current_score()
    );
}

#[cfg(test)]
mod tests {
    use stackfall_engine::EngineFault;

    use super::*;

    fn scripted_session(shapes: &str) -> GameSession {
        let mut session = GameSession::new(
            SessionConfig::default(),
            Box::new(ScriptedShapeSource::from_codes(shapes)),
        )
        .unwrap();
        session.start();
        session
    }

    #[test]
    fn test_parse_script() {
        let script = parse_script("l r\n.h").unwrap();
        assert_eq!(
            script,
            vec![
                Some(InputEvent::TranslateLeft),
                Some(InputEvent::TranslateRight),
                None,
                Some(InputEvent::HardDrop),
            ]
        );
        let err = parse_script("lrx").unwrap_err();
        assert!(err.to_string().contains("'x' at tick 2"));
    }

    #[test]
    fn test_hard_drops_until_game_over() {
        let mut session = scripted_session("O");
        let script = parse_script(&"h".repeat(20)).unwrap();
        simulate(&mut session, &script, 1000);

        assert!(session.is_over());
        assert_eq!(session.total_ticks(), 11);
        let summary = Summary::new(&session, None);
        assert_eq!(summary.stats.completed_pieces(), 10);
        assert_eq!(summary.board.len(), 20);
        assert!(summary.board.iter().all(|row| row == ".....##....."));
    }

    #[test]
    fn test_runs_to_max_ticks_without_input() {
        let mut session = scripted_session("I");
        simulate(&mut session, &[], 5);
        assert_eq!(session.total_ticks(), 5);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.falling_piece().anchor().row, 4);
    }

    #[test]
    fn test_stops_when_left_paused() {
        let mut session = scripted_session("I");
        simulate(&mut session, &[None, Some(InputEvent::PauseToggle)], 100);
        assert_eq!(session.total_ticks(), 2);
        assert_eq!(session.state(), SessionState::Paused);
    }

    #[test]
    fn test_fault_is_reported_in_summary() {
        let mut session = scripted_session("OOQ");
        simulate(&mut session, &[Some(InputEvent::HardDrop)], 100);
        assert_eq!(session.fault(), Some(&EngineFault::UnknownShape { code: 'Q' }));

        let json = serde_json::to_value(Summary::new(&session, None)).unwrap();
        assert_eq!(json["state"], "Playing");
        assert!(json["fault"].as_str().unwrap().contains("'Q'"));
        assert_eq!(json["seed"], serde_json::Value::Null);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let seed = ShapeSeed::from_u128(0x5eed);
        let script = parse_script("lkrhdhkkhllh").unwrap();
        let run = || {
            let mut session = GameSession::new(
                SessionConfig::default(),
                Box::new(SeededShapeSource::with_seed(seed)),
            )
            .unwrap();
            session.start();
            simulate(&mut session, &script, 200);
            serde_json::to_string(&Summary::new(&session, Some(seed))).unwrap()
        };
        assert_eq!(run(), run());
    }
}
