use std::time::{Duration, Instant};

use crossterm::event;

use crate::tui::event::TuiEvent;

/// Produces ticks at a fixed rate and redraws after changes.
///
/// A redraw happens only when something changed since the last one (a tick
/// or terminal input) and at least `frame_interval` has passed, so bursts of
/// input are batched into one frame.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    frame_interval: Duration,
    last_tick: Instant,
    last_render: Instant,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

    pub(super) fn new() -> Self {
        let now = Instant::now();
        Self {
            tick_interval: None,
            frame_interval: Self::DEFAULT_FRAME_INTERVAL,
            last_tick: now,
            last_render: now.checked_sub(Self::DEFAULT_FRAME_INTERVAL).unwrap_or(now),
            dirty: true,
        }
    }

    /// `None` stops tick events.
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    pub(super) fn set_frame_interval(&mut self, interval: Duration) {
        self.frame_interval = interval;
    }

    /// Blocks until the next tick, redraw or terminal event.
    pub(super) fn next(&mut self) -> anyhow::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(tick_interval) = self.tick_interval
                && now.duration_since(self.last_tick) >= tick_interval
            {
                // keep a steady cadence even if a tick was handled late
                self.last_tick += tick_interval;
                if now.duration_since(self.last_tick) >= tick_interval {
                    self.last_tick = now;
                }
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }

            if self.dirty && now.duration_since(self.last_render) >= self.frame_interval {
                self.last_render = now;
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(timeout) = self.timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self.tick_interval.map(|interval| self.last_tick + interval);
        let next_render_at = self.dirty.then(|| self.last_render + self.frame_interval);
        let next_at = [next_tick_at, next_render_at].into_iter().flatten().min()?;
        Some(next_at.saturating_duration_since(now))
    }
}
