use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Discrete player command delivered by the presentation shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputEvent {
    TranslateLeft,
    TranslateRight,
    /// Single step down, independent of gravity.
    SoftDown,
    HardDrop,
    Rotate,
    PauseToggle,
    /// Leaves the menu.
    Start,
}

impl InputEvent {
    /// Parses the one-letter script code used by headless runs.
    ///
    /// `l` left, `r` right, `d` soft down, `h` hard drop, `k` rotate,
    /// `p` pause toggle, `s` start. `.` (no input) yields `None`.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'l' => Some(Self::TranslateLeft),
            'r' => Some(Self::TranslateRight),
            'd' => Some(Self::SoftDown),
            'h' => Some(Self::HardDrop),
            'k' => Some(Self::Rotate),
            'p' => Some(Self::PauseToggle),
            's' => Some(Self::Start),
            _ => None,
        }
    }
}

/// Deduplicated queue of pending input.
///
/// Pushing an event that is already queued does nothing. The session
/// drains at most one event per tick and discards the rest, so a held key
/// never turns into several moves within one tick.
///
/// ```
/// use stackfall_engine::{InputEvent, InputQueue};
///
/// let mut queue = InputQueue::new();
/// queue.push(InputEvent::Rotate);
/// queue.push(InputEvent::Rotate);
/// queue.push(InputEvent::TranslateLeft);
/// assert_eq!(queue.len(), 2);
/// assert_eq!(queue.drain_one(), Some(InputEvent::Rotate));
/// assert!(queue.is_empty());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        if !self.events.contains(&event) {
            self.events.push_back(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Takes the oldest event and clears everything queued after it.
    pub fn drain_one(&mut self) -> Option<InputEvent> {
        let event = self.events.pop_front();
        self.events.clear();
        event
    }
}

impl Extend<InputEvent> for InputQueue {
    fn extend<T: IntoIterator<Item = InputEvent>>(&mut self, iter: T) {
        for event in iter {
            self.push(event);
        }
    }
}

impl FromIterator<InputEvent> for InputQueue {
    fn from_iter<T: IntoIterator<Item = InputEvent>>(iter: T) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_deduplicates() {
        let mut queue: InputQueue = [
            InputEvent::TranslateLeft,
            InputEvent::TranslateLeft,
            InputEvent::HardDrop,
            InputEvent::TranslateLeft,
        ]
        .into_iter()
        .collect();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain_one(), Some(InputEvent::TranslateLeft));
        assert_eq!(queue.drain_one(), None);
    }

    #[test]
    fn test_drain_empty() {
        let mut queue = InputQueue::new();
        assert_eq!(queue.drain_one(), None);
    }

    #[test]
    fn test_script_codes() {
        let events: Vec<_> = "lrdhkps.".chars().map(InputEvent::from_code).collect();
        assert_eq!(
            events,
            vec![
                Some(InputEvent::TranslateLeft),
                Some(InputEvent::TranslateRight),
                Some(InputEvent::SoftDown),
                Some(InputEvent::HardDrop),
                Some(InputEvent::Rotate),
                Some(InputEvent::PauseToggle),
                Some(InputEvent::Start),
                None,
            ]
        );
    }
}
