#![warn(clippy::all, clippy::pedantic)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};

/// Without release events a hold lapses after this long without a repeat.
pub const FALLBACK_HOLD_TIMEOUT: Duration = Duration::from_millis(100);

/// Without release events a press this soon after the key was last seen is
/// the OS auto-repeat catching up after its initial delay, not a new press.
pub const FALLBACK_REPEAT_WINDOW: Duration = Duration::from_millis(600);

/// One control as seen by a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    /// Level-triggered: the key is down right now.
    pub held: bool,
    /// Edge-triggered: a fresh press happened since the previous tick.
    pub just_pressed: bool,
}

impl KeyState {
    #[must_use]
    pub fn pressed() -> Self {
        Self {
            held: true,
            just_pressed: true,
        }
    }

    #[must_use]
    pub fn held() -> Self {
        Self {
            held: true,
            just_pressed: false,
        }
    }
}

/// Input snapshot sampled once at the start of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    pub left: KeyState,
    pub right: KeyState,
    pub down: KeyState,
    pub rotate: KeyState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Down,
    Rotate,
}

impl Control {
    fn index(self) -> usize {
        match self {
            Control::Left => 0,
            Control::Right => 1,
            Control::Down => 2,
            Control::Rotate => 3,
        }
    }
}

/// Game bindings: arrows or WASD, with Space as a second rotate key.
#[must_use]
pub fn control_for(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::Left | KeyCode::Char('a') => Some(Control::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(Control::Right),
        KeyCode::Down | KeyCode::Char('s') => Some(Control::Down),
        KeyCode::Up | KeyCode::Char('w' | ' ') => Some(Control::Rotate),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TrackedKey {
    held: bool,
    pressed_since_poll: bool,
    last_seen: Option<Instant>,
}

/// Turns terminal key events into per-tick `InputState` snapshots.
#[derive(Debug, Clone, Default)]
pub struct KeyboardInput {
    keys: [TrackedKey; 4],
    reports_releases: bool,
}

impl KeyboardInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the event was a game control.
    pub fn handle_event(&mut self, key: KeyEvent, now: Instant) -> bool {
        let Some(control) = control_for(key.code) else {
            return false;
        };
        let reports_releases = self.reports_releases;
        let tracked = &mut self.keys[control.index()];
        match key.kind {
            KeyEventKind::Press => {
                let repeat_after_lapse = !reports_releases
                    && tracked.last_seen.is_some_and(|seen| {
                        now.saturating_duration_since(seen) <= FALLBACK_REPEAT_WINDOW
                    });
                if !tracked.held && !repeat_after_lapse {
                    tracked.pressed_since_poll = true;
                }
                tracked.held = true;
                tracked.last_seen = Some(now);
            }
            KeyEventKind::Repeat => {
                tracked.held = true;
                tracked.last_seen = Some(now);
            }
            KeyEventKind::Release => {
                self.reports_releases = true;
                tracked.held = false;
            }
        }
        true
    }

    /// Drops every hold, e.g. when the game suspends for name entry.
    pub fn release_all(&mut self) {
        self.keys = [TrackedKey::default(); 4];
    }

    /// Samples the current state and consumes pending edges.
    pub fn poll(&mut self, now: Instant) -> InputState {
        let reports_releases = self.reports_releases;
        let mut sample = |control: Control| {
            let tracked = &mut self.keys[control.index()];
            if !reports_releases
                && tracked.held
                && tracked
                    .last_seen
                    .is_some_and(|seen| now.duration_since(seen) > FALLBACK_HOLD_TIMEOUT)
            {
                tracked.held = false;
            }
            let state = KeyState {
                held: tracked.held,
                just_pressed: tracked.pressed_since_poll,
            };
            tracked.pressed_since_poll = false;
            state
        };

        InputState {
            left: sample(Control::Left),
            right: sample(Control::Right),
            down: sample(Control::Down),
            rotate: sample(Control::Rotate),
        }
    }
}

/// Auto-repeat timer for one horizontal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatTimer {
    elapsed: Duration,
    interval: Duration,
}

impl RepeatTimer {
    /// Starts primed at the full interval, as if the key had just been released.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            elapsed: interval,
            interval,
        }
    }

    /// Returns whether the key should fire this tick. A fresh press fires
    /// immediately; a hold fires once the timer exceeds the interval.
    pub fn update(&mut self, key: KeyState, delta: Duration) -> bool {
        if key.just_pressed {
            self.elapsed = Duration::ZERO;
            true
        } else if key.held {
            self.elapsed += delta;
            if self.elapsed > self.interval {
                self.elapsed = Duration::ZERO;
                true
            } else {
                false
            }
        } else {
            self.elapsed = self.interval;
            false
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
