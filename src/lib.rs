pub mod app;
pub mod components;
pub mod config;
pub mod game;
pub mod input;
pub mod layout;
pub mod leaderboard;
pub mod name_entry;
pub mod sound;
pub mod systems;
pub mod ui;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

/// Host frame clock: hands out the time elapsed since the previous tick.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_update: Instant,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
        }
    }

    /// Marks a new frame at `now` and returns the elapsed time since the
    /// last one. A `now` earlier than the previous tick yields zero.
    pub fn tick_at(&mut self, now: Instant) -> Duration {
        let delta = now.saturating_duration_since(self.last_update);
        self.last_update = now;
        delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
