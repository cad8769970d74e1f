#![warn(clippy::all, clippy::pedantic)]

use std::time::Duration;

// Game board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

// Game timing (milliseconds)
pub const INITIAL_DROP_INTERVAL_MS: u64 = 500;
pub const MIN_DROP_INTERVAL_MS: u64 = 100;
pub const DROP_INTERVAL_STEP_MS: u64 = 50;
pub const SOFT_DROP_INTERVAL_MS: u64 = 100;
pub const MOVE_INTERVAL_MS: u64 = 150;
pub const FRAME_INTERVAL_MS: u64 = 16;

// Scoring: every cleared row is worth POINTS_PER_LINE * level, no multi-line bonus
pub const POINTS_PER_LINE: u32 = 10;

// Level progression
pub const LINES_PER_LEVEL: u32 = 10;
pub const STARTING_LEVEL: u32 = 1;

// Leaderboard
pub const LEADERBOARD_CAPACITY: usize = 10;
pub const MAX_NAME_LEN: usize = 10;
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

/// Tunable rules for a session, fixed for the lifetime of the loop controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub board_width: usize,
    pub board_height: usize,
    pub initial_drop_interval: Duration,
    pub min_drop_interval: Duration,
    pub drop_interval_step: Duration,
    pub soft_drop_interval: Duration,
    pub move_interval: Duration,
    pub points_per_line: u32,
    pub lines_per_level: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            initial_drop_interval: Duration::from_millis(INITIAL_DROP_INTERVAL_MS),
            min_drop_interval: Duration::from_millis(MIN_DROP_INTERVAL_MS),
            drop_interval_step: Duration::from_millis(DROP_INTERVAL_STEP_MS),
            soft_drop_interval: Duration::from_millis(SOFT_DROP_INTERVAL_MS),
            move_interval: Duration::from_millis(MOVE_INTERVAL_MS),
            points_per_line: POINTS_PER_LINE,
            lines_per_level: LINES_PER_LEVEL,
        }
    }
}
