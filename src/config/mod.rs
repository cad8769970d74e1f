pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::game::{
    BOARD_HEIGHT, BOARD_WIDTH, DROP_INTERVAL_STEP_MS, FRAME_INTERVAL_MS, INITIAL_DROP_INTERVAL_MS,
    LINES_PER_LEVEL, MIN_DROP_INTERVAL_MS, MOVE_INTERVAL_MS, POINTS_PER_LINE, Rules,
    SOFT_DROP_INTERVAL_MS,
};
use loader::ConfigError;

/// Smallest board side that fits every piece at spawn in any rotation.
pub const MIN_BOARD_SIDE: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub board: BoardConfig,
    pub timing: TimingConfig,
    pub scoring: ScoringConfig,
    pub audio: AudioConfig,
    pub leaderboard: LeaderboardConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub initial_drop_interval_ms: u64,
    pub min_drop_interval_ms: u64,
    pub drop_interval_step_ms: u64,
    pub soft_drop_interval_ms: u64,
    pub move_interval_ms: u64,
    pub frame_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            initial_drop_interval_ms: INITIAL_DROP_INTERVAL_MS,
            min_drop_interval_ms: MIN_DROP_INTERVAL_MS,
            drop_interval_step_ms: DROP_INTERVAL_STEP_MS,
            soft_drop_interval_ms: SOFT_DROP_INTERVAL_MS,
            move_interval_ms: MOVE_INTERVAL_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_per_line: u32,
    pub lines_per_level: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_line: POINTS_PER_LINE,
            lines_per_level: LINES_PER_LEVEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub music_enabled: bool,
    pub sound_enabled: bool,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            music_enabled: true,
            sound_enabled: true,
            volume: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Overrides the default file under the user's data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.width < MIN_BOARD_SIDE || self.board.height < MIN_BOARD_SIDE {
            return Err(ConfigError::Invalid(format!(
                "board must be at least {MIN_BOARD_SIDE}x{MIN_BOARD_SIDE}, got {}x{}",
                self.board.width, self.board.height
            )));
        }

        let timing = &self.timing;
        for (name, value) in [
            ("initial_drop_interval_ms", timing.initial_drop_interval_ms),
            ("min_drop_interval_ms", timing.min_drop_interval_ms),
            ("soft_drop_interval_ms", timing.soft_drop_interval_ms),
            ("move_interval_ms", timing.move_interval_ms),
            ("frame_interval_ms", timing.frame_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("timing.{name} must be positive")));
            }
        }

        if self.scoring.lines_per_level == 0 {
            return Err(ConfigError::Invalid(
                "scoring.lines_per_level must be positive".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn rules(&self) -> Rules {
        Rules {
            board_width: self.board.width,
            board_height: self.board.height,
            initial_drop_interval: Duration::from_millis(self.timing.initial_drop_interval_ms),
            min_drop_interval: Duration::from_millis(self.timing.min_drop_interval_ms),
            drop_interval_step: Duration::from_millis(self.timing.drop_interval_step_ms),
            soft_drop_interval: Duration::from_millis(self.timing.soft_drop_interval_ms),
            move_interval: Duration::from_millis(self.timing.move_interval_ms),
            points_per_line: self.scoring.points_per_line,
            lines_per_level: self.scoring.lines_per_level,
        }
    }

    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.timing.frame_interval_ms)
    }
}
