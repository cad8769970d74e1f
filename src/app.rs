#![warn(clippy::all, clippy::pedantic)]

use log::{debug, info};
use std::time::Duration;

use crate::components::{Board, GameState, Piece, Shape};
use crate::game::Rules;
use crate::input::{InputState, RepeatTimer};
use crate::leaderboard::{self, Entry, LeaderboardStore};
use crate::sound::AudioCues;
use crate::systems::{self, DropOutcome};

/// Draw calls made once per frame from the current state.
pub trait Renderer {
    fn render_grid(&mut self, board: &Board);
    fn render_piece(&mut self, piece: &Piece);
    fn render_score(&mut self, score: u32);
    fn render_level(&mut self, level: u32);
    fn render_next_preview(&mut self, shape: &Shape);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Suspended until a name is submitted; ticks do nothing.
    NameEntry,
}

/// The loop controller. Owns the board, the falling piece and the session.
pub struct App<A: AudioCues, S: LeaderboardStore> {
    rules: Rules,
    board: Board,
    piece: Piece,
    next: Shape,
    state: GameState,
    phase: Phase,
    drop_time: Duration,
    soft_drop_timer: Duration,
    move_left: RepeatTimer,
    move_right: RepeatTimer,
    leaderboard: Vec<Entry>,
    audio: A,
    store: S,
}

impl<A: AudioCues, S: LeaderboardStore> App<A, S> {
    pub fn new(rules: Rules, mut audio: A, store: S) -> Self {
        let board = Board::new(rules.board_width, rules.board_height);
        let first = Shape::random();
        let piece = systems::spawn_piece(&board, first);
        let leaderboard = store.load();
        info!(
            "New session on a {}x{} board, {} leaderboard entries",
            rules.board_width,
            rules.board_height,
            leaderboard.len()
        );

        audio.start_ambient_music();

        Self {
            rules,
            board,
            piece,
            next: Shape::random(),
            state: GameState::new(rules),
            phase: Phase::Playing,
            drop_time: Duration::ZERO,
            soft_drop_timer: Duration::ZERO,
            move_left: RepeatTimer::new(rules.move_interval),
            move_right: RepeatTimer::new(rules.move_interval),
            leaderboard,
            audio,
            store,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub fn next_shape(&self) -> &Shape {
        &self.next
    }

    /// Replaces the buffered next shape.
    #[cfg(test)]
    pub(crate) fn set_next_shape(&mut self, shape: Shape) {
        self.next = shape;
    }

    /// Replaces the falling piece, e.g. to set up a position.
    #[cfg(test)]
    pub(crate) fn set_piece(&mut self, piece: Piece) {
        self.piece = piece;
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.phase == Phase::NameEntry
    }

    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[must_use]
    pub fn leaderboard(&self) -> &[Entry] {
        &self.leaderboard
    }

    #[must_use]
    pub fn audio(&self) -> &A {
        &self.audio
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Advances the game by `delta`. Does nothing while suspended.
    pub fn update(&mut self, delta: Duration, input: &InputState) {
        if self.is_suspended() {
            return;
        }

        if input.rotate.just_pressed {
            self.rotate();
        }

        self.drop_time += delta;
        if input.down.held {
            self.soft_drop_timer += delta;
            if self.soft_drop_timer > self.rules.soft_drop_interval {
                self.drop();
                self.soft_drop_timer = Duration::ZERO;
            }
        } else {
            self.soft_drop_timer = Duration::ZERO;
            if self.drop_time > self.state.drop_interval {
                self.drop();
                self.drop_time = Duration::ZERO;
            }
        }

        // A lock above may have ended the game
        if self.is_suspended() {
            return;
        }

        if self.move_left.update(input.left, delta) {
            self.move_piece(-1);
        }
        if self.move_right.update(input.right, delta) {
            self.move_piece(1);
        }
    }

    pub fn move_piece(&mut self, dir: i32) -> bool {
        systems::move_piece(&self.board, &mut self.piece, dir)
    }

    pub fn rotate(&mut self) -> bool {
        let rotated = systems::rotate_piece(&self.board, &mut self.piece);
        if rotated {
            self.audio.play_rotate();
        }
        rotated
    }

    /// One gravity step; on lock this scores, spawns the next piece and may
    /// end the game.
    pub fn drop(&mut self) -> DropOutcome {
        let outcome = systems::drop_piece(&mut self.board, &mut self.piece);
        if let DropOutcome::Locked { rows_cleared } = outcome {
            debug!(
                "Locked {:?} at ({}, {}), {} rows cleared",
                self.piece.shape.kind, self.piece.x, self.piece.y, rows_cleared
            );
            if rows_cleared > 0 {
                self.audio.play_line_clear();
                let event = self.state.apply_lines(rows_cleared);
                if event.leveled_up {
                    info!("Reached level {}", self.state.level);
                    self.audio.play_level_up();
                }
            }
            self.spawn();
        }
        outcome
    }

    /// Promotes the buffered shape to the falling piece and refills the buffer.
    fn spawn(&mut self) {
        let shape = std::mem::replace(&mut self.next, Shape::random());
        self.piece = systems::spawn_piece(&self.board, shape);
        if self.board.collides(&self.piece) {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        info!("Game over with score {}", self.state.score);
        self.audio.stop_ambient_music();
        self.audio.play_game_over();
        self.board.clear();
        self.phase = Phase::NameEntry;
    }

    /// Completes name entry: records the score, resets the session and
    /// resumes play. Returns false when no name was being asked for.
    pub fn submit_name(&mut self, name: &str) -> bool {
        if !self.is_suspended() {
            return false;
        }

        let entry = Entry::now(name, self.state.score);
        info!("Recording {} with {} points", entry.name, entry.score);
        let mut entries = self.store.load();
        leaderboard::record(&mut entries, entry);
        self.store.save(&entries);
        self.leaderboard = entries;

        self.reset();
        true
    }

    fn reset(&mut self) {
        self.state.reset();
        self.drop_time = Duration::ZERO;
        self.soft_drop_timer = Duration::ZERO;
        self.move_left = RepeatTimer::new(self.rules.move_interval);
        self.move_right = RepeatTimer::new(self.rules.move_interval);
        self.phase = Phase::Playing;
        self.spawn();
        self.audio.start_ambient_music();
    }

    /// Redraws the whole scene. Pure with respect to game state.
    pub fn render(&self, renderer: &mut impl Renderer) {
        renderer.render_grid(&self.board);
        renderer.render_piece(&self.piece);
        renderer.render_score(self.state.score);
        renderer.render_level(self.state.level);
        renderer.render_next_preview(&self.next);
    }
}
