#[cfg(test)]
mod tests {
    use crate::app::Phase;
    use crate::components::{Shape, TetrominoType};
    use crate::input::{InputState, KeyState};
    use crate::leaderboard::{Entry, LeaderboardStore};
    use crate::systems::DropOutcome;
    use crate::tests::test_utils::{
        Cue, DrawCall, RecordingRenderer, board_is_empty, create_test_app, fill_row_except,
        force_game_over, piece_at,
    };
    use std::time::Duration;

    const IDLE: InputState = InputState {
        left: KeyState {
            held: false,
            just_pressed: false,
        },
        right: KeyState {
            held: false,
            just_pressed: false,
        },
        down: KeyState {
            held: false,
            just_pressed: false,
        },
        rotate: KeyState {
            held: false,
            just_pressed: false,
        },
    };

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_new_app_starts_playing() {
        let app = create_test_app();
        assert_eq!(app.phase(), Phase::Playing);
        assert_eq!(app.state().score, 0);
        assert_eq!(app.state().level, 1);
        assert_eq!(app.state().drop_interval, ms(500));
        assert!(board_is_empty(app.board()));
        assert_eq!(app.piece().y, 0);
        assert!(!app.board().collides(app.piece()));
        assert_eq!(app.audio().cues, vec![Cue::MusicStart]);
    }

    #[test]
    fn test_gravity_waits_for_interval() {
        let mut app = create_test_app();
        app.set_piece(piece_at(TetrominoType::O, 4, 0));

        app.update(ms(500), &IDLE);
        assert_eq!(app.piece().y, 0);
        app.update(ms(1), &IDLE);
        assert_eq!(app.piece().y, 1);

        // The accumulator restarts after each drop
        app.update(ms(400), &IDLE);
        assert_eq!(app.piece().y, 1);
    }

    #[test]
    fn test_soft_drop_while_held() {
        let mut app = create_test_app();
        app.set_piece(piece_at(TetrominoType::O, 4, 0));
        let down = InputState {
            down: KeyState::pressed(),
            ..IDLE
        };

        app.update(ms(100), &down);
        assert_eq!(app.piece().y, 0);
        app.update(ms(1), &down);
        assert_eq!(app.piece().y, 1);

        let held = InputState {
            down: KeyState::held(),
            ..IDLE
        };
        for _ in 0..5 {
            app.update(ms(101), &held);
        }
        assert_eq!(app.piece().y, 6);
    }

    #[test]
    fn test_gravity_resumes_after_soft_drop_release() {
        let mut app = create_test_app();
        app.set_piece(piece_at(TetrominoType::O, 4, 0));
        let held = InputState {
            down: KeyState::held(),
            ..IDLE
        };

        // Gravity time keeps accumulating while soft dropping
        app.update(ms(90), &held);
        app.update(ms(90), &held);
        assert_eq!(app.piece().y, 1);
        app.update(ms(340), &IDLE);
        assert_eq!(app.piece().y, 2);
    }

    #[test]
    fn test_horizontal_press_moves_immediately() {
        let mut app = create_test_app();
        app.set_piece(piece_at(TetrominoType::O, 4, 5));
        let press = InputState {
            left: KeyState::pressed(),
            ..IDLE
        };
        app.update(ms(16), &press);
        assert_eq!(app.piece().x, 3);
    }

    #[test]
    fn test_horizontal_hold_repeats_after_interval() {
        let mut app = create_test_app();
        app.set_piece(piece_at(TetrominoType::O, 4, 5));
        let press = InputState {
            right: KeyState::pressed(),
            ..IDLE
        };
        let hold = InputState {
            right: KeyState::held(),
            ..IDLE
        };

        app.update(ms(1), &press);
        assert_eq!(app.piece().x, 5);
        app.update(ms(150), &hold);
        assert_eq!(app.piece().x, 5);
        app.update(ms(1), &hold);
        assert_eq!(app.piece().x, 6);

        // Release then a new tap fires straight away
        app.update(ms(1), &IDLE);
        app.update(ms(1), &press);
        assert_eq!(app.piece().x, 7);
    }

    #[test]
    fn test_rotate_is_edge_triggered() {
        let mut app = create_test_app();
        app.set_piece(piece_at(TetrominoType::T, 4, 5));
        let press = InputState {
            rotate: KeyState::pressed(),
            ..IDLE
        };
        let hold = InputState {
            rotate: KeyState::held(),
            ..IDLE
        };

        app.update(ms(1), &press);
        let once = Shape::new(TetrominoType::T).rotated_cw();
        assert_eq!(app.piece().shape, once);
        assert_eq!(app.audio().count(Cue::Rotate), 1);

        app.update(ms(1), &hold);
        app.update(ms(1), &hold);
        assert_eq!(app.piece().shape, once);
        assert_eq!(app.audio().count(Cue::Rotate), 1);
    }

    #[test]
    fn test_failed_rotation_is_silent() {
        let mut app = create_test_app();
        let mut piece = piece_at(TetrominoType::I, 9, 5);
        piece.shape = piece.shape.rotated_cw();
        app.set_piece(piece.clone());

        assert!(!app.rotate());
        assert_eq!(app.piece(), &piece);
        assert_eq!(app.audio().count(Cue::Rotate), 0);
    }

    #[test]
    fn test_lock_scores_and_spawns_next() {
        let mut app = create_test_app();
        fill_row_except(app.board_mut(), 19, &[3, 4, 5, 6]);
        app.set_piece(piece_at(TetrominoType::I, 3, 19));
        app.set_next_shape(Shape::new(TetrominoType::O));

        assert_eq!(app.drop(), DropOutcome::Locked { rows_cleared: 1 });
        assert_eq!(app.state().score, 10);
        assert_eq!(app.state().lines_cleared, 1);
        assert!(board_is_empty(app.board()));
        assert_eq!(app.piece().shape.kind, TetrominoType::O);
        assert_eq!((app.piece().x, app.piece().y), (4, 0));
        assert_eq!(app.audio().count(Cue::LineClear), 1);
        assert_eq!(app.audio().count(Cue::LevelUp), 0);
    }

    #[test]
    fn test_lock_without_clear_plays_no_cue() {
        let mut app = create_test_app();
        app.set_piece(piece_at(TetrominoType::O, 0, 18));
        assert_eq!(app.drop(), DropOutcome::Locked { rows_cleared: 0 });
        assert_eq!(app.state().score, 0);
        assert_eq!(app.audio().cues, vec![Cue::MusicStart]);
    }

    #[test]
    fn test_level_up_cue() {
        let mut app = create_test_app();
        app.state_mut().lines_cleared = 9;
        fill_row_except(app.board_mut(), 19, &[3, 4, 5, 6]);
        app.set_piece(piece_at(TetrominoType::I, 3, 19));

        app.drop();
        assert_eq!(app.state().level, 2);
        assert_eq!(app.state().drop_interval, ms(450));
        let tail = &app.audio().cues[app.audio().cues.len() - 2..];
        assert_eq!(tail, &[Cue::LineClear, Cue::LevelUp]);
    }

    #[test]
    fn test_game_over_suspends_and_clears() {
        let mut app = create_test_app();
        app.state_mut().score = 120;
        force_game_over(&mut app);

        assert!(app.is_suspended());
        assert_eq!(app.phase(), Phase::NameEntry);
        assert!(board_is_empty(app.board()));
        assert_eq!(app.state().score, 120);
        let tail = &app.audio().cues[app.audio().cues.len() - 2..];
        assert_eq!(tail, &[Cue::MusicStop, Cue::GameOver]);
    }

    #[test]
    fn test_suspended_app_ignores_ticks() {
        let mut app = create_test_app();
        force_game_over(&mut app);
        let piece = app.piece().clone();
        let state = app.state().clone();
        let cues = app.audio().cues.len();
        let busy = InputState {
            left: KeyState::pressed(),
            right: KeyState::held(),
            down: KeyState::held(),
            rotate: KeyState::pressed(),
        };

        for _ in 0..50 {
            app.update(ms(1000), &busy);
        }
        assert_eq!(app.piece(), &piece);
        assert_eq!(app.state(), &state);
        assert_eq!(app.audio().cues.len(), cues);
        assert!(board_is_empty(app.board()));
    }

    #[test]
    fn test_submit_name_records_and_resumes() {
        let mut app = create_test_app();
        app.state_mut().score = 340;
        app.state_mut().level = 4;
        force_game_over(&mut app);

        assert!(app.submit_name("  ada  "));
        assert_eq!(app.phase(), Phase::Playing);
        assert_eq!(app.state().score, 0);
        assert_eq!(app.state().level, 1);
        assert_eq!(app.state().drop_interval, ms(500));
        assert!(!app.board().collides(app.piece()));
        assert_eq!(app.audio().cues.last(), Some(&Cue::MusicStart));

        let stored = app.store().load();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "ada");
        assert_eq!(stored[0].score, 340);
        assert_eq!(app.leaderboard(), stored.as_slice());
    }

    #[test]
    fn test_empty_name_becomes_default() {
        let mut app = create_test_app();
        force_game_over(&mut app);
        assert!(app.submit_name(""));
        assert_eq!(app.store().entries[0].name, "Anonymous");
    }

    #[test]
    fn test_submit_while_playing_is_ignored() {
        let mut app = create_test_app();
        assert!(!app.submit_name("nobody"));
        assert!(app.store().entries.is_empty());
        assert_eq!(app.phase(), Phase::Playing);
    }

    #[test]
    fn test_leaderboard_ordering_across_games() {
        let mut app = create_test_app();
        for (name, score) in [("a", 50), ("b", 200), ("c", 10), ("d", 300)] {
            app.state_mut().score = score;
            force_game_over(&mut app);
            assert!(app.submit_name(name));
        }
        let scores: Vec<u32> = app.leaderboard().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 50, 10]);
    }

    #[test]
    fn test_existing_entries_loaded_at_start() {
        use crate::game::Rules;
        use crate::leaderboard::MemoryStore;
        use crate::tests::test_utils::RecordingAudio;

        let entry = Entry {
            name: "old".to_string(),
            score: 99,
            timestamp: "2024-01-01 00:00:00".to_string(),
        };
        let store = MemoryStore {
            entries: vec![entry.clone()],
        };
        let app = crate::app::App::new(Rules::default(), RecordingAudio::default(), store);
        assert_eq!(app.leaderboard(), &[entry]);
    }

    #[test]
    fn test_render_draws_in_order() {
        let mut app = create_test_app();
        app.set_piece(piece_at(TetrominoType::S, 2, 3));
        app.set_next_shape(Shape::new(TetrominoType::J));
        app.state_mut().score = 70;

        let mut renderer = RecordingRenderer::default();
        app.render(&mut renderer);
        assert_eq!(
            renderer.calls,
            vec![
                DrawCall::Grid,
                DrawCall::Piece(TetrominoType::S, 2, 3),
                DrawCall::Score(70),
                DrawCall::Level(1),
                DrawCall::Next(TetrominoType::J),
            ]
        );
    }
}
