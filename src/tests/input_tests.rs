#[cfg(test)]
mod tests {
    use crate::input::{
        Control, FALLBACK_HOLD_TIMEOUT, FALLBACK_REPEAT_WINDOW, InputState, KeyState,
        KeyboardInput, RepeatTimer, control_for,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use std::time::{Duration, Instant};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    /// What a terminal without release reporting sends while `code` is held
    /// for `hold`: the press, then OS repeats after a 500ms delay every 33ms,
    /// every one of them reported as a press.
    fn auto_repeat_presses(code: KeyCode, start: Instant, hold: Duration) -> Vec<(Instant, KeyEvent)> {
        let mut events = vec![(start, key(code, KeyEventKind::Press))];
        let mut offset = Duration::from_millis(500);
        while offset <= hold {
            events.push((start + offset, key(code, KeyEventKind::Press)));
            offset += Duration::from_millis(33);
        }
        events
    }

    /// Feeds the events into a tracker and samples it every 16ms until `end`.
    fn replay(
        keyboard: &mut KeyboardInput,
        events: &[(Instant, KeyEvent)],
        start: Instant,
        end: Duration,
    ) -> Vec<InputState> {
        let mut samples = Vec::new();
        let mut pending = events.iter().peekable();
        let mut frame = Duration::ZERO;
        while frame <= end {
            let now = start + frame;
            while let Some((at, event)) = pending.next_if(|(at, _)| *at <= now) {
                keyboard.handle_event(*event, *at);
            }
            samples.push(keyboard.poll(now));
            frame += Duration::from_millis(16);
        }
        samples
    }

    #[test]
    fn test_bindings() {
        assert_eq!(control_for(KeyCode::Left), Some(Control::Left));
        assert_eq!(control_for(KeyCode::Char('a')), Some(Control::Left));
        assert_eq!(control_for(KeyCode::Right), Some(Control::Right));
        assert_eq!(control_for(KeyCode::Char('d')), Some(Control::Right));
        assert_eq!(control_for(KeyCode::Down), Some(Control::Down));
        assert_eq!(control_for(KeyCode::Char('s')), Some(Control::Down));
        assert_eq!(control_for(KeyCode::Up), Some(Control::Rotate));
        assert_eq!(control_for(KeyCode::Char('w')), Some(Control::Rotate));
        assert_eq!(control_for(KeyCode::Char(' ')), Some(Control::Rotate));
        assert_eq!(control_for(KeyCode::Char('q')), None);
        assert_eq!(control_for(KeyCode::Enter), None);
    }

    #[test]
    fn test_press_is_edge_once() {
        let start = Instant::now();
        let mut keyboard = KeyboardInput::new();
        assert!(keyboard.handle_event(key(KeyCode::Left, KeyEventKind::Press), start));

        let first = keyboard.poll(start);
        assert_eq!(first.left, KeyState::pressed());
        assert_eq!(first.right, KeyState::default());

        let second = keyboard.poll(start + Duration::from_millis(16));
        assert_eq!(second.left, KeyState::held());
    }

    #[test]
    fn test_hold_lapses_without_repeats() {
        let start = Instant::now();
        let mut keyboard = KeyboardInput::new();
        keyboard.handle_event(key(KeyCode::Down, KeyEventKind::Press), start);

        let later = start + FALLBACK_HOLD_TIMEOUT + Duration::from_millis(1);
        assert!(!keyboard.poll(later).down.held);
    }

    #[test]
    fn test_repeats_keep_hold_alive() {
        let start = Instant::now();
        let mut keyboard = KeyboardInput::new();
        keyboard.handle_event(key(KeyCode::Down, KeyEventKind::Press), start);
        let mut now = start;
        for _ in 0..5 {
            now += Duration::from_millis(60);
            keyboard.handle_event(key(KeyCode::Down, KeyEventKind::Repeat), now);
            let state = keyboard.poll(now);
            assert!(state.down.held);
        }
    }

    #[test]
    fn test_release_events_end_hold() {
        let start = Instant::now();
        let mut keyboard = KeyboardInput::new();
        keyboard.handle_event(key(KeyCode::Right, KeyEventKind::Press), start);
        keyboard.handle_event(key(KeyCode::Right, KeyEventKind::Release), start);
        assert!(!keyboard.poll(start).right.held);

        // Once releases are reported a hold no longer times out
        keyboard.handle_event(key(KeyCode::Right, KeyEventKind::Press), start);
        let much_later = start + Duration::from_secs(2);
        assert_eq!(keyboard.poll(much_later).right, KeyState::pressed());
        assert_eq!(keyboard.poll(much_later).right, KeyState::held());
    }

    #[test]
    fn test_non_controls_ignored() {
        let mut keyboard = KeyboardInput::new();
        assert!(!keyboard.handle_event(key(KeyCode::Char('x'), KeyEventKind::Press), Instant::now()));
    }

    #[test]
    fn test_release_all() {
        let now = Instant::now();
        let mut keyboard = KeyboardInput::new();
        keyboard.handle_event(key(KeyCode::Up, KeyEventKind::Press), now);
        keyboard.handle_event(key(KeyCode::Left, KeyEventKind::Press), now);
        keyboard.release_all();
        let state = keyboard.poll(now);
        assert_eq!(state.rotate, KeyState::default());
        assert_eq!(state.left, KeyState::default());
    }

    #[test]
    fn test_repeat_timer() {
        let interval = Duration::from_millis(150);
        let mut timer = RepeatTimer::new(interval);
        assert_eq!(timer.elapsed(), interval);

        assert!(timer.update(KeyState::pressed(), Duration::from_millis(16)));
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert!(!timer.update(KeyState::held(), Duration::from_millis(150)));
        assert!(timer.update(KeyState::held(), Duration::from_millis(1)));
        assert_eq!(timer.elapsed(), Duration::ZERO);

        assert!(!timer.update(KeyState::default(), Duration::from_millis(16)));
        assert_eq!(timer.elapsed(), interval);
    }

    #[test]
    fn test_auto_repeat_after_delay_is_not_a_new_press() {
        let start = Instant::now();
        let mut keyboard = KeyboardInput::new();
        let events = auto_repeat_presses(KeyCode::Char(' '), start, Duration::from_millis(1500));
        let samples = replay(&mut keyboard, &events, start, Duration::from_millis(1500));

        let edges = samples.iter().filter(|s| s.rotate.just_pressed).count();
        assert_eq!(edges, 1);
        assert!(samples[0].rotate.just_pressed);
    }

    #[test]
    fn test_auto_repeat_keeps_down_held_once_repeating() {
        let start = Instant::now();
        let mut keyboard = KeyboardInput::new();
        let events = auto_repeat_presses(KeyCode::Down, start, Duration::from_millis(1200));
        let samples = replay(&mut keyboard, &events, start, Duration::from_millis(1200));

        // Frames from the first repeat (t=512ms) onwards
        assert!(samples[32..].iter().all(|s| s.down.held && !s.down.just_pressed));
    }

    #[test]
    fn test_press_after_repeat_window_is_new() {
        let start = Instant::now();
        let mut keyboard = KeyboardInput::new();
        keyboard.handle_event(key(KeyCode::Up, KeyEventKind::Press), start);
        assert!(keyboard.poll(start).rotate.just_pressed);

        let later = start + FALLBACK_REPEAT_WINDOW + Duration::from_millis(1);
        keyboard.handle_event(key(KeyCode::Up, KeyEventKind::Press), later);
        assert_eq!(keyboard.poll(later).rotate, KeyState::pressed());
    }
}
