#![warn(clippy::all, clippy::pedantic)]

use std::io;
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::{
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use log::{debug, error, info};
use ratatui::{Terminal, prelude::*};

use stackfall::FrameClock;
use stackfall::app::App;
use stackfall::config::{self, Config};
use stackfall::input::KeyboardInput;
use stackfall::leaderboard::{FileStore, LeaderboardStore};
use stackfall::name_entry::NameEntry;
use stackfall::sound::{AudioCues, AudioState};
use stackfall::ui;

const LOG_PATH: &str = "stackfall.log";

fn main() -> Result<()> {
    // Create log file and redirect stderr to it
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(LOG_PATH)?;

    let stderr_fd = std::io::stderr().as_raw_fd();
    let log_file_fd = log_file.as_raw_fd();

    // Safety: both descriptors are open for the duration of the call
    unsafe {
        libc::dup2(log_file_fd, stderr_fd);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    info!("Starting Stackfall");

    let config = match config::loader::load_config_from_file() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            Config::default()
        }
    };

    let store = config
        .leaderboard
        .path
        .clone()
        .map_or_else(FileStore::default_location, |path| FileStore::new(path));
    info!("Leaderboard file: {}", store.path().display());

    let audio = AudioState::new(
        config.audio.music_enabled,
        config.audio.sound_enabled,
        config.audio.volume,
    );
    info!(
        "Audio thread running: {}, music: {}, sound: {}, volume: {:.2}",
        audio.is_audio_available(),
        audio.is_music_enabled(),
        audio.is_sound_enabled(),
        audio.volume()
    );

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    debug!("Keyboard release events supported: {enhanced_keys}");
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(config.rules(), audio, store);
    let res = run_app(&mut terminal, app, config.frame_interval());

    // Restore terminal
    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Game error: {err:?}");
    }

    Ok(())
}

fn run_app<B: Backend, A: AudioCues, S: LeaderboardStore>(
    terminal: &mut Terminal<B>,
    mut app: App<A, S>,
    frame_interval: Duration,
) -> Result<()> {
    let mut clock = FrameClock::new();
    let mut keyboard = KeyboardInput::new();
    let mut name_entry = NameEntry::new();

    // Flush anything typed before the game started
    while event::poll(Duration::ZERO)? {
        let _ = event::read()?;
    }

    loop {
        let frame_start = Instant::now();

        let delta = clock.tick_at(frame_start);
        let input = keyboard.poll(frame_start);
        app.update(delta, &input);
        terminal.draw(|f| ui::render(f, &app, &name_entry))?;

        // Spend the rest of the frame collecting input
        while let Some(timeout) = frame_interval.checked_sub(frame_start.elapsed()) {
            if !event::poll(timeout)? {
                break;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if is_quit(key, app.is_suspended()) {
                info!("Quit requested");
                return Ok(());
            }

            if app.is_suspended() {
                if key.kind != KeyEventKind::Release {
                    handle_name_key(&mut app, &mut name_entry, &mut keyboard, key);
                }
            } else {
                keyboard.handle_event(key, Instant::now());
            }
        }
    }
}

fn is_quit(key: KeyEvent, suspended: bool) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
        // While typing a name 'q' is just a letter
        KeyCode::Char('q') => !suspended,
        _ => false,
    }
}

fn handle_name_key<A: AudioCues, S: LeaderboardStore>(
    app: &mut App<A, S>,
    name_entry: &mut NameEntry,
    keyboard: &mut KeyboardInput,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Enter => {
            let name = name_entry.take();
            if app.submit_name(&name) {
                keyboard.release_all();
            }
        }
        KeyCode::Backspace => name_entry.backspace(),
        KeyCode::Char(c) => {
            name_entry.push(c);
        }
        _ => {}
    }
}
