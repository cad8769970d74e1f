use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use crossbeam_channel::{Receiver, Sender, bounded};
use fundsp::hacker32::*;
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Cue points the loop controller signals. Implementations must not block.
pub trait AudioCues {
    fn play_rotate(&mut self);
    fn play_line_clear(&mut self);
    fn play_level_up(&mut self);
    fn play_game_over(&mut self);
    fn start_ambient_music(&mut self);
    fn stop_ambient_music(&mut self);
}

// Sound effects types that can be played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Rotate,
    LineClear,
    LevelUp,
    GameOver,
}

impl SoundEffect {
    /// Seconds after which a voice is dropped from the mix.
    #[must_use]
    pub fn duration(self) -> f64 {
        match self {
            SoundEffect::Rotate => 0.1,
            SoundEffect::LineClear => 0.5,
            SoundEffect::LevelUp => 1.0,
            SoundEffect::GameOver => 2.0,
        }
    }
}

// Command to control the audio thread
enum AudioCommand {
    PlaySound(SoundEffect),
    PlayMusic(bool), // true to start, false to stop
}

pub struct AudioState {
    sender: Option<Sender<AudioCommand>>,
    available: Arc<AtomicBool>,
    music_enabled: bool,
    sound_enabled: bool,
    volume: f32,
}

impl AudioState {
    /// Starts the audio thread. A missing output device is logged by the
    /// thread and the game carries on silently.
    #[must_use]
    pub fn new(music_enabled: bool, sound_enabled: bool, volume: f32) -> Self {
        let (sender, receiver) = bounded(64);
        let available = Arc::new(AtomicBool::new(true));
        let thread_available = Arc::clone(&available);
        let volume = volume.clamp(0.0, 1.0);

        let spawned = thread::Builder::new()
            .name("stackfall-audio".into())
            .spawn(move || {
                if let Err(e) = run_audio_thread(&receiver, volume) {
                    error!("Audio thread error: {e}");
                    thread_available.store(false, Ordering::Relaxed);
                }
            });

        let sender = match spawned {
            Ok(_) => Some(sender),
            Err(e) => {
                error!("Could not start audio thread: {e}");
                available.store(false, Ordering::Relaxed);
                None
            }
        };

        Self {
            sender,
            available,
            music_enabled,
            sound_enabled,
            volume,
        }
    }

    /// An audio state that accepts cues and discards them.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            sender: None,
            available: Arc::new(AtomicBool::new(false)),
            music_enabled: false,
            sound_enabled: false,
            volume: 0.0,
        }
    }

    pub fn is_audio_available(&self) -> bool {
        self.sender.is_some() && self.available.load(Ordering::Relaxed)
    }

    pub fn play_sound(&self, effect: SoundEffect) -> bool {
        if self.sound_enabled {
            self.send(AudioCommand::PlaySound(effect));
            true
        } else {
            false
        }
    }

    pub fn is_music_enabled(&self) -> bool {
        self.music_enabled
    }

    pub fn is_sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Output volume, fixed for the lifetime of the audio thread.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn send(&self, command: AudioCommand) {
        if let Some(sender) = &self.sender {
            // A full queue drops the cue rather than stalling the frame
            if sender.try_send(command).is_err() {
                debug!("Audio command dropped");
            }
        }
    }
}

impl AudioCues for AudioState {
    fn play_rotate(&mut self) {
        self.play_sound(SoundEffect::Rotate);
    }

    fn play_line_clear(&mut self) {
        self.play_sound(SoundEffect::LineClear);
    }

    fn play_level_up(&mut self) {
        self.play_sound(SoundEffect::LevelUp);
    }

    fn play_game_over(&mut self) {
        self.play_sound(SoundEffect::GameOver);
    }

    fn start_ambient_music(&mut self) {
        if self.music_enabled {
            self.send(AudioCommand::PlayMusic(true));
        }
    }

    fn stop_ambient_music(&mut self) {
        self.send(AudioCommand::PlayMusic(false));
    }
}

fn run_audio_thread(receiver: &Receiver<AudioCommand>, volume: f32) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No audio output device found"))?;
    let config = device.default_output_config()?;

    // Forwarded to the stream callback, which must never block
    let (sound_sender, sound_receiver) = bounded::<SoundEffect>(64);
    let (music_sender, music_receiver) = bounded::<bool>(16);

    let _stream = match config.sample_format() {
        cpal::SampleFormat::F32 => run_audio_stream::<f32>(
            &device,
            &config.into(),
            sound_receiver,
            music_receiver,
            volume,
        )?,
        cpal::SampleFormat::I16 => run_audio_stream::<i16>(
            &device,
            &config.into(),
            sound_receiver,
            music_receiver,
            volume,
        )?,
        cpal::SampleFormat::U16 => run_audio_stream::<u16>(
            &device,
            &config.into(),
            sound_receiver,
            music_receiver,
            volume,
        )?,
        other => return Err(anyhow::anyhow!("Unsupported audio format {other:?}")),
    };

    // Runs until the game drops its sender
    while let Ok(command) = receiver.recv() {
        match command {
            AudioCommand::PlaySound(effect) => {
                if sound_sender.try_send(effect).is_err() {
                    warn!("Sound effect queue full, dropping {effect:?}");
                }
            }
            AudioCommand::PlayMusic(enabled) => {
                let _ = music_sender.try_send(enabled);
            }
        }
    }

    Ok(())
}

struct Voice {
    effect: SoundEffect,
    unit: Box<dyn AudioUnit>,
    elapsed: f64,
}

fn run_audio_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sound_receiver: Receiver<SoundEffect>,
    music_receiver: Receiver<bool>,
    volume: f32,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let sample_rate = f64::from(config.sample_rate.0);
    let channels = config.channels as usize;

    let mut music_enabled = false;
    let mut voices: Vec<Voice> = Vec::new();
    let mut music = create_background_music();
    music.set_sample_rate(sample_rate);

    let mut next_value = move || {
        while let Ok(enabled) = music_receiver.try_recv() {
            if enabled && !music_enabled {
                music.reset();
            }
            music_enabled = enabled;
        }

        while let Ok(effect) = sound_receiver.try_recv() {
            let mut unit = create_sound_effect(effect);
            unit.set_sample_rate(sample_rate);
            voices.push(Voice {
                effect,
                unit,
                elapsed: 0.0,
            });
        }

        let mut sample = 0.0f32;
        for voice in &mut voices {
            sample += voice.unit.get_mono();
            voice.elapsed += 1.0 / sample_rate;
        }
        voices.retain(|voice| voice.elapsed < voice.effect.duration());

        if music_enabled {
            sample += music.get_mono();
        }

        (sample * volume).clamp(-1.0, 1.0)
    };

    let err_fn = |err| error!("Error in audio stream: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(next_value());
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok(stream)
}

// Short decaying blip
fn create_rotate_click() -> Box<dyn AudioUnit> {
    Box::new(sine_hz(660.0) * envelope(|t| (-t * 40.0).exp()) * 0.25)
}

// Two-tone chime, the upper note entering halfway through
fn create_line_clear() -> Box<dyn AudioUnit> {
    let pitch = lfo(|t| if t < 0.12 { 523.25 } else { 783.99 });
    let node = (pitch >> sine()) * envelope(|t| (-t * 6.0).exp()) * 0.35;
    Box::new(node)
}

// Major arpeggio, one note every 0.15s
fn create_level_up() -> Box<dyn AudioUnit> {
    let pitch = lfo(|t| {
        let notes = [523.25, 659.25, 783.99, 1046.5];
        notes[Ord::min((t / 0.15) as usize, notes.len() - 1)]
    });
    let gate = envelope(|t| if t < 0.9 { 1.0 - t } else { 0.0 });
    Box::new((pitch >> sine()) * gate * 0.35)
}

// Three falling notes that fade out
fn create_game_over() -> Box<dyn AudioUnit> {
    let pitch = lfo(|t| {
        let notes = [392.0, 311.13, 261.63];
        notes[Ord::min((t / 0.5) as usize, notes.len() - 1)]
    });
    let fade = envelope(|t| (1.0 - t / 2.0).max(0.0));
    Box::new((pitch >> sine()) * fade * 0.4)
}

fn create_sound_effect(effect: SoundEffect) -> Box<dyn AudioUnit> {
    match effect {
        SoundEffect::Rotate => create_rotate_click(),
        SoundEffect::LineClear => create_line_clear(),
        SoundEffect::LevelUp => create_level_up(),
        SoundEffect::GameOver => create_game_over(),
    }
}

// Slow A minor arpeggio over a low drone
fn create_background_music() -> Box<dyn AudioUnit> {
    let drone = sine_hz(55.0) * 0.06 + sine_hz(110.0) * 0.04;

    let arpeggio = lfo(|t| {
        let notes = [220.0, 261.63, 329.63, 440.0, 329.63, 261.63];
        notes[(t * 2.0) as usize % notes.len()]
    }) >> sine();
    // Pluck each note by restarting the decay on every half second
    let pluck = envelope(|t| (-(t * 2.0).fract() * 4.0).exp());

    Box::new((drone + arpeggio * pluck * 0.08) * 0.7)
}
