use std::time::{Duration, Instant};

use anyhow::Context;
use log::info;
use sdl2::{audio::AudioSpecDesired, event::Event, pixels::Color, rect::Rect};
use thiserror::Error;

use super::{
    beep::{Audio, Beep, Speaker},
    clock::Clock,
    display::{DISPLAY_HEIGHT, DISPLAY_WIDTH},
    emulator::Emulator,
    input::KeyState,
    keymap::{Action, Keymap},
};

#[derive(Error, Debug)]
enum AppError {
    #[error("SDL error: {0}")]
    Sdl(String),
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Sdl(s)
    }
}

/// Run loop settings
pub struct Settings {
    // instructions per second
    pub clock_speed: u32,

    // window pixels per chip-8 pixel
    pub scale: u32,

    // window title
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppState {
    Running,
    Paused,
    Quit,
}

/// Apply a keymap action and return the new application state.
///
/// Keypad presses are dropped unless running, so a paused program can't
/// leave an FX0A wait.
fn apply_action<A: Audio + ?Sized>(
    state: AppState,
    action: Action,
    emu: &mut Emulator,
    keys: &mut KeyState,
    audio: &mut A,
) -> AppState {
    match (action, state) {
        (Action::KeyDown(key), AppState::Running) => {
            keys.press(key);
            emu.key_down(key);
            state
        }
        (Action::KeyDown(_), _) => state,
        (Action::KeyUp(key), _) => {
            keys.release(key);
            state
        }
        (Action::TogglePause, AppState::Running) => {
            info!("paused");
            audio.set_tone(false);
            keys.reset();
            AppState::Paused
        }
        (Action::TogglePause, AppState::Paused) => {
            info!("resumed");
            AppState::Running
        }
        (Action::TogglePause, AppState::Quit) => AppState::Quit,
        (Action::Quit, _) => AppState::Quit,
    }
}

/// Main application loop
pub fn run(mut emu: Emulator, settings: Settings) -> Result<(), anyhow::Error> {
    // initialize SDL context and subsystems
    let sdl_context = sdl2::init()
        .map_err(AppError::from)
        .context("failed to initialize SDL context")?;
    let sdl_video = sdl_context
        .video()
        .map_err(AppError::from)
        .context("failed to initialize video subsystem")?;
    let sdl_audio = sdl_context
        .audio()
        .map_err(AppError::from)
        .context("failed to initialize audio subsystem")?;

    let zoom = settings.scale.max(1);

    // build the window
    let window = sdl_video
        .window(
            &settings.title,
            DISPLAY_WIDTH as u32 * zoom,
            DISPLAY_HEIGHT as u32 * zoom,
        )
        .position_centered()
        .build()
        .context("error creating window")?;

    // get the drawing canvas
    let mut canvas = window
        .into_canvas()
        .build()
        .context("error creating window canvas")?;

    // get the event pump
    let mut event_pump = sdl_context
        .event_pump()
        .map_err(AppError::from)
        .context("error obtaining the event pump")?;

    // desired audio spec
    let desired_spec = AudioSpecDesired {
        freq: Some(44100),
        channels: Some(1),
        samples: None,
    };

    // get sound device
    let mut speaker = sdl_audio
        .open_playback(None, &desired_spec, Beep::from)
        .map(Speaker::new)
        .map_err(AppError::from)
        .context("error opening audio device")?;

    let mut state = AppState::Running;
    let keymap = Keymap::Chip8;
    let mut keys = KeyState::new();
    let mut clock = Clock::new(settings.clock_speed);
    let mut previous = Instant::now();

    info!(
        "running at {} instructions per second",
        settings.clock_speed
    );

    loop {
        let now = Instant::now();
        let elapsed = now.duration_since(previous).as_micros();
        previous = now;

        // process input events
        for event in event_pump.poll_iter() {
            match keymap.translate_action(&event) {
                Some(action) => {
                    state = apply_action(state, action, &mut emu, &mut keys, &mut speaker)
                }
                None => {
                    if let Event::Quit { .. } = event {
                        state = AppState::Quit
                    }
                }
            }
        }

        match state {
            // Only update the simulation when it is running
            AppState::Running => {
                let due = clock.advance(elapsed);

                // run cpu
                for _ in 0..due.cycles {
                    emu.step(&keys)?;
                }

                // update timers
                for _ in 0..due.timer_ticks {
                    emu.tick_timers(&mut speaker);
                }
            }
            // time spent paused is simply dropped
            AppState::Paused => {}
            // stop emulating
            AppState::Quit => break,
        }

        // draw a frame
        // even while paused, so the window keeps repainting
        canvas.set_draw_color(Color::RGB(0x00, 0x00, 0x00));
        canvas.clear();

        canvas.set_draw_color(Color::RGB(0xFF, 0xFF, 0xFF));
        let display = emu.display();
        for x in 0..DISPLAY_WIDTH {
            for y in 0..DISPLAY_HEIGHT {
                if display.get_pixel(x, y) {
                    let rect = Rect::new(
                        x as i32 * zoom as i32,
                        y as i32 * zoom as i32,
                        zoom,
                        zoom,
                    );
                    canvas
                        .fill_rect(rect)
                        .map_err(AppError::from)
                        .context("error drawing to canvas")?;
                }
            }
        }
        canvas.present();

        // don't spin the host cpu, the clock makes up for the lost time
        std::thread::sleep(Duration::from_millis(1));
    }

    info!("quitting");
    speaker.set_tone(false);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        emulator::FONTSET,
        input::{Key, Keypad},
    };

    #[derive(Default)]
    struct ToneLog(Vec<bool>);

    impl Audio for ToneLog {
        fn set_tone(&mut self, on: bool) {
            self.0.push(on);
        }
    }

    fn waiting_emulator() -> Emulator {
        let rom: [u8; 2] = [
            0xF0, 0x0A, // 0x200: Set V0 = <pressed key> (wait)
        ];

        let mut emu = Emulator::new();
        emu.load_fontset(&FONTSET);
        emu.load_program(&rom).unwrap();
        emu.step(&KeyState::new()).unwrap();
        assert!(emu.is_awaiting_key());
        emu
    }

    #[test]
    fn test_key_down_while_running() {
        let mut emu = waiting_emulator();
        let mut keys = KeyState::new();
        let mut tone = ToneLog::default();
        let key = Key::from_nibble(0x5);

        let state = apply_action(AppState::Running, Action::KeyDown(key), &mut emu, &mut keys, &mut tone);
        assert_eq!(state, AppState::Running);
        assert!(keys.is_key_down(key));
        assert!(!emu.is_awaiting_key());
    }

    #[test]
    fn test_key_down_ignored_while_paused() {
        let mut emu = waiting_emulator();
        let mut keys = KeyState::new();
        let mut tone = ToneLog::default();
        let key = Key::from_nibble(0x5);

        let state = apply_action(
            AppState::Running,
            Action::TogglePause,
            &mut emu,
            &mut keys,
            &mut tone,
        );
        assert_eq!(state, AppState::Paused);
        assert_eq!(tone.0, vec![false]);

        let state = apply_action(state, Action::KeyDown(key), &mut emu, &mut keys, &mut tone);
        assert_eq!(state, AppState::Paused);
        assert!(!keys.is_key_down(key));
        assert!(emu.is_awaiting_key());

        let state = apply_action(state, Action::TogglePause, &mut emu, &mut keys, &mut tone);
        assert_eq!(state, AppState::Running);
        assert!(emu.is_awaiting_key());
    }

    #[test]
    fn test_pause_releases_keys() {
        let mut emu = Emulator::new();
        let mut keys = KeyState::new();
        let mut tone = ToneLog::default();
        let key = Key::from_nibble(0xA);

        apply_action(AppState::Running, Action::KeyDown(key), &mut emu, &mut keys, &mut tone);
        assert!(keys.is_key_down(key));

        apply_action(AppState::Running, Action::TogglePause, &mut emu, &mut keys, &mut tone);
        assert!(!keys.is_key_down(key));
    }

    #[test]
    fn test_quit() {
        let mut emu = Emulator::new();
        let mut keys = KeyState::new();
        let mut tone = ToneLog::default();

        for state in [AppState::Running, AppState::Paused] {
            assert_eq!(
                apply_action(state, Action::Quit, &mut emu, &mut keys, &mut tone),
                AppState::Quit
            );
        }
    }
}
