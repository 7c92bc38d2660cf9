use sdl2::audio::{AudioCallback, AudioDevice, AudioSpec};

// tone pitch, in Hz
const TONE_FREQ: f32 = 441.0;

/// Anything that can play the chip-8 tone.
pub trait Audio {
    /// Start (`true`) or stop (`false`) the tone.
    fn set_tone(&mut self, on: bool);
}

/// A simple square wave.
/// Adapted from sdl2::audio sample code.
///
/// A good tool for testing tone changes is https://onlinetonegenerator.com/?waveform=square
pub struct Beep {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl Beep {
    fn new(sample_rate: i32) -> Self {
        Beep {
            phase_inc: TONE_FREQ / sample_rate as f32,
            phase: 0.0,
            volume: 0.10,
        }
    }
}

impl From<AudioSpec> for Beep {
    fn from(spec: AudioSpec) -> Self {
        Beep::new(spec.freq)
    }
}

impl AudioCallback for Beep {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        // Generate a square wave
        for x in out.iter_mut() {
            *x = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// Something that can be started and stopped, like an SDL playback device.
pub trait Playback {
    fn resume(&self);
    fn pause(&self);
}

impl Playback for AudioDevice<Beep> {
    fn resume(&self) {
        AudioDevice::<Beep>::resume(self)
    }

    fn pause(&self) {
        AudioDevice::<Beep>::pause(self)
    }
}

/// Playback device playing a `Beep`.
pub struct Speaker<D: Playback = AudioDevice<Beep>> {
    device: D,
    on: bool,
}

impl<D: Playback> Speaker<D> {
    /// Wrap a device; it is paused until the first `set_tone(true)`.
    pub fn new(device: D) -> Self {
        device.pause();
        Speaker { device, on: false }
    }
}

impl<D: Playback> Audio for Speaker<D> {
    fn set_tone(&mut self, on: bool) {
        if on == self.on {
            return;
        }

        if on {
            self.device.resume();
        } else {
            self.device.pause();
        }
        self.on = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_square_wave() {
        // a full period every 4 samples
        let mut beep = Beep::new(44100);
        beep.phase_inc = 0.25;

        let mut out = [0.0f32; 8];
        beep.callback(&mut out);

        let high = beep.volume;
        let low = -beep.volume;
        assert_eq!(out, [high, high, high, low, high, high, high, low]);
    }

    #[test]
    fn test_phase_increment_follows_sample_rate() {
        let beep = Beep::new(44100);
        assert!((beep.phase_inc - 441.0 / 44100.0).abs() < f32::EPSILON);
    }

    /// Records every call made to the device
    #[derive(Default)]
    struct Recorder(RefCell<Vec<&'static str>>);

    impl Playback for Recorder {
        fn resume(&self) {
            self.0.borrow_mut().push("resume");
        }

        fn pause(&self) {
            self.0.borrow_mut().push("pause");
        }
    }

    #[test]
    fn test_speaker_starts_paused() {
        let speaker = Speaker::new(Recorder::default());
        assert_eq!(*speaker.device.0.borrow(), vec!["pause"]);
    }

    #[test]
    fn test_speaker_ignores_repeated_values() {
        let mut speaker = Speaker::new(Recorder::default());

        speaker.set_tone(false);
        speaker.set_tone(true);
        speaker.set_tone(true);
        speaker.set_tone(true);
        speaker.set_tone(false);
        speaker.set_tone(false);
        speaker.set_tone(true);

        assert_eq!(
            *speaker.device.0.borrow(),
            vec!["pause", "resume", "pause", "resume"]
        );
    }
}
