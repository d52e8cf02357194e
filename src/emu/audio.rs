use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicI16, AtomicU32, Ordering},
    },
    time::Duration,
};

use rodio::{ChannelCount, SampleRate, Source};

use super::Config;

/// Volume change applied by one host volume up/down action.
pub const VOLUME_STEP: i16 = 500;

/// Audio parameters read by the audio device thread and written by the emulation/host thread.
#[derive(Debug)]
pub struct AudioSettings {
    /// Set from each timer tick: true while the sound timer is running.
    enabled: AtomicBool,
    volume: AtomicI16,
    frequency: AtomicU32,
    sample_rate: AtomicU32,
}

impl AudioSettings {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            volume: AtomicI16::new(config.volume.max(0)),
            frequency: AtomicU32::new(config.tone_frequency),
            sample_rate: AtomicU32::new(config.sample_rate),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn volume(&self) -> i16 {
        self.volume.load(Ordering::Relaxed)
    }

    /// Sets the amplitude, clamped to 0..=i16::MAX.
    pub fn set_volume(&self, volume: i16) {
        self.volume.store(volume.max(0), Ordering::Relaxed);
    }

    pub fn adjust_volume(&self, delta: i16) {
        self.set_volume(self.volume().saturating_add(delta));
    }

    pub fn frequency(&self) -> u32 {
        self.frequency.load(Ordering::Relaxed)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Relaxed)
    }
}

/// Pull-based mono square wave generator.
///
/// Emits `-volume` for the first half of each period and `+volume` for the second. The running
/// sample counter persists across calls so the phase is continuous, and it holds still while
/// audio is disabled.
pub struct ToneGenerator {
    settings: Arc<AudioSettings>,
    running_sample_index: u64,
}

impl ToneGenerator {
    pub fn new(settings: Arc<AudioSettings>) -> Self {
        Self {
            settings,
            running_sample_index: 0,
        }
    }

    /// Fills `buffer` with the next samples of the tone.
    pub fn fill(&mut self, buffer: &mut [i16]) {
        for sample in buffer {
            *sample = self.next_sample();
        }
    }

    pub fn next_sample(&mut self) -> i16 {
        if !self.settings.enabled() {
            return 0;
        }

        let frequency = self.settings.frequency();
        if frequency == 0 {
            return 0;
        }
        let half_period = u64::from(self.settings.sample_rate() / frequency / 2);
        if half_period == 0 {
            return 0;
        }

        let volume = self.settings.volume();
        let index = self.running_sample_index;
        self.running_sample_index += 1;

        if (index / half_period) % 2 == 1 {
            volume
        } else {
            -volume
        }
    }
}

impl Iterator for ToneGenerator {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        Some(f32::from(self.next_sample()) / f32::from(i16::MAX))
    }
}

impl Source for ToneGenerator {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> ChannelCount {
        1
    }

    fn sample_rate(&self) -> SampleRate {
        self.settings.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(sample_rate: u32, frequency: u32, volume: i16) -> Arc<AudioSettings> {
        let config = Config {
            sample_rate,
            tone_frequency: frequency,
            volume,
            ..Config::default()
        };
        let settings = Arc::new(AudioSettings::new(&config));
        settings.set_enabled(true);
        settings
    }

    #[test]
    fn square_wave_alternates_every_half_period() {
        // half period = 8 / 2 / 2 = 2 samples
        let mut tone = ToneGenerator::new(settings(8, 2, 100));
        let mut buf = [0; 8];
        tone.fill(&mut buf);
        assert_eq!(buf, [-100, -100, 100, 100, -100, -100, 100, 100]);
    }

    #[test]
    fn default_tone_period_is_one_hundred_samples() {
        let mut tone = ToneGenerator::new(settings(44100, 440, 3000));
        let mut buf = [0; 200];
        tone.fill(&mut buf);
        assert!(buf[..50].iter().all(|&s| s == -3000));
        assert!(buf[50..100].iter().all(|&s| s == 3000));
        assert_eq!(buf[100], -3000);
    }

    #[test]
    fn phase_is_continuous_across_calls() {
        let mut whole = ToneGenerator::new(settings(8, 2, 5));
        let mut split = ToneGenerator::new(settings(8, 2, 5));

        let mut expected = [0; 7];
        whole.fill(&mut expected);

        let mut first = [0; 3];
        let mut second = [0; 4];
        split.fill(&mut first);
        split.fill(&mut second);

        assert_eq!(&expected[..3], &first);
        assert_eq!(&expected[3..], &second);
    }

    #[test]
    fn disabled_audio_is_silent_and_holds_phase() {
        let settings = settings(8, 2, 10);
        let mut tone = ToneGenerator::new(settings.clone());
        let mut buf = [0; 1];
        tone.fill(&mut buf);

        settings.set_enabled(false);
        let mut silent = [7; 4];
        tone.fill(&mut silent);
        assert_eq!(silent, [0; 4]);

        settings.set_enabled(true);
        let mut resumed = [0; 3];
        tone.fill(&mut resumed);
        assert_eq!(resumed, [-10, 10, 10]);
    }

    #[test]
    fn zero_frequency_is_silence() {
        let mut tone = ToneGenerator::new(settings(44100, 0, 1000));
        let mut buf = [1; 16];
        tone.fill(&mut buf);
        assert_eq!(buf, [0; 16]);

        let mut tone = ToneGenerator::new(settings(100, 440, 1000));
        tone.fill(&mut buf);
        assert_eq!(buf, [0; 16]);
    }

    #[test]
    fn volume_is_clamped_to_non_negative_range() {
        let settings = settings(8, 2, 0);
        settings.adjust_volume(-VOLUME_STEP);
        assert_eq!(settings.volume(), 0);
        settings.set_volume(i16::MAX);
        settings.adjust_volume(VOLUME_STEP);
        assert_eq!(settings.volume(), i16::MAX);
    }

    #[test]
    fn iterator_yields_normalized_samples() {
        let mut tone = ToneGenerator::new(settings(8, 2, i16::MAX));
        assert_eq!(tone.next(), Some(-1.0));
        assert_eq!(tone.channels(), 1);
        assert_eq!(tone.sample_rate(), 8);
    }
}
