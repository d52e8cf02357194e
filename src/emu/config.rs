use super::Resolution;

/// Rate of the delay and sound timers, and of presented frames.
pub const TIMER_HZ: u32 = 60;

/// Emulator options. Every value is passed through as-is; the interpreter only guards against
/// values that would otherwise panic (zero frequency, zero instruction rate).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Resolution the machine starts in and returns to on reset.
    pub resolution: Resolution,
    /// Foreground colour as 0xRRGGBBAA.
    pub fg_color: u32,
    /// Background colour as 0xRRGGBBAA.
    pub bg_color: u32,
    /// Window pixels per CHIP-8 pixel in the starting resolution.
    pub scale_factor: u32,
    pub pixel_outlines: bool,
    pub instructions_per_second: u32,
    pub tone_frequency: u32,
    pub sample_rate: u32,
    pub volume: i16,
    /// Fraction of the remaining distance to the target colour covered each frame.
    pub color_lerp_rate: f32,
}

impl Config {
    /// Instructions executed per 60 Hz frame.
    pub fn instructions_per_frame(&self) -> u32 {
        self.instructions_per_second / TIMER_HZ
    }

    /// Initial window size in logical pixels.
    pub fn window_size(&self) -> (u32, u32) {
        (
            self.resolution.width() as u32 * self.scale_factor,
            self.resolution.height() as u32 * self.scale_factor,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution: Resolution::Low,
            fg_color: 0xFFFFFFFF,
            bg_color: 0x00000000,
            scale_factor: 20,
            pixel_outlines: false,
            instructions_per_second: 700,
            tone_frequency: 440,
            sample_rate: 44100,
            volume: 3000,
            color_lerp_rate: 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runs_eleven_instructions_per_frame() {
        assert_eq!(Config::default().instructions_per_frame(), 11);
    }

    #[test]
    fn window_size_follows_starting_resolution() {
        let low = Config {
            scale_factor: 10,
            ..Config::default()
        };
        assert_eq!(low.window_size(), (640, 320));

        let high = Config {
            resolution: Resolution::High,
            ..low
        };
        assert_eq!(high.window_size(), (1280, 640));
    }
}
