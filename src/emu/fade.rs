use super::{Config, Display};

pub const MIN_LERP_RATE: f32 = 0.1;
pub const MAX_LERP_RATE: f32 = 1.0;

/// Interpolates each RGBA channel of two 0xRRGGBBAA colours.
///
/// Each channel moves at least one step toward `end` while it differs, so repeated
/// calls always converge.
pub fn color_lerp(start: u32, end: u32, t: f32) -> u32 {
    let start_rgba = start.to_be_bytes();
    let end_rgba = end.to_be_bytes();
    let mut out = [0u8; 4];

    for ((out, &s), &e) in out.iter_mut().zip(&start_rgba).zip(&end_rgba) {
        let lerped = ((1.0 - t) * s as f32 + t * e as f32).round() as u8;
        *out = if lerped == s && s != e {
            if e > s { s + 1 } else { s - 1 }
        } else {
            lerped
        };
    }

    u32::from_be_bytes(out)
}

/// Per-pixel presentation colours that ease toward the foreground or background colour.
///
/// Purely cosmetic, never read by the interpreter.
pub struct PixelFade {
    colors: Vec<u32>,
    fg_color: u32,
    bg_color: u32,
    lerp_rate: f32,
}

impl PixelFade {
    pub fn new(config: &Config) -> Self {
        Self {
            colors: vec![config.bg_color; config.resolution.pixel_count()],
            fg_color: config.fg_color,
            bg_color: config.bg_color,
            lerp_rate: config.color_lerp_rate,
        }
    }

    /// Advances every colour one frame toward its pixel's target and returns the result.
    pub fn update(&mut self, display: &Display) -> &[u32] {
        let pixels = display.pixels();
        if self.colors.len() != pixels.len() {
            self.colors.clear();
            self.colors.resize(pixels.len(), self.bg_color);
        }

        for (color, &on) in self.colors.iter_mut().zip(pixels) {
            let target = if on { self.fg_color } else { self.bg_color };
            if *color != target {
                *color = color_lerp(*color, target, self.lerp_rate);
            }
        }

        &self.colors
    }

    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    pub fn bg_color(&self) -> u32 {
        self.bg_color
    }

    pub fn lerp_rate(&self) -> f32 {
        self.lerp_rate
    }

    pub fn adjust_lerp_rate(&mut self, delta: f32) {
        self.lerp_rate = (self.lerp_rate + delta).clamp(MIN_LERP_RATE, MAX_LERP_RATE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emu::Resolution;

    #[test]
    fn lerp_endpoints() {
        assert_eq!(color_lerp(0x00000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(color_lerp(0x10203040, 0xFFFFFFFF, 0.0), 0x11213141);
    }

    #[test]
    fn lerp_channels_independently() {
        assert_eq!(color_lerp(0x00FF0000, 0xFF00FF00, 0.5), 0x80808000);
    }

    #[test]
    fn fade_converges_to_foreground_and_back() {
        let config = Config {
            color_lerp_rate: 0.1,
            ..Config::default()
        };
        let mut fade = PixelFade::new(&config);
        let mut display = Display::new(Resolution::Low);
        display.flip_pixel(0, 0);

        let first = fade.update(&display)[0];
        assert_ne!(first, config.bg_color);
        assert_ne!(first, config.fg_color);

        for _ in 0..300 {
            fade.update(&display);
        }
        assert_eq!(fade.colors()[0], config.fg_color);
        assert_eq!(fade.colors()[1], config.bg_color);

        display.flip_pixel(0, 0);
        for _ in 0..300 {
            fade.update(&display);
        }
        assert_eq!(fade.colors()[0], config.bg_color);
    }

    #[test]
    fn fade_follows_resolution_changes() {
        let mut fade = PixelFade::new(&Config::default());
        let display = Display::new(Resolution::High);
        assert_eq!(fade.update(&display).len(), 128 * 64);
    }

    #[test]
    fn lerp_rate_is_clamped() {
        let mut fade = PixelFade::new(&Config::default());
        fade.adjust_lerp_rate(5.0);
        assert_eq!(fade.lerp_rate(), MAX_LERP_RATE);
        fade.adjust_lerp_rate(-5.0);
        assert_eq!(fade.lerp_rate(), MIN_LERP_RATE);
    }
}
