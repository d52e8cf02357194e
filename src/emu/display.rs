pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
pub const HIRES_DISPLAY_X: usize = 128;
pub const HIRES_DISPLAY_Y: usize = 64;

/// Pixels moved by the horizontal SCHIP scroll opcodes.
pub const HORIZONTAL_SCROLL: usize = 4;

/// Display mode: 64x32 CHIP-8 or 128x64 SCHIP high resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    #[default]
    Low,
    High,
}

impl Resolution {
    pub const fn width(self) -> usize {
        match self {
            Resolution::Low => DISPLAY_X,
            Resolution::High => HIRES_DISPLAY_X,
        }
    }

    pub const fn height(self) -> usize {
        match self {
            Resolution::Low => DISPLAY_Y,
            Resolution::High => HIRES_DISPLAY_Y,
        }
    }

    pub const fn pixel_count(self) -> usize {
        self.width() * self.height()
    }
}

/// Monochrome framebuffer, stored row-major and addressed `y * width + x`.
#[derive(Debug, Clone)]
pub struct Display {
    resolution: Resolution,
    pixels: Vec<bool>,
}

impl Display {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            pixels: vec![false; resolution.pixel_count()],
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn width(&self) -> usize {
        self.resolution.width()
    }

    pub fn height(&self) -> usize {
        self.resolution.height()
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Switches resolution. The framebuffer is resized and cleared.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
        self.pixels.clear();
        self.pixels.resize(resolution.pixel_count(), false);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// Get the state of a pixel (true = on, false = off). Out of range reads are off.
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height() && self.pixels[y * self.width() + x]
    }

    /// XORs a set sprite bit onto the pixel at (x, y).
    ///
    /// Returns true if the pixel was already on (a collision).
    pub(crate) fn flip_pixel(&mut self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width() && y < self.height());
        let index = y * self.width() + x;
        let was_on = self.pixels[index];
        self.pixels[index] = !was_on;
        was_on
    }

    /// Moves every row down by `n`. Rows shifted past the bottom are lost, top rows become blank.
    pub fn scroll_down(&mut self, n: usize) {
        let shift = (n * self.width()).min(self.pixels.len());
        let len = self.pixels.len();

        self.pixels.copy_within(0..len - shift, shift);
        self.pixels[..shift].fill(false);
    }

    /// Moves every column right by `n`, clipping at the right edge.
    pub fn scroll_right(&mut self, n: usize) {
        let width = self.width();
        let n = n.min(width);

        for row in self.pixels.chunks_exact_mut(width) {
            row.copy_within(0..width - n, n);
            row[..n].fill(false);
        }
    }

    /// Moves every column left by `n`, clipping at the left edge.
    pub fn scroll_left(&mut self, n: usize) {
        let width = self.width();
        let n = n.min(width);

        for row in self.pixels.chunks_exact_mut(width) {
            row.copy_within(n..width, 0);
            row[width - n..].fill(false);
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new(Resolution::Low)
    }
}
