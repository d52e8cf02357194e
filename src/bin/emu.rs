use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use clap::Parser;
use clap_num::maybe_hex;
use log::info;
use pixels::{Pixels, SurfaceTexture};
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, NamedKey, PhysicalKey},
    window::{Window, WindowId},
};

use schip8::{
    emu::{
        Chip8, Chip8Runner, Config, DISPLAY_X, DISPLAY_Y, PixelFade, Resolution, RunState,
        ToneGenerator, VOLUME_STEP,
    },
    u4,
};

/// Buffer pixels per CHIP-8 pixel when outlines are drawn.
const OUTLINE_CELL_SIZE: usize = 4;

/// Fade rate change per key press.
const LERP_RATE_STEP: f32 = 0.1;

/// Mapping from physical keyboard keys to CHIP-8 hex keypad (0x0-0xF).
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::KeyX,   // 0x00
    KeyCode::Digit1, // 0x01
    KeyCode::Digit2, // 0x02
    KeyCode::Digit3, // 0x03
    KeyCode::KeyQ,   // 0x04
    KeyCode::KeyW,   // 0x05
    KeyCode::KeyE,   // 0x06
    KeyCode::KeyA,   // 0x07
    KeyCode::KeyS,   // 0x08
    KeyCode::KeyD,   // 0x09
    KeyCode::KeyZ,   // 0x0A
    KeyCode::KeyC,   // 0x0B
    KeyCode::Digit4, // 0x0C
    KeyCode::KeyR,   // 0x0D
    KeyCode::KeyF,   // 0x0E
    KeyCode::KeyV,   // 0x0F
];

struct App {
    pixels: Option<Pixels<'static>>,
    window: Option<Arc<Window>>,
    /// Eased per-pixel colours drawn instead of the raw framebuffer.
    fade: PixelFade,
    window_size: (u32, u32),
    pixel_outlines: bool,
    /// Resolution the pixels buffer is currently sized for.
    buffer_resolution: Resolution,

    /// Audio output stream (must be kept alive).
    _audio_stream: OutputStream,
    _audio_sink: Sink,

    runner: Chip8Runner,
    /// Used for delta time calculation.
    last_frame_instant: Instant,

    /// Stores the result of the application to be returned from main.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(chip8: Chip8, config: &Config) -> anyhow::Result<Self> {
        let runner = Chip8Runner::new(chip8, config);

        // Initialize audio. The tone generator stays attached and goes silent on its own
        // whenever the sound timer stops.
        let mut _audio_stream = OutputStreamBuilder::open_default_stream()
            .context("Failed to open audio output stream")?;
        _audio_stream.log_on_drop(false);

        let _audio_sink = Sink::connect_new(_audio_stream.mixer());
        _audio_sink.append(ToneGenerator::new(runner.audio_settings()));

        Ok(Self {
            pixels: None,
            window: None,
            fade: PixelFade::new(config),
            window_size: config.window_size(),
            pixel_outlines: config.pixel_outlines,
            buffer_resolution: config.resolution,

            _audio_stream,
            _audio_sink,

            runner,
            last_frame_instant: Instant::now(),
            exit_result: Ok(()),
        })
    }

    fn cell_size(&self) -> usize {
        if self.pixel_outlines {
            OUTLINE_CELL_SIZE
        } else {
            1
        }
    }

    fn buffer_size(&self, resolution: Resolution) -> (u32, u32) {
        let cell = self.cell_size();
        (
            (resolution.width() * cell) as u32,
            (resolution.height() * cell) as u32,
        )
    }

    fn process_display(&mut self) -> anyhow::Result<()> {
        let cell = self.cell_size();
        let resolution = self.runner.display().resolution();
        let (buffer_width, buffer_height) = self.buffer_size(resolution);

        let pixels = self
            .pixels
            .as_mut()
            .context("Pixels surface not initialized")?;

        if resolution != self.buffer_resolution {
            pixels
                .resize_buffer(buffer_width, buffer_height)
                .context("Failed to resize pixels buffer")?;
            self.buffer_resolution = resolution;
        }

        let outline_rgba = self.fade.bg_color().to_be_bytes();
        let display = self.runner.display();
        let colors = self.fade.update(display);
        let row_len = buffer_width as usize;

        for (i, pxl) in pixels.frame_mut().chunks_exact_mut(4).enumerate() {
            let (bx, by) = (i % row_len, i / row_len);
            let (x, y) = (bx / cell, by / cell);

            // Lit cells get a background coloured border when outlines are on
            let on_edge = cell > 1
                && (bx % cell == 0 || bx % cell == cell - 1 || by % cell == 0 || by % cell == cell - 1);

            let rgba = if on_edge && display.get_pixel(x, y) {
                outline_rgba
            } else {
                colors[y * display.width() + x].to_be_bytes()
            };
            pxl.copy_from_slice(&rgba);
        }

        Ok(())
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = {
            let (width, height) = self.window_size;
            let size = LogicalSize::new(width, height);
            let min_size = LogicalSize::new(DISPLAY_X as u32, DISPLAY_Y as u32);

            Arc::new(
                event_loop
                    .create_window(
                        Window::default_attributes()
                            .with_title("schip8")
                            .with_inner_size(size)
                            .with_min_inner_size(min_size),
                    )
                    .context("Failed to create window")?,
            )
        };

        self.window = Some(window.clone());
        self.pixels = {
            let window_size = window.inner_size();
            let surface_texture =
                SurfaceTexture::new(window_size.width, window_size.height, window.clone());

            let (width, height) = self.buffer_size(self.buffer_resolution);
            let pixels = Pixels::new(width, height, surface_texture)
                .context("Failed to create pixels surface")?;

            window.request_redraw();
            Some(pixels)
        };

        // Avoid large dt on first frame
        self.last_frame_instant = Instant::now();
        Ok(())
    }

    fn handle_control_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Space => self.runner.toggle_pause(),
            KeyCode::Equal => self.runner.reset(),
            KeyCode::KeyP => self.fade.adjust_lerp_rate(LERP_RATE_STEP),
            KeyCode::KeyM => self.fade.adjust_lerp_rate(-LERP_RATE_STEP),
            KeyCode::KeyO => self.runner.audio_settings().adjust_volume(VOLUME_STEP),
            KeyCode::KeyL => self.runner.audio_settings().adjust_volume(-VOLUME_STEP),
            _ => {}
        }
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                self.runner.quit();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                self.pixels
                    .as_mut()
                    .context("Pixels surface not initialized")?
                    .resize_surface(size.width, size.height)
                    .context("Failed to resize pixels surface")?;
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame_instant).as_secs_f32();
                self.last_frame_instant = now;

                self.runner.update(dt).context("Chip8 Execution error")?;

                if self.runner.state() == RunState::Quit {
                    info!("Program requested exit");
                    event_loop.exit();
                    return Ok(());
                }

                self.process_display()?;

                self.pixels
                    .as_ref()
                    .context("Pixels surface not initialized")?
                    .render()
                    .context("Pixels render error")?;

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return Ok(());
                };
                let keypad_key = KEY_MAP.iter().position(|&k| k == code);

                match (event.state, keypad_key) {
                    (ElementState::Pressed, Some(key)) => {
                        self.runner.set_key(u4::new(key as u8), true);
                    }
                    (ElementState::Released, Some(key)) => {
                        self.runner.set_key(u4::new(key as u8), false);
                    }
                    (ElementState::Pressed, None) if !event.repeat => {
                        self.handle_control_key(code);
                    }
                    _ => {}
                }
            }

            _ => (),
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }
}

/// CHIP-8 / SCHIP interpreter written in Rust.
///
/// Keys 1-4, Q-R, A-F, Z-V map to CHIP-8 keys.
/// Space pauses, = resets, P/M change the fade rate, O/L change the volume.
/// Escape is used to exit the emulator.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file
    rom_path: PathBuf,

    /// Start in 128x64 SCHIP high resolution mode
    #[arg(long)]
    high_res: bool,

    /// Window pixels per CHIP-8 pixel in the starting mode
    #[arg(long, default_value_t = 20)]
    scale_factor: u32,

    /// Foreground colour as 0xRRGGBBAA
    #[arg(long, default_value = "0xFFFFFFFF", value_parser = maybe_hex::<u32>)]
    fg_color: u32,

    /// Background colour as 0xRRGGBBAA
    #[arg(long, default_value = "0x00000000", value_parser = maybe_hex::<u32>)]
    bg_color: u32,

    /// Draw a background coloured outline around lit pixels
    #[arg(long)]
    pixel_outlines: bool,

    /// CPU speed
    #[arg(long, default_value_t = 700)]
    instructions_per_second: u32,

    /// Beep tone in Hz
    #[arg(long, default_value_t = 440)]
    tone_frequency: u32,

    /// Audio sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,

    /// Beep amplitude (0-32767)
    #[arg(long, default_value_t = 3000)]
    volume: i16,

    /// Fraction of the way each pixel fades toward its colour per frame (0.1-1.0)
    #[arg(long, default_value_t = 0.7)]
    color_lerp_rate: f32,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            resolution: if args.high_res {
                Resolution::High
            } else {
                Resolution::Low
            },
            fg_color: args.fg_color,
            bg_color: args.bg_color,
            scale_factor: args.scale_factor,
            pixel_outlines: args.pixel_outlines,
            instructions_per_second: args.instructions_per_second,
            tone_frequency: args.tone_frequency,
            sample_rate: args.sample_rate,
            volume: args.volume,
            color_lerp_rate: args.color_lerp_rate,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = Config::from(&args);

    let mut chip8 = Chip8::with_resolution(config.resolution);
    chip8
        .load_file(&args.rom_path)
        .context("Failed to load ROM into CHIP-8 memory")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(chip8, &config).context("Failed to initialize application")?;
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    // Return the result captured during the event loop
    app.exit_result
}
