use std::sync::Arc;

use log::{info, warn};

use super::{AudioSettings, Chip8, Chip8Error, Chip8Result, Config, Display, RunState, TIMER_HZ};
use crate::u4;

const TIMER_TIME_STEP: f32 = 1.0 / TIMER_HZ as f32;

/// Longest frame the runner will catch up on. Anything longer (e.g. after the window was
/// dragged) is clamped so the machine does not burst through thousands of instructions.
const MAX_FRAME_DT: f32 = 0.25;

/// High-level emulator runner that manages timing, pause state and the audio signal.
pub struct Chip8Runner {
    chip8: Chip8,
    audio: Arc<AudioSettings>,
    state: RunState,
    instructions_per_frame: u32,
    /// Zero instructions per second yields an infinite step, the CPU never runs.
    cpu_time_step: f32,
    cpu_dt_accumulator: f32,
    timer_dt_accumulator: f32,
}

impl Chip8Runner {
    pub fn new(chip8: Chip8, config: &Config) -> Self {
        Self {
            chip8,
            audio: Arc::new(AudioSettings::new(config)),
            state: RunState::Running,
            instructions_per_frame: config.instructions_per_frame(),
            cpu_time_step: 1.0 / config.instructions_per_second as f32,
            cpu_dt_accumulator: 0.0,
            timer_dt_accumulator: 0.0,
        }
    }

    /// Handle to the settings read by the audio thread.
    pub fn audio_settings(&self) -> Arc<AudioSettings> {
        Arc::clone(&self.audio)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            RunState::Running => {
                info!("Paused");
                RunState::Paused
            }
            RunState::Paused => {
                info!("Running");
                RunState::Running
            }
            RunState::Quit => RunState::Quit,
        };
    }

    pub fn quit(&mut self) {
        self.state = RunState::Quit;
        self.audio.set_enabled(false);
    }

    /// Re-initializes the machine, reloads the ROM and resumes running.
    pub fn reset(&mut self) {
        info!("Resetting machine");
        self.chip8.reset();
        self.cpu_dt_accumulator = 0.0;
        self.timer_dt_accumulator = 0.0;
        self.audio.set_enabled(false);
        self.state = RunState::Running;
    }

    /// Update emulator by delta time, handles both CPU and timer cycles.
    ///
    /// Runs as many CPU cycles and timer updates as needed based on the elapsed time `dt`.
    /// Stops early for the frame when an instruction asks to wait for the next frame.
    pub fn update(&mut self, dt: f32) -> Result<(), Chip8Error> {
        if self.state != RunState::Running {
            return Ok(());
        }

        let dt = if dt > MAX_FRAME_DT {
            warn!("Frame took {dt:.3}s, clamping to {MAX_FRAME_DT}s");
            MAX_FRAME_DT
        } else {
            dt
        };

        self.cpu_dt_accumulator += dt;
        self.timer_dt_accumulator += dt;

        while self.timer_dt_accumulator >= TIMER_TIME_STEP {
            self.timer_dt_accumulator -= TIMER_TIME_STEP;
            self.timers_cycle();
        }

        while self.cpu_dt_accumulator >= self.cpu_time_step {
            self.cpu_dt_accumulator -= self.cpu_time_step;

            match self.cpu_cycle()? {
                Chip8Result::WaitForNextFrame => {
                    // We clear the accumulator to avoid "catching up" in the next frame.
                    self.cpu_dt_accumulator = 0.0;
                    break;
                }
                Chip8Result::Exit => break,
                Chip8Result::Continue => {}
            }
        }

        Ok(())
    }

    /// Runs one fixed 60Hz frame: `instructions_per_second / 60` instructions, then one timer tick.
    pub fn run_frame(&mut self) -> Result<(), Chip8Error> {
        if self.state != RunState::Running {
            return Ok(());
        }

        for _ in 0..self.instructions_per_frame {
            match self.cpu_cycle()? {
                Chip8Result::Continue => {}
                Chip8Result::WaitForNextFrame => break,
                Chip8Result::Exit => return Ok(()),
            }
        }

        self.timers_cycle();
        Ok(())
    }

    /// Executes exactly one instruction, even while paused.
    pub fn step(&mut self) -> Result<Chip8Result, Chip8Error> {
        if self.state == RunState::Quit {
            return Ok(Chip8Result::Exit);
        }
        self.cpu_cycle()
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.chip8.set_key(key, pressed)
    }

    pub fn display(&self) -> &Display {
        self.chip8.display()
    }

    pub fn chip8_ref(&self) -> &Chip8 {
        &self.chip8
    }

    pub fn chip8_mut(&mut self) -> &mut Chip8 {
        &mut self.chip8
    }

    fn cpu_cycle(&mut self) -> Result<Chip8Result, Chip8Error> {
        let result = self.chip8.cpu_cycle();

        match result {
            Ok(Chip8Result::Exit) | Err(_) => self.quit(),
            _ => {}
        }

        result
    }

    fn timers_cycle(&mut self) {
        let audio_enabled = self.chip8.timers_cycle();
        self.audio.set_enabled(audio_enabled);
    }
}
