use std::path::Path;

use log::{info, trace};

use super::{
    BIG_FONT, BIG_FONT_END_ADDRESS, BIG_FONT_START_ADDRESS, Chip8Error, Chip8Result, Display,
    FONT, FONT_END_ADDRESS, FONT_START_ADDRESS, Instruction, Opcode, Resolution,
};
use crate::u4;

// The constants are specified by the CHIP-8 specification
pub const ROM_START_ADDRESS: usize = 0x200;
pub const MEMORY_SIZE: usize = 4096;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - ROM_START_ADDRESS;
/// Maximum number of nested subroutine calls.
pub const STACK_DEPTH: usize = 12;

/// CHIP-8 virtual machine state
pub struct Chip8 {
    /// 4KB memory array
    pub(crate) memory: [u8; MEMORY_SIZE],
    /// Display buffer: 64x32 or 128x64 monochrome pixels
    pub(crate) display: Display,

    /// Program counter: address of the next instruction to execute
    pub(crate) pc: u16,
    /// Index register: used for memory operations
    pub(crate) i: u16,
    /// General-purpose registers V0-VF (VF is used as a flag register)
    pub(crate) v: [u8; 16],
    /// Return addresses, `sp` entries deep
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) sp: usize,

    /// Delay timer: decrements at 60Hz until it reaches 0
    pub(crate) delay_timer: u8,
    /// Sound timer: decrements at 60Hz, beeps while non-zero
    pub(crate) sound_timer: u8,

    /// Keypad state: 16 keys mapped as booleans (true = pressed)
    pub(crate) keypad: [bool; 16],

    /// Resolution restored on load and reset
    start_resolution: Resolution,
    /// Last loaded ROM, reloaded on reset
    rom: Vec<u8>,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_resolution(Resolution::Low)
    }

    pub fn with_resolution(resolution: Resolution) -> Self {
        let mut chip8 = Chip8 {
            memory: [0; MEMORY_SIZE],
            display: Display::new(resolution),
            pc: ROM_START_ADDRESS as u16,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; 16],
            start_resolution: resolution,
            rom: Vec::new(),
        };
        chip8.load_fonts();
        chip8
    }

    /// Loads a ROM into memory and re-initializes the whole machine.
    ///
    /// An oversized ROM is rejected before any state is touched.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomLoadError {
                size: rom.len(),
                max_size: MAX_ROM_SIZE,
            });
        }

        self.rom = rom.to_vec();
        self.reset();

        info!("Loaded {} byte ROM at {:#05X}", rom.len(), ROM_START_ADDRESS);
        Ok(())
    }

    /// Reads a ROM file from disk and loads it.
    pub fn load_file(&mut self, path: &Path) -> Result<(), Chip8Error> {
        let rom = std::fs::read(path).map_err(|source| Chip8Error::RomReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(&rom)
    }

    /// Restores power-on state and reloads the last loaded ROM.
    pub fn reset(&mut self) {
        self.memory = [0; MEMORY_SIZE];
        self.load_fonts();

        let rom_end = ROM_START_ADDRESS + self.rom.len();
        self.memory[ROM_START_ADDRESS..rom_end].copy_from_slice(&self.rom);

        self.display = Display::new(self.start_resolution);
        self.pc = ROM_START_ADDRESS as u16;
        self.i = 0;
        self.v = [0; 16];
        self.stack = [0; STACK_DEPTH];
        self.sp = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keypad = [false; 16];
    }

    /// Executes a single CPU cycle (fetch, decode, execute).
    pub fn cpu_cycle(&mut self) -> Result<Chip8Result, Chip8Error> {
        let instruction = self.fetch()?;
        self.execute(Opcode::from(instruction))
    }

    /// Advances the delay and sound timers by one 60Hz tick.
    ///
    /// Returns true if the sound timer was running, meaning audio should be enabled.
    pub fn timers_cycle(&mut self) -> bool {
        self.delay_timer = self.delay_timer.saturating_sub(1);

        if self.sound_timer > 0 {
            self.sound_timer -= 1;
            true
        } else {
            false
        }
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad[key] = pressed;
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn get_display_pixel(&self, x: usize, y: usize) -> bool {
        self.display.get_pixel(x, y)
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    /// Active return addresses, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// Fetches the next 16-bit opcode from memory and advances the program counter past it.
    pub fn fetch(&mut self) -> Result<Instruction, Chip8Error> {
        let high = *self.mem_get(self.pc)?;
        let low = *self.mem_get(self.pc.wrapping_add(1))?;
        let opcode = u16::from_be_bytes([high, low]);

        trace!("{:#05X}: {opcode:04X}", self.pc);
        self.pc = self.pc.wrapping_add(2);

        Ok(Instruction::new(opcode))
    }

    pub(crate) fn push_stack(&mut self, addr: u16) -> Result<(), Chip8Error> {
        let slot = self
            .stack
            .get_mut(self.sp)
            .ok_or(Chip8Error::StackOverflow { depth: STACK_DEPTH })?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub(crate) fn pop_stack(&mut self) -> Result<u16, Chip8Error> {
        self.sp = self.sp.checked_sub(1).ok_or(Chip8Error::StackUnderflow)?;
        Ok(self.stack[self.sp])
    }

    /// Helper to get a mutable reference to a memory location with bounds checking.
    pub(crate) fn mem_get(&mut self, addr: u16) -> Result<&mut u8, Chip8Error> {
        self.memory
            .get_mut(addr as usize)
            .ok_or(Chip8Error::MemoryOutOfBounds { address: addr })
    }

    /// Mutable view of `len` bytes starting at `addr`, checked as a whole so a failing
    /// access never leaves a partial write behind.
    pub(crate) fn mem_range(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error> {
        let start = addr as usize;
        self.memory
            .get_mut(start..start + len)
            .ok_or(Chip8Error::MemoryOutOfBounds {
                address: start.max(MEMORY_SIZE) as u16,
            })
    }

    fn load_fonts(&mut self) {
        self.memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);
        self.memory[BIG_FONT_START_ADDRESS..BIG_FONT_END_ADDRESS].copy_from_slice(&BIG_FONT);
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
