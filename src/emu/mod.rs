mod audio;
mod chip8;
mod config;
mod display;
mod execute;
mod fade;
mod font;
mod opcode;
mod runner;
mod types;

pub use audio::*;
pub use chip8::*;
pub use config::*;
pub use display::*;
pub use fade::*;
pub use font::*;
pub use opcode::*;
pub use runner::*;
pub use types::*;
