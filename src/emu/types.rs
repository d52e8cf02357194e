use std::path::PathBuf;

/// Result type for CHIP-8 CPU cycle execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Result {
    /// Continue executing instructions in the current frame.
    Continue,
    /// Stop executing for this frame (e.g., while FX0A is polling for a key).
    WaitForNextFrame,
    /// The program executed 00FD and asked the interpreter to terminate.
    Exit,
}

/// Host-visible lifecycle of a running ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Quit,
}

/// Error types that can occur during CHIP-8 emulation
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomLoadError { size: usize, max_size: usize },

    #[error("Failed to read ROM file {}", path.display())]
    RomReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("Stack overflow: call depth exceeded {depth} nested subroutines")]
    StackOverflow { depth: usize },

    #[error("Stack underflow: attempted to return from a subroutine with empty call stack")]
    StackUnderflow,
}
