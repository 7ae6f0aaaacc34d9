pub mod config;
pub mod cpu;
pub mod diagnostics;
pub mod error;
pub mod machine;

pub use config::{MachineConfig, MemoryMap, Window};
pub use cpu::{Bus, Cpu, Flags};
pub use diagnostics::{CollectingSink, DiagnosticDump, DiagnosticSink, LogSink};
pub use error::{ConfigError, GpuCommandError};
pub use machine::{Gpu, KeyCode, KeyboardState, Machine, MachineBus, Renderer, Timer0};

/// Opcode returned by image windows that have nothing to show (HALT).
pub const HALT_OPCODE: u8 = 0x76;

/// Default stack pointer after reset.
pub const RESET_SP: u16 = 0x00FF;

/// Default clock frequency of the machine in Hz.
pub const CLOCK_HZ: u32 = 1_000_000;
