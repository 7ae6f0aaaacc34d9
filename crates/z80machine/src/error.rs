use thiserror::Error;

/// Rejected machine configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("window {first} (0x{first_base:04X}..0x{first_end:05X}) overlaps {second} (0x{second_base:04X}..0x{second_end:05X})")]
    OverlappingWindows {
        first: &'static str,
        first_base: u32,
        first_end: u32,
        second: &'static str,
        second_base: u32,
        second_end: u32,
    },
    #[error("window {name} does not fit in the 64 KiB address space")]
    WindowOutOfRange { name: &'static str },
    #[error("{what} must not be zero")]
    ZeroSized { what: &'static str },
}

/// Why the SGPU refused or aborted a command. Each of these ends the command
/// with a NACK response; none of them is fatal to the machine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GpuCommandError {
    #[error("unknown SGPU command id 0x{0:02X}")]
    UnknownCommand(u8),
    #[error("no font available for tty output")]
    MissingFont,
    #[error("fill targets framebuffer {0}, only framebuffer 0 exists")]
    UnknownFramebuffer(u8),
    #[error("fill touches framebuffer index {index} (size {size})")]
    FramebufferOverrun { index: usize, size: usize },
}
