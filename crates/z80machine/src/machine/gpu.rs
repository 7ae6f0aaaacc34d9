//! Simple graphics coprocessor.
//!
//! Software talks to it through a 256-byte command buffer reached via two
//! IO ports (pointer and data) and through a paged window onto the
//! framebuffer. Setting bit 0 of buffer byte 0 starts the command whose id
//! is in byte 1; the engine answers by writing ACK or NACK into byte 1 and
//! clearing the trigger bit.

mod tty;

pub use tty::TtyBuffer;

use std::fmt::Write as _;

use crate::config::MachineConfig;
use crate::error::GpuCommandError;

pub const COMMAND_BUFFER_LEN: usize = 256;

pub const STATUS_TRIGGER: u8 = 0x01;
pub const CMD_FILL: u8 = 1;
pub const CMD_TTY_WRITE: u8 = 2;
pub const RESPONSE_ACK: u8 = 0xFF;
pub const RESPONSE_NACK: u8 = 0xFE;

/// Relative ports inside the Gpu IO window.
pub const PORT_FB_PAGE: u16 = 0;
pub const PORT_CMD_POINTER: u16 = 1;
pub const PORT_CMD_DATA: u16 = 2;

const FILL_BYTES_PER_TICK: usize = 8;
const TTY_TEXT_OFFSET: usize = 2;

/// Command being executed, captured from the buffer on the first tick after
/// the trigger bit was set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpuJob {
    Fill(FillJob),
    TtyWrite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillJob {
    pub framebuffer: u8,
    pub start: usize,
    pub count: usize,
    pub value: u8,
    pub progress: usize,
}

pub struct Gpu {
    buffer: [u8; COMMAND_BUFFER_LEN],
    pointer: u8,
    job: Option<GpuJob>,
    framebuffer: Vec<u8>,
    width: usize,
    height: usize,
    window_size: usize,
    page: u8,
    framebuffer_dirty: bool,
    tty: TtyBuffer,
    font_available: bool,
}

impl Gpu {
    pub fn new(config: &MachineConfig) -> Self {
        let width = config.framebuffer_width;
        let height = config.framebuffer_height;
        Self {
            buffer: [0; COMMAND_BUFFER_LEN],
            pointer: 0,
            job: None,
            framebuffer: vec![0; width * height],
            width,
            height,
            window_size: config.framebuffer_window().size as usize,
            page: 0,
            framebuffer_dirty: false,
            tty: TtyBuffer::new(config.tty_rows, config.tty_cols),
            font_available: config.font_available,
        }
    }

    pub fn set_font_available(&mut self, available: bool) {
        self.font_available = available;
    }

    /// Advance the command engine by one T-state.
    pub fn tick(&mut self) {
        if self.buffer[0] & STATUS_TRIGGER == 0 {
            return;
        }

        let mut job = match self.job.take() {
            Some(job) => job,
            None => match self.snapshot() {
                Ok(job) => {
                    log::trace!("SGPU command {:?}", job);
                    job
                }
                Err(err) => return self.finish(Err(err)),
            },
        };

        match self.run_slice(&mut job) {
            Ok(true) => self.finish(Ok(())),
            Ok(false) => self.job = Some(job),
            Err(err) => self.finish(Err(err)),
        }
    }

    fn snapshot(&self) -> Result<GpuJob, GpuCommandError> {
        let b = &self.buffer;
        match b[1] {
            CMD_FILL => Ok(GpuJob::Fill(FillJob {
                framebuffer: b[2],
                start: u16::from_be_bytes([b[3], b[4]]) as usize,
                count: u16::from_be_bytes([b[5], b[6]]) as usize,
                value: b[7],
                progress: 0,
            })),
            CMD_TTY_WRITE => Ok(GpuJob::TtyWrite),
            id => Err(GpuCommandError::UnknownCommand(id)),
        }
    }

    /// Perform one bounded slice of `job`. `Ok(true)` means the job is
    /// complete.
    fn run_slice(&mut self, job: &mut GpuJob) -> Result<bool, GpuCommandError> {
        match job {
            GpuJob::Fill(fill) => self.fill_slice(fill),
            GpuJob::TtyWrite => {
                if !self.font_available {
                    return Err(GpuCommandError::MissingFont);
                }
                self.tty.write(&self.buffer[TTY_TEXT_OFFSET..]);
                Ok(true)
            }
        }
    }

    fn fill_slice(&mut self, fill: &mut FillJob) -> Result<bool, GpuCommandError> {
        if fill.framebuffer != 0 {
            return Err(GpuCommandError::UnknownFramebuffer(fill.framebuffer));
        }
        for _ in 0..FILL_BYTES_PER_TICK {
            if fill.progress == fill.count {
                break;
            }
            let index = fill.start + fill.progress;
            let size = self.framebuffer.len();
            let Some(pixel) = self.framebuffer.get_mut(index) else {
                return Err(GpuCommandError::FramebufferOverrun { index, size });
            };
            *pixel = fill.value;
            self.framebuffer_dirty = true;
            fill.progress += 1;
        }
        Ok(fill.progress == fill.count)
    }

    fn finish(&mut self, result: Result<(), GpuCommandError>) {
        self.job = None;
        self.buffer[1] = match result {
            Ok(()) => RESPONSE_ACK,
            Err(err) => {
                log::warn!("SGPU command rejected: {err}");
                RESPONSE_NACK
            }
        };
        self.buffer[0] &= !STATUS_TRIGGER;
    }

    pub fn read_io(&self, port: u16) -> u8 {
        match port {
            PORT_FB_PAGE => self.page,
            PORT_CMD_POINTER => self.pointer,
            PORT_CMD_DATA => self.buffer[self.pointer as usize],
            _ => 0,
        }
    }

    pub fn write_io(&mut self, port: u16, value: u8) {
        match port {
            PORT_FB_PAGE => self.page = value,
            PORT_CMD_POINTER => self.pointer = value,
            PORT_CMD_DATA => self.buffer[self.pointer as usize] = value,
            _ => {}
        }
    }

    #[inline]
    fn window_index(&self, offset: usize) -> usize {
        self.page as usize * self.window_size + offset
    }

    /// Read through the framebuffer window; `offset` is relative to the
    /// window base.
    pub fn read_window(&self, offset: usize) -> u8 {
        self.framebuffer
            .get(self.window_index(offset))
            .copied()
            .unwrap_or(0)
    }

    /// Write through the framebuffer window. Any window write marks the
    /// framebuffer dirty, including one that lands past its end.
    pub fn write_window(&mut self, offset: usize, value: u8) {
        let index = self.window_index(offset);
        if let Some(pixel) = self.framebuffer.get_mut(index) {
            *pixel = value;
        }
        self.framebuffer_dirty = true;
    }

    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn take_dirty_framebuffer(&mut self) -> Option<&[u8]> {
        if !self.framebuffer_dirty {
            return None;
        }
        self.framebuffer_dirty = false;
        Some(&self.framebuffer)
    }

    pub fn take_dirty_text(&mut self) -> Option<String> {
        self.tty.take_dirty()
    }

    pub fn tty(&self) -> &TtyBuffer {
        &self.tty
    }

    pub fn command_buffer(&self) -> &[u8; COMMAND_BUFFER_LEN] {
        &self.buffer
    }

    pub fn job(&self) -> Option<&GpuJob> {
        self.job.as_ref()
    }

    /// Hexdump of the command buffer, 16 bytes per line, followed by the
    /// command id and whether a command is in flight.
    pub fn command_buffer_dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "========= SGPU command buffer dump =========");
        for row in self.buffer.chunks(16) {
            let line: Vec<String> = row.iter().map(|b| format!("{b:02x}")).collect();
            let _ = writeln!(out, "{}", line.join(" "));
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "command id = 0x{:02x}", self.buffer[1]);
        let _ = writeln!(out, "trigger = {}", self.job.is_some());
        out
    }
}
