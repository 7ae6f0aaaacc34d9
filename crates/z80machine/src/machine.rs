mod bus;
mod gpu;
mod keyboard;
mod timer;

pub use bus::{ports, MachineBus};
pub use gpu::{
    FillJob, Gpu, GpuJob, TtyBuffer, CMD_FILL, CMD_TTY_WRITE, COMMAND_BUFFER_LEN, RESPONSE_ACK,
    RESPONSE_NACK, STATUS_TRIGGER,
};
pub use keyboard::{KeyCode, KeyboardState, KEY_TABLE_LEN};
pub use timer::{Timer0, TimerControl};

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::MachineConfig;
use crate::cpu::Cpu;
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::error::ConfigError;

/// Host-side presentation of the Gpu surfaces.
pub trait Renderer {
    /// One palette byte per pixel, row-major.
    fn framebuffer(&mut self, pixels: &[u8], width: usize, height: usize);
    /// TTY grid contents, one line per row.
    fn text(&mut self, text: &str);
}

/// CPU, bus and devices driven by a single clock.
///
/// Diagnostic dumps requested by the running program are handed to `S`.
pub struct Machine<S: DiagnosticSink = LogSink> {
    pub cpu: Cpu,
    pub bus: MachineBus,
    config: MachineConfig,
    sink: S,
}

impl Machine<LogSink> {
    /// Machine with the standard memory map.
    pub fn new(bootrom: Vec<u8>, rom: Vec<u8>) -> Self {
        let config = MachineConfig::default();
        let bus = MachineBus::new(&config, bootrom, rom);
        let cpu = Cpu::with_reset_vector(config.reset_pc(), config.reset_sp);
        Self {
            cpu,
            bus,
            config,
            sink: LogSink,
        }
    }

    pub fn with_config(
        config: MachineConfig,
        bootrom: Vec<u8>,
        rom: Vec<u8>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let bus = MachineBus::new(&config, bootrom, rom);
        let cpu = Cpu::with_reset_vector(config.reset_pc(), config.reset_sp);
        Ok(Self {
            cpu,
            bus,
            config,
            sink: LogSink,
        })
    }
}

impl<S: DiagnosticSink> Machine<S> {
    /// Swap the diagnostic sink, keeping all machine state.
    pub fn with_sink<T: DiagnosticSink>(self, sink: T) -> Machine<T> {
        Machine {
            cpu: self.cpu,
            bus: self.bus,
            config: self.config,
            sink,
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Run one CPU step and return the elapsed T-states.
    pub fn step(&mut self) -> u32 {
        let cycles = self.cpu.step(&mut self.bus);
        if let Some(dump) = self.cpu.take_diagnostic_dump() {
            self.sink.receive(&dump);
        }
        cycles
    }

    /// Step until `stop` is set. Returns the elapsed T-states.
    pub fn run(&mut self, stop: &AtomicBool) -> u64 {
        let mut total = 0u64;
        while !stop.load(Ordering::Relaxed) {
            let cycles = self.step();
            total += cycles as u64;
            if self.config.pacing {
                std::thread::sleep(self.pace(cycles));
            }
        }
        total
    }

    /// Wall-clock time `cycles` T-states take at the configured clock.
    pub fn pace(&self, cycles: u32) -> Duration {
        let nanos = cycles as u64 * 1_000_000_000 / self.config.clock_hz.max(1) as u64;
        Duration::from_nanos(nanos)
    }

    /// Halted with interrupts masked.
    pub fn is_stuck(&self) -> bool {
        self.cpu.is_stuck()
    }

    /// Hand dirty surfaces to `renderer` and clear their dirty flags.
    pub fn present<R: Renderer>(&mut self, renderer: &mut R) {
        let (width, height) = self.bus.gpu.dimensions();
        if let Some(pixels) = self.bus.gpu.take_dirty_framebuffer() {
            renderer.framebuffer(pixels, width, height);
        }
        if let Some(text) = self.bus.gpu.take_dirty_text() {
            renderer.text(&text);
        }
    }

    /// Replace the host keyboard state; the program's key selection stays.
    pub fn update_keyboard(&mut self, keyboard: &KeyboardState) {
        self.bus.keyboard.replace_host_state(keyboard);
    }

    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        self.bus.keyboard.handle_key(key, pressed);
    }

    pub fn set_font_available(&mut self, available: bool) {
        self.config.font_available = available;
        self.bus.gpu.set_font_available(available);
    }

    pub fn framebuffer(&self) -> &[u8] {
        self.bus.gpu.framebuffer()
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset(&self.config);
    }

    /// Emit the final CPU dump to the sink and log the Gpu command buffer.
    pub fn shutdown(&mut self) {
        let dump = self.cpu.diagnostic_dump(&mut self.bus);
        self.sink.receive(&dump);
        log::info!("{}", self.bus.gpu.command_buffer_dump());
        log::info!(
            "Machine stopped after {} instructions, {} T-states",
            self.cpu.instructions(),
            self.cpu.cycles()
        );
    }
}

#[cfg(test)]
mod tests;
