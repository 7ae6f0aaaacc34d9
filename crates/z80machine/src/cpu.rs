mod alu;
mod bus;
mod decode;
mod exec;
mod helpers;
mod interrupts;
mod regs;
mod step;

pub use bus::Bus;
pub use decode::{AluOp, Extended, Instruction, Operand8, Rotate};
pub use interrupts::{InterruptState, Transition, TRANSITION_LATENCY};
pub use regs::{Condition, Flags, Reg16, Reg8, Registers, StackPair};

use crate::config::MachineConfig;
use crate::diagnostics::{DiagnosticDump, MemoryWindow};
use crate::RESET_SP;

/// T-states every step spends on the opcode fetch before anything else.
pub const BASE_T_STATES: u32 = 4;

/// Fixed vector of the maskable interrupt (mode 1).
pub const INTERRUPT_VECTOR: u16 = 0x0038;

/// Z80-compatible CPU core.
///
/// The CPU never owns memory or devices; every access and every elapsed
/// T-state goes through the [`Bus`] passed to [`Cpu::step`].
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    pub interrupts: InterruptState,
    pub halted: bool,
    reset_pc: u16,
    reset_sp: u16,
    cycles: u64,
    instructions: u64,
    pending_dump: Option<DiagnosticDump>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// CPU wired for the standard memory map.
    pub fn new() -> Self {
        let config = MachineConfig::default();
        Self::with_reset_vector(config.reset_pc(), RESET_SP)
    }

    pub fn with_reset_vector(reset_pc: u16, reset_sp: u16) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            interrupts: InterruptState::default(),
            halted: false,
            reset_pc,
            reset_sp,
            cycles: 0,
            instructions: 0,
            pending_dump: None,
        };
        cpu.reset();
        cpu
    }

    /// Restore the power-on register, flag and interrupt state.
    pub fn reset(&mut self) {
        self.regs = Registers {
            pc: self.reset_pc,
            sp: self.reset_sp,
            ..Registers::default()
        };
        self.interrupts = InterruptState::default();
        self.halted = false;
        self.pending_dump = None;
    }

    /// Raise the maskable interrupt line.
    pub fn request_interrupt(&mut self) {
        self.interrupts.requested = true;
    }

    /// Total T-states elapsed since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Number of executed instructions (halted steps excluded).
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// True when halted with no way to leave HALT. A pending EI never
    /// applies while halted, so only the current mask matters.
    pub fn is_stuck(&self) -> bool {
        self.halted && self.interrupts.disabled
    }

    /// Dump produced by the last debug-state-dump opcode, if not yet taken.
    pub fn take_diagnostic_dump(&mut self) -> Option<DiagnosticDump> {
        self.pending_dump.take()
    }

    /// Snapshot registers and the memory around SP and PC.
    ///
    /// Reads go through the bus but never advance time.
    pub fn diagnostic_dump<B: Bus>(&self, bus: &mut B) -> DiagnosticDump {
        let sp = self.regs.sp;
        let pc = self.regs.pc;
        DiagnosticDump {
            af: self.regs.af,
            a: self.regs.a(),
            bc: self.regs.bc,
            de: self.regs.de,
            hl: self.regs.hl,
            sp,
            pc,
            flags: self.regs.flags(),
            halted: self.halted,
            irq: self.interrupts.requested,
            irq_processing: self.interrupts.processing,
            irq_disabled: self.interrupts.disabled,
            stack_below: MemoryWindow::capture("SP", sp, true, |addr| bus.read_mem(addr)),
            stack_above: MemoryWindow::capture("SP", sp, false, |addr| bus.read_mem(addr)),
            code: MemoryWindow::capture("PC", pc, false, |addr| bus.read_mem(addr)),
        }
    }
}
