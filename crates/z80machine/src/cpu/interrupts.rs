use super::{Bus, Cpu, INTERRUPT_VECTOR};

/// Steps between EI/DI and the moment the new mask takes effect.
pub const TRANSITION_LATENCY: u8 = 2;

/// Target of a delayed EI/DI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Enable,
    Disable,
}

/// Maskable interrupt line, mask and in-service state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterruptState {
    pub requested: bool,
    pub disabled: bool,
    pub processing: bool,
    pub pending: Option<Transition>,
    pub countdown: u8,
}

impl InterruptState {
    /// Queue an EI/DI. A later EI/DI replaces an earlier one still in flight.
    pub fn schedule(&mut self, target: Transition) {
        self.pending = Some(target);
        self.countdown = TRANSITION_LATENCY;
    }

    /// Apply the pending transition once its countdown has run out,
    /// otherwise count down by one step.
    pub fn advance_transition(&mut self) {
        let Some(target) = self.pending else {
            return;
        };
        if self.countdown == 0 {
            self.disabled = target == Transition::Disable;
            self.pending = None;
        } else {
            self.countdown -= 1;
        }
    }

    #[inline]
    pub fn can_wake(&self) -> bool {
        self.requested && !self.disabled
    }

    #[inline]
    pub fn can_accept(&self) -> bool {
        self.requested && !self.disabled && !self.processing
    }
}

impl Cpu {
    /// Mode-1 entry: push PC and continue at the fixed vector. Costs nothing
    /// beyond the instruction that follows.
    pub(super) fn enter_interrupt<B: Bus>(&mut self, bus: &mut B) {
        self.interrupts.processing = true;
        let ret = self.regs.pc;
        self.push_u16(bus, ret);
        self.regs.pc = INTERRUPT_VECTOR;
        log::debug!(
            "CPU interrupt: return=0x{:04X} sp=0x{:04X}",
            ret,
            self.regs.sp
        );
    }

    /// RETI. Outside an interrupt handler it is a two-byte no-op.
    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) {
        if !self.interrupts.processing {
            log::trace!("RETI @ 0x{:04X} outside interrupt handler", self.regs.pc);
            return;
        }
        self.regs.pc = self.pop_u16(bus);
        self.interrupts.requested = false;
        self.interrupts.processing = false;
        // Masked until the next EI takes effect.
        self.interrupts.disabled = true;
        log::debug!("CPU RETI: pc=0x{:04X}", self.regs.pc);
    }
}
