use crate::cpu::{Bus, Cpu, Extended, Transition};

impl Cpu {
    pub(super) fn exec_in<B: Bus>(&mut self, bus: &mut B, port: u8) {
        let value = bus.read_io(port as u16);
        self.regs.set_a(value);
    }

    pub(super) fn exec_out<B: Bus>(&mut self, bus: &mut B, port: u8) {
        bus.write_io(port as u16, self.regs.a());
    }

    pub(super) fn exec_di(&mut self) {
        self.interrupts.schedule(Transition::Disable);
    }

    pub(super) fn exec_ei(&mut self) {
        self.interrupts.schedule(Transition::Enable);
    }

    pub(super) fn exec_halt(&mut self, at: u16) {
        self.halted = true;
        log::debug!("CPU halted @ 0x{:04X} until next interrupt or reset", at);
    }

    pub(super) fn exec_extended<B: Bus>(&mut self, bus: &mut B, at: u16, prefix: u8, opcode: u8) {
        match Extended::decode(prefix, opcode) {
            Extended::Reti => self.exec_reti(bus),
            Extended::DumpState => {
                self.pending_dump = Some(self.diagnostic_dump(bus));
            }
            Extended::Unsupported { prefix, opcode } => {
                log::trace!(
                    "Ignoring prefixed opcode 0x{:02X} 0x{:02X} @ 0x{:04X}",
                    prefix,
                    opcode,
                    at
                );
            }
        }
    }
}
