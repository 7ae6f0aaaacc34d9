use super::{Bus, Cpu, Extended, Instruction, BASE_T_STATES};

impl Cpu {
    /// Execute one instruction, or one idle slot while halted, and return
    /// the elapsed T-states.
    ///
    /// The opcode fetch ticks come first. An accepted interrupt redirects
    /// PC before the fetch and costs nothing extra. The remaining ticks of
    /// the instruction elapse before its side effects are committed.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.elapse(bus, BASE_T_STATES);

        // A pending EI/DI stays frozen while halted.
        if self.halted {
            if self.interrupts.can_wake() {
                self.halted = false;
                log::debug!("CPU resumed from HALT @ 0x{:04X}", self.regs.pc);
            }
            self.cycles += BASE_T_STATES as u64;
            return BASE_T_STATES;
        }

        self.interrupts.advance_transition();
        if self.interrupts.can_accept() {
            self.enter_interrupt(bus);
        }

        let at = self.regs.pc;
        let opcode = self.fetch8(bus);
        let instr = Instruction::decode(opcode);
        let operand = self.fetch_operand(bus, instr.operand_len());

        let cost = match instr {
            Instruction::Prefix(prefix) => {
                Extended::decode(prefix, operand as u8).t_states(self.interrupts.processing)
            }
            _ => instr.t_states(self.branch_taken(&instr)),
        };
        self.elapse(bus, cost - BASE_T_STATES);

        self.execute(bus, at, instr, operand);

        self.instructions += 1;
        self.cycles += cost as u64;
        cost
    }
}
