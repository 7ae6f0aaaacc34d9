use super::{Bus, Cpu, Instruction, Operand8, Reg8};

impl Cpu {
    /// Elapse `t_states` device ticks, sampling the interrupt line after
    /// each one.
    #[inline]
    pub(super) fn elapse<B: Bus>(&mut self, bus: &mut B, t_states: u32) {
        for _ in 0..t_states {
            bus.tick();
            if bus.take_interrupt() {
                self.interrupts.requested = true;
            }
        }
    }

    #[inline]
    pub(super) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read_mem(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    #[inline]
    pub(super) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus) as u16;
        let hi = self.fetch8(bus) as u16;
        (hi << 8) | lo
    }

    /// Fetch the 0, 1 or 2 immediate bytes of an instruction, little-endian.
    pub(super) fn fetch_operand<B: Bus>(&mut self, bus: &mut B, len: u8) -> u16 {
        match len {
            0 => 0,
            1 => self.fetch8(bus) as u16,
            2 => self.fetch16(bus),
            _ => unreachable!(),
        }
    }

    #[inline]
    pub(super) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        // High byte lands at SP-1, low byte at SP-2.
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write_mem(self.regs.sp, (value >> 8) as u8);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write_mem(self.regs.sp, value as u8);
    }

    #[inline]
    pub(super) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read_mem(self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read_mem(self.regs.sp) as u16;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        (hi << 8) | lo
    }

    #[inline]
    pub(super) fn read_operand8<B: Bus>(&mut self, bus: &mut B, operand: Operand8) -> u8 {
        match operand {
            Operand8::Reg(reg) => self.regs.get8(reg),
            Operand8::IndirectHl => bus.read_mem(self.regs.hl),
        }
    }

    #[inline]
    pub(super) fn write_operand8<B: Bus>(&mut self, bus: &mut B, operand: Operand8, value: u8) {
        match operand {
            Operand8::Reg(reg) => self.regs.set8(reg, value),
            Operand8::IndirectHl => bus.write_mem(self.regs.hl, value),
        }
    }

    /// Whether a conditional instruction will branch, decided before any
    /// of its ticks elapse.
    pub(super) fn branch_taken(&self, instr: &Instruction) -> bool {
        let flags = self.regs.flags();
        match *instr {
            Instruction::JrCond(cond)
            | Instruction::JpCond(cond)
            | Instruction::CallCond(cond)
            | Instruction::RetCond(cond) => cond.holds(flags),
            Instruction::Djnz => self.regs.get8(Reg8::B).wrapping_sub(1) != 0,
            _ => false,
        }
    }

    /// Target of a relative jump from the current PC.
    #[inline]
    pub(super) fn relative_target(&self, displacement: u8) -> u16 {
        self.regs.pc.wrapping_add(displacement as i8 as i16 as u16)
    }
}
