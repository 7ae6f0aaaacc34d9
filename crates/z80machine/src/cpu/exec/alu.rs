use crate::cpu::{AluOp, Bus, Cpu, Operand8, Reg16};

impl Cpu {
    pub(super) fn exec_alu<B: Bus>(&mut self, bus: &mut B, op: AluOp, src: Operand8) {
        let value = self.read_operand8(bus, src);
        self.alu(op, value);
    }

    // 16-bit INC/DEC leave the flags alone.
    pub(super) fn exec_inc16(&mut self, pair: Reg16) {
        let value = self.regs.get16(pair).wrapping_add(1);
        self.regs.set16(pair, value);
    }

    pub(super) fn exec_dec16(&mut self, pair: Reg16) {
        let value = self.regs.get16(pair).wrapping_sub(1);
        self.regs.set16(pair, value);
    }
}
