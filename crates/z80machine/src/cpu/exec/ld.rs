use crate::cpu::{Bus, Cpu, Operand8, Reg16};

impl Cpu {
    pub(super) fn exec_ld<B: Bus>(&mut self, bus: &mut B, dst: Operand8, src: Operand8) {
        debug_assert!(!(dst.is_memory() && src.is_memory()));
        let value = self.read_operand8(bus, src);
        self.write_operand8(bus, dst, value);
    }

    pub(super) fn exec_ld_a_from_pair<B: Bus>(&mut self, bus: &mut B, pair: Reg16) {
        debug_assert!(matches!(pair, Reg16::BC | Reg16::DE));
        let value = bus.read_mem(self.regs.get16(pair));
        self.regs.set_a(value);
    }

    pub(super) fn exec_ld_pair_from_a<B: Bus>(&mut self, bus: &mut B, pair: Reg16) {
        debug_assert!(matches!(pair, Reg16::BC | Reg16::DE));
        bus.write_mem(self.regs.get16(pair), self.regs.a());
    }

    pub(super) fn exec_ld_a_from_abs<B: Bus>(&mut self, bus: &mut B, addr: u16) {
        let value = bus.read_mem(addr);
        self.regs.set_a(value);
    }

    pub(super) fn exec_ld_abs_from_a<B: Bus>(&mut self, bus: &mut B, addr: u16) {
        bus.write_mem(addr, self.regs.a());
    }

    pub(super) fn exec_ld_hl_from_abs<B: Bus>(&mut self, bus: &mut B, addr: u16) {
        let lo = bus.read_mem(addr) as u16;
        let hi = bus.read_mem(addr.wrapping_add(1)) as u16;
        self.regs.hl = (hi << 8) | lo;
    }

    pub(super) fn exec_ld_abs_from_hl<B: Bus>(&mut self, bus: &mut B, addr: u16) {
        let hl = self.regs.hl;
        bus.write_mem(addr, hl as u8);
        bus.write_mem(addr.wrapping_add(1), (hl >> 8) as u8);
    }
}
