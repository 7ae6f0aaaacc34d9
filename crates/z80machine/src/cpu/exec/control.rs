use crate::cpu::{Bus, Condition, Cpu, Reg8};

impl Cpu {
    pub(super) fn exec_jp_cond(&mut self, cond: Condition, addr: u16) {
        if cond.holds(self.regs.flags()) {
            self.regs.pc = addr;
        }
    }

    pub(super) fn exec_jr_cond(&mut self, cond: Condition, displacement: u8) {
        debug_assert!(matches!(
            cond,
            Condition::NotZero | Condition::Zero | Condition::NoCarry | Condition::Carry
        ));
        if cond.holds(self.regs.flags()) {
            self.regs.pc = self.relative_target(displacement);
        }
    }

    pub(super) fn exec_djnz(&mut self, displacement: u8) {
        let b = self.regs.get8(Reg8::B).wrapping_sub(1);
        self.regs.set8(Reg8::B, b);
        if b != 0 {
            self.regs.pc = self.relative_target(displacement);
        }
    }

    pub(super) fn exec_call<B: Bus>(&mut self, bus: &mut B, addr: u16) {
        let ret = self.regs.pc;
        self.push_u16(bus, ret);
        self.regs.pc = addr;
    }

    pub(super) fn exec_call_cond<B: Bus>(&mut self, bus: &mut B, cond: Condition, addr: u16) {
        if cond.holds(self.regs.flags()) {
            self.exec_call(bus, addr);
        }
    }

    pub(super) fn exec_ret<B: Bus>(&mut self, bus: &mut B) {
        self.regs.pc = self.pop_u16(bus);
    }

    pub(super) fn exec_ret_cond<B: Bus>(&mut self, bus: &mut B, cond: Condition) {
        if cond.holds(self.regs.flags()) {
            self.exec_ret(bus);
        }
    }
}
