mod alu;
mod control;
mod ld;
mod stack;
mod system;

use super::{Bus, Cpu, Instruction};

impl Cpu {
    /// Commit the side effects of a decoded instruction. Opcode and
    /// immediate bytes have already been fetched and every tick of its cost
    /// has already elapsed; `at` is the opcode address.
    pub(super) fn execute<B: Bus>(
        &mut self,
        bus: &mut B,
        at: u16,
        instr: Instruction,
        operand: u16,
    ) {
        match instr {
            Instruction::Nop => {}

            Instruction::Ld { dst, src } => self.exec_ld(bus, dst, src),
            Instruction::LdImm(dst) => self.write_operand8(bus, dst, operand as u8),
            Instruction::LdAFromPair(pair) => self.exec_ld_a_from_pair(bus, pair),
            Instruction::LdPairFromA(pair) => self.exec_ld_pair_from_a(bus, pair),
            Instruction::LdAFromAbs => self.exec_ld_a_from_abs(bus, operand),
            Instruction::LdAbsFromA => self.exec_ld_abs_from_a(bus, operand),
            Instruction::LdPairImm(pair) => self.regs.set16(pair, operand),
            Instruction::LdHlFromAbs => self.exec_ld_hl_from_abs(bus, operand),
            Instruction::LdAbsFromHl => self.exec_ld_abs_from_hl(bus, operand),
            Instruction::LdSpHl => self.regs.sp = self.regs.hl,

            Instruction::Push(pair) => self.exec_push(bus, pair),
            Instruction::Pop(pair) => self.exec_pop(bus, pair),

            Instruction::Alu { op, src } => self.exec_alu(bus, op, src),
            Instruction::AluImm(op) => self.alu(op, operand as u8),
            Instruction::Inc16(pair) => self.exec_inc16(pair),
            Instruction::Dec16(pair) => self.exec_dec16(pair),
            Instruction::Rotate(rotate) => self.rotate_a(rotate),

            Instruction::Jp => self.regs.pc = operand,
            Instruction::JpCond(cond) => self.exec_jp_cond(cond, operand),
            Instruction::JpHl => self.regs.pc = self.regs.hl,
            Instruction::Jr => self.regs.pc = self.relative_target(operand as u8),
            Instruction::JrCond(cond) => self.exec_jr_cond(cond, operand as u8),
            Instruction::Djnz => self.exec_djnz(operand as u8),
            Instruction::Call => self.exec_call(bus, operand),
            Instruction::CallCond(cond) => self.exec_call_cond(bus, cond, operand),
            Instruction::Ret => self.exec_ret(bus),
            Instruction::RetCond(cond) => self.exec_ret_cond(bus, cond),
            Instruction::Rst(vector) => self.exec_rst(bus, vector),

            Instruction::In => self.exec_in(bus, operand as u8),
            Instruction::Out => self.exec_out(bus, operand as u8),
            Instruction::Di => self.exec_di(),
            Instruction::Ei => self.exec_ei(),
            Instruction::Halt => self.exec_halt(at),
            Instruction::Prefix(prefix) => self.exec_extended(bus, at, prefix, operand as u8),
            Instruction::Illegal(opcode) => {
                log::warn!("Illegal opcode 0x{:02X} @ 0x{:04X}", opcode, at);
            }
        }
    }
}
