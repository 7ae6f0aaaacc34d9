use super::{AluOp, Cpu, Flags, Rotate};

impl Cpu {
    /// Apply `op` to A and `value`.
    ///
    /// Arithmetic ops set Sign/Zero from the result, Carry from the
    /// overflow or borrow, clear AddSubtract and leave HalfCarry and
    /// ParityOverflow alone. Logical ops force HalfCarry and clear the rest
    /// apart from Sign/Zero.
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        let a = self.regs.a();
        let carry_in = self.regs.flags().contains(Flags::CARRY) as u16;

        match op {
            AluOp::Add | AluOp::Adc => {
                let carry_in = if op == AluOp::Adc { carry_in } else { 0 };
                let sum = a as u16 + value as u16 + carry_in;
                let result = sum as u8;
                self.regs.set_a(result);
                self.set_arithmetic_flags(result, sum > 0xFF);
            }
            AluOp::Sub | AluOp::Sbc | AluOp::Cp => {
                let carry_in = if op == AluOp::Sbc { carry_in } else { 0 };
                let subtrahend = value as u16 + carry_in;
                let result = (a as u16).wrapping_sub(subtrahend) as u8;
                if op != AluOp::Cp {
                    self.regs.set_a(result);
                }
                self.set_arithmetic_flags(result, (a as u16) < subtrahend);
            }
            AluOp::And => self.logical(a & value),
            AluOp::Xor => self.logical(a ^ value),
            AluOp::Or => self.logical(a | value),
        }
    }

    fn set_arithmetic_flags(&mut self, result: u8, carry: bool) {
        let mut flags = self.regs.flags();
        flags.set(Flags::SIGN, result & 0x80 != 0);
        flags.set(Flags::ZERO, result == 0);
        flags.remove(Flags::ADD_SUBTRACT);
        flags.set(Flags::CARRY, carry);
        self.regs.set_flags(flags);
    }

    fn logical(&mut self, result: u8) {
        self.regs.set_a(result);
        let mut flags = Flags::HALF_CARRY;
        flags.set(Flags::SIGN, result & 0x80 != 0);
        flags.set(Flags::ZERO, result == 0);
        self.regs.set_flags(flags);
    }

    pub(super) fn rotate_a(&mut self, rotate: Rotate) {
        let a = self.regs.a();
        let mut flags = self.regs.flags();
        let carry_in = flags.contains(Flags::CARRY) as u8;

        let (result, carry_out) = match rotate {
            Rotate::LeftCircular => (a.rotate_left(1), a & 0x80 != 0),
            Rotate::RightCircular => (a.rotate_right(1), a & 0x01 != 0),
            Rotate::LeftThroughCarry => ((a << 1) | carry_in, a & 0x80 != 0),
            Rotate::RightThroughCarry => ((a >> 1) | (carry_in << 7), a & 0x01 != 0),
        };

        self.regs.set_a(result);
        flags.set(Flags::CARRY, carry_out);
        flags.remove(Flags::HALF_CARRY | Flags::ADD_SUBTRACT);
        self.regs.set_flags(flags);
    }
}
