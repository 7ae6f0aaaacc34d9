//! Opcode classification.
//!
//! Every byte maps to exactly one [`Instruction`]; prefixed forms are keyed
//! by the prefix and the following byte through [`Extended::decode`].

use super::regs::{Condition, Reg16, Reg8, StackPair};

/// Source or destination of an 8-bit operation: a register or `(HL)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand8 {
    Reg(Reg8),
    IndirectHl,
}

impl Operand8 {
    /// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A.
    pub fn from_code(code: u8) -> Self {
        match code & 0x07 {
            0 => Operand8::Reg(Reg8::B),
            1 => Operand8::Reg(Reg8::C),
            2 => Operand8::Reg(Reg8::D),
            3 => Operand8::Reg(Reg8::E),
            4 => Operand8::Reg(Reg8::H),
            5 => Operand8::Reg(Reg8::L),
            6 => Operand8::IndirectHl,
            7 => Operand8::Reg(Reg8::A),
            _ => unreachable!(),
        }
    }

    #[inline]
    pub fn is_memory(self) -> bool {
        self == Operand8::IndirectHl
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    pub fn from_code(code: u8) -> Self {
        match code & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            7 => AluOp::Cp,
            _ => unreachable!(),
        }
    }
}

/// Accumulator rotates (RLCA, RRCA, RLA, RRA).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotate {
    LeftCircular,
    RightCircular,
    LeftThroughCarry,
    RightThroughCarry,
}

/// Unprefixed instruction classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    /// LD r,r' including the (HL) forms.
    Ld { dst: Operand8, src: Operand8 },
    /// LD r,n and LD (HL),n.
    LdImm(Operand8),
    /// LD A,(BC) / LD A,(DE).
    LdAFromPair(Reg16),
    /// LD (BC),A / LD (DE),A.
    LdPairFromA(Reg16),
    LdAFromAbs,
    LdAbsFromA,
    LdPairImm(Reg16),
    LdHlFromAbs,
    LdAbsFromHl,
    LdSpHl,
    Push(StackPair),
    Pop(StackPair),
    Alu { op: AluOp, src: Operand8 },
    AluImm(AluOp),
    Inc16(Reg16),
    Dec16(Reg16),
    Rotate(Rotate),
    Jp,
    JpCond(Condition),
    JpHl,
    Jr,
    JrCond(Condition),
    Djnz,
    Call,
    CallCond(Condition),
    Ret,
    RetCond(Condition),
    Rst(u16),
    In,
    Out,
    Di,
    Ei,
    Halt,
    /// 0xCB, 0xDD, 0xED or 0xFD; the second byte is fetched as the operand.
    Prefix(u8),
    Illegal(u8),
}

impl Instruction {
    pub fn decode(opcode: u8) -> Self {
        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;
        let p = (opcode >> 4) & 0x03;

        match opcode {
            0x00 => Instruction::Nop,
            0x01 | 0x11 | 0x21 | 0x31 => Instruction::LdPairImm(Reg16::from_code(p)),
            0x02 | 0x12 => Instruction::LdPairFromA(Reg16::from_code(p)),
            0x0A | 0x1A => Instruction::LdAFromPair(Reg16::from_code(p)),
            0x22 => Instruction::LdAbsFromHl,
            0x2A => Instruction::LdHlFromAbs,
            0x32 => Instruction::LdAbsFromA,
            0x3A => Instruction::LdAFromAbs,
            0x03 | 0x13 | 0x23 | 0x33 => Instruction::Inc16(Reg16::from_code(p)),
            0x0B | 0x1B | 0x2B | 0x3B => Instruction::Dec16(Reg16::from_code(p)),
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                Instruction::LdImm(Operand8::from_code(y))
            }
            0x07 => Instruction::Rotate(Rotate::LeftCircular),
            0x0F => Instruction::Rotate(Rotate::RightCircular),
            0x17 => Instruction::Rotate(Rotate::LeftThroughCarry),
            0x1F => Instruction::Rotate(Rotate::RightThroughCarry),
            0x10 => Instruction::Djnz,
            0x18 => Instruction::Jr,
            0x20 | 0x28 | 0x30 | 0x38 => Instruction::JrCond(Condition::from_code(y - 4)),
            0x76 => Instruction::Halt,
            0x40..=0x7F => Instruction::Ld {
                dst: Operand8::from_code(y),
                src: Operand8::from_code(z),
            },
            0x80..=0xBF => Instruction::Alu {
                op: AluOp::from_code(y),
                src: Operand8::from_code(z),
            },
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                Instruction::RetCond(Condition::from_code(y))
            }
            0xC1 | 0xD1 | 0xE1 | 0xF1 => Instruction::Pop(StackPair::from_code(p)),
            0xC5 | 0xD5 | 0xE5 | 0xF5 => Instruction::Push(StackPair::from_code(p)),
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                Instruction::JpCond(Condition::from_code(y))
            }
            0xC3 => Instruction::Jp,
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                Instruction::CallCond(Condition::from_code(y))
            }
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                Instruction::AluImm(AluOp::from_code(y))
            }
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                Instruction::Rst((y as u16) << 3)
            }
            0xC9 => Instruction::Ret,
            0xCD => Instruction::Call,
            0xCB | 0xDD | 0xED | 0xFD => Instruction::Prefix(opcode),
            0xD3 => Instruction::Out,
            0xDB => Instruction::In,
            0xE9 => Instruction::JpHl,
            0xF9 => Instruction::LdSpHl,
            0xF3 => Instruction::Di,
            0xFB => Instruction::Ei,
            // INC r, DEC r, ADD HL,ss, the exchanges, DAA, CPL, SCF, CCF.
            _ => Instruction::Illegal(opcode),
        }
    }

    /// Immediate bytes following the opcode (the second opcode byte for
    /// prefixed forms).
    pub fn operand_len(&self) -> u8 {
        match self {
            Instruction::LdImm(_)
            | Instruction::AluImm(_)
            | Instruction::Jr
            | Instruction::JrCond(_)
            | Instruction::Djnz
            | Instruction::In
            | Instruction::Out
            | Instruction::Prefix(_) => 1,
            Instruction::LdPairImm(_)
            | Instruction::LdAFromAbs
            | Instruction::LdAbsFromA
            | Instruction::LdHlFromAbs
            | Instruction::LdAbsFromHl
            | Instruction::Jp
            | Instruction::JpCond(_)
            | Instruction::Call
            | Instruction::CallCond(_) => 2,
            _ => 0,
        }
    }

    /// Total T-states, including the 4 of the opcode fetch. `taken` selects
    /// the branch cost of conditional jumps, calls and returns. Prefixed
    /// forms are costed by [`Extended::t_states`].
    pub fn t_states(&self, taken: bool) -> u32 {
        match *self {
            Instruction::Nop
            | Instruction::Rotate(_)
            | Instruction::JpHl
            | Instruction::Di
            | Instruction::Ei
            | Instruction::Halt
            | Instruction::Illegal(_) => 4,
            Instruction::Ld { dst, src } => {
                if dst.is_memory() || src.is_memory() {
                    7
                } else {
                    4
                }
            }
            Instruction::LdImm(dst) => {
                if dst.is_memory() {
                    10
                } else {
                    7
                }
            }
            Instruction::LdAFromPair(_) | Instruction::LdPairFromA(_) => 7,
            Instruction::LdAFromAbs | Instruction::LdAbsFromA => 13,
            Instruction::LdPairImm(_) => 10,
            Instruction::LdHlFromAbs | Instruction::LdAbsFromHl => 16,
            Instruction::LdSpHl => 6,
            Instruction::Push(_) => 11,
            Instruction::Pop(_) => 10,
            Instruction::Alu { src, .. } => {
                if src.is_memory() {
                    7
                } else {
                    4
                }
            }
            Instruction::AluImm(_) => 7,
            Instruction::Inc16(_) | Instruction::Dec16(_) => 6,
            Instruction::Jp | Instruction::JpCond(_) => 10,
            Instruction::Jr => 12,
            Instruction::JrCond(_) => {
                if taken {
                    12
                } else {
                    7
                }
            }
            Instruction::Djnz => {
                if taken {
                    13
                } else {
                    8
                }
            }
            Instruction::Call => 17,
            Instruction::CallCond(_) => {
                if taken {
                    17
                } else {
                    10
                }
            }
            Instruction::Ret => 10,
            Instruction::RetCond(_) => {
                if taken {
                    11
                } else {
                    5
                }
            }
            Instruction::Rst(_) => 11,
            Instruction::In | Instruction::Out => 11,
            Instruction::Prefix(_) => 8,
        }
    }
}

/// Prefixed instructions. Only two are modeled; the rest are fetched and
/// ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extended {
    /// ED 4D.
    Reti,
    /// ED FF: export a diagnostic dump.
    DumpState,
    Unsupported { prefix: u8, opcode: u8 },
}

impl Extended {
    pub fn decode(prefix: u8, opcode: u8) -> Self {
        match (prefix, opcode) {
            (0xED, 0x4D) => Extended::Reti,
            (0xED, 0xFF) => Extended::DumpState,
            _ => Extended::Unsupported { prefix, opcode },
        }
    }

    /// RETI is only effective, and only pays for the stack pop, while an
    /// interrupt is being processed.
    pub fn t_states(&self, processing: bool) -> u32 {
        match self {
            Extended::Reti if processing => 14,
            _ => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_total_and_costs_cover_the_fetch() {
        for opcode in 0..=0xFFu8 {
            let instr = Instruction::decode(opcode);
            assert!(instr.t_states(false) >= 4, "opcode {opcode:02X}");
            assert!(instr.t_states(true) >= instr.t_states(false));
        }
    }

    #[test]
    fn ld_block_excludes_halt() {
        assert_eq!(Instruction::decode(0x76), Instruction::Halt);
        assert_eq!(
            Instruction::decode(0x7E),
            Instruction::Ld {
                dst: Operand8::Reg(Reg8::A),
                src: Operand8::IndirectHl
            }
        );
        assert_eq!(Instruction::decode(0x7E).t_states(false), 7);
        assert_eq!(Instruction::decode(0x41).t_states(false), 4);
    }

    #[test]
    fn conditional_costs() {
        assert_eq!(Instruction::decode(0x20).t_states(true), 12);
        assert_eq!(Instruction::decode(0x20).t_states(false), 7);
        assert_eq!(Instruction::decode(0x10).t_states(true), 13);
        assert_eq!(Instruction::decode(0xC4).t_states(false), 10);
        assert_eq!(Instruction::decode(0xC0).t_states(false), 5);
        assert_eq!(Instruction::decode(0xC0).t_states(true), 11);
    }

    #[test]
    fn jr_conditions_map_to_low_codes() {
        assert_eq!(
            Instruction::decode(0x38),
            Instruction::JrCond(Condition::Carry)
        );
        assert_eq!(
            Instruction::decode(0x20),
            Instruction::JrCond(Condition::NotZero)
        );
    }

    #[test]
    fn unimplemented_unprefixed_are_illegal() {
        for opcode in [0x04u8, 0x05, 0x08, 0x09, 0x27, 0x2F, 0x37, 0x3F, 0xD9, 0xE3, 0xEB] {
            assert_eq!(Instruction::decode(opcode), Instruction::Illegal(opcode));
        }
    }

    #[test]
    fn extended_key() {
        assert_eq!(Extended::decode(0xED, 0x4D), Extended::Reti);
        assert_eq!(Extended::decode(0xED, 0xFF), Extended::DumpState);
        assert_eq!(
            Extended::decode(0xCB, 0x4D),
            Extended::Unsupported {
                prefix: 0xCB,
                opcode: 0x4D
            }
        );
        assert_eq!(Extended::Reti.t_states(true), 14);
        assert_eq!(Extended::Reti.t_states(false), 8);
    }
}
