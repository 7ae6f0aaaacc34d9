//! Register and memory snapshot exported by the debug-state-dump opcode
//! (`ED FF`) and at machine shutdown.

use std::fmt;

use crate::cpu::Flags;

/// Rows of eight bytes captured per memory window.
pub const DUMP_ROWS: usize = 4;
/// Bytes per captured row.
pub const DUMP_ROW_LEN: usize = 8;

/// Four rows of eight bytes starting at `origin`, walking up or down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryWindow {
    pub label: &'static str,
    pub origin: u16,
    pub downwards: bool,
    pub rows: [[u8; DUMP_ROW_LEN]; DUMP_ROWS],
}

impl MemoryWindow {
    /// Capture a window by calling `read` for each address.
    pub fn capture(
        label: &'static str,
        origin: u16,
        downwards: bool,
        mut read: impl FnMut(u16) -> u8,
    ) -> Self {
        let mut rows = [[0u8; DUMP_ROW_LEN]; DUMP_ROWS];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, byte) in row.iter_mut().enumerate() {
                let distance = (i * DUMP_ROW_LEN + j) as u16;
                let addr = if downwards {
                    origin.wrapping_sub(distance)
                } else {
                    origin.wrapping_add(distance)
                };
                *byte = read(addr);
            }
        }
        Self {
            label,
            origin,
            downwards,
            rows,
        }
    }
}

impl fmt::Display for MemoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.downwards { '-' } else { '+' };
        for (i, row) in self.rows.iter().enumerate() {
            write!(
                f,
                "{}{}0x{:x}\t",
                self.label,
                sign,
                (i + 1) * DUMP_ROW_LEN - 1
            )?;
            for byte in row {
                write!(f, "0x{byte:02x} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Full CPU state plus the stack and code windows around SP and PC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticDump {
    pub af: u16,
    pub a: u8,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub sp: u16,
    pub pc: u16,
    pub flags: Flags,
    pub halted: bool,
    pub irq: bool,
    pub irq_processing: bool,
    pub irq_disabled: bool,
    pub stack_below: MemoryWindow,
    pub stack_above: MemoryWindow,
    pub code: MemoryWindow,
}

impl fmt::Display for DiagnosticDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----- Register dump -----")?;
        writeln!(f, "AF = {:04x}", self.af)?;
        writeln!(f, "A = {:02x}", self.a)?;
        writeln!(f, "BC = {:04x}", self.bc)?;
        writeln!(f, "DE = {:04x}", self.de)?;
        writeln!(f, "HL = {:04x}", self.hl)?;
        writeln!(f, "SP = {:04x}", self.sp)?;
        writeln!(f, "PC = {:04x}", self.pc)?;
        writeln!(f, "flags = {:02x} {:?}", self.flags.bits(), self.flags)?;
        writeln!(f)?;
        writeln!(f, "Halted = {}", self.halted as u8)?;
        writeln!(f, "IRQ = {}", self.irq as u8)?;
        writeln!(f, "IRQ processing = {}", self.irq_processing as u8)?;
        writeln!(f, "IRQ disabled = {}", self.irq_disabled as u8)?;
        writeln!(f)?;
        writeln!(f, "----- Memory dump -----")?;
        writeln!(f, "Stack pointer")?;
        write!(f, "{}", self.stack_below)?;
        write!(f, "{}", self.stack_above)?;
        writeln!(f)?;
        writeln!(f, "Program counter")?;
        write!(f, "{}", self.code)
    }
}

/// Receiver of diagnostic dumps. Formatting and storage are up to the sink.
pub trait DiagnosticSink {
    fn receive(&mut self, dump: &DiagnosticDump);
}

/// Default sink: writes the formatted dump to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn receive(&mut self, dump: &DiagnosticDump) {
        log::info!("debug state dump\n{dump}");
    }
}

/// Sink that keeps every dump it receives.
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    pub dumps: Vec<DiagnosticDump>,
}

impl DiagnosticSink for CollectingSink {
    fn receive(&mut self, dump: &DiagnosticDump) {
        self.dumps.push(dump.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_walks_downwards_from_origin() {
        let window = MemoryWindow::capture("SP", 0x0010, true, |addr| addr as u8);
        assert_eq!(window.rows[0], [0x10, 0x0F, 0x0E, 0x0D, 0x0C, 0x0B, 0x0A, 0x09]);
        // 0x0010 - 31 wraps below zero.
        assert_eq!(window.rows[3][7], 0xF1);
    }

    #[test]
    fn window_display_labels_rows() {
        let window = MemoryWindow::capture("PC", 0xE000, false, |_| 0x76);
        let text = window.to_string();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("PC+0x7\t0x76 0x76"));
        assert_eq!(text.lines().count(), DUMP_ROWS);
    }
}
