/// Memory, IO and clock interface seen by the CPU.
///
/// `tick` is called once per elapsed T-state, before the opcode's side
/// effects are committed. After each tick the CPU polls `take_interrupt`;
/// a `true` result raises the interrupt request line.
pub trait Bus {
    fn read_mem(&mut self, addr: u16) -> u8;
    fn write_mem(&mut self, addr: u16, value: u8);

    fn read_io(&mut self, _port: u16) -> u8 {
        0
    }

    fn write_io(&mut self, _port: u16, _value: u8) {}

    /// Advance attached devices by one T-state.
    fn tick(&mut self) {}

    /// Consume a device interrupt request latched during the last tick.
    fn take_interrupt(&mut self) -> bool {
        false
    }
}
