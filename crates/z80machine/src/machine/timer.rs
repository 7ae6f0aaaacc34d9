use bitflags::bitflags;

bitflags! {
    /// Timer0 control register (IO port 20).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TimerControl: u8 {
        const ENABLE = 1 << 0;
        /// Request a CPU interrupt whenever the threshold is reached.
        const IRQ = 1 << 1;
        /// Set by the timer when the threshold is reached; cleared by
        /// software writing the control port.
        const TRIGGER = 1 << 2;
    }
}

/// Programmable interval timer counting elapsed T-states.
///
/// The threshold is written a byte at a time through two ports. The count
/// itself is not visible to software.
#[derive(Clone, Debug, Default)]
pub struct Timer0 {
    control: u8,
    threshold: u16,
    count: u32,
}

impl Timer0 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one T-state. Returns `true` when an interrupt should be
    /// requested.
    pub fn tick(&mut self) -> bool {
        if !self.flags().contains(TimerControl::ENABLE) {
            self.count = 0;
            return false;
        }

        self.count += 1;
        if self.count < self.threshold as u32 {
            return false;
        }

        self.count = 0;
        self.control |= TimerControl::TRIGGER.bits();
        self.flags().contains(TimerControl::IRQ)
    }

    #[inline]
    pub fn flags(&self) -> TimerControl {
        TimerControl::from_bits_retain(self.control)
    }

    pub fn control(&self) -> u8 {
        self.control
    }

    pub fn write_control(&mut self, value: u8) {
        self.control = value;
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn threshold_low(&self) -> u8 {
        self.threshold as u8
    }

    pub fn threshold_high(&self) -> u8 {
        (self.threshold >> 8) as u8
    }

    pub fn write_threshold_low(&mut self, value: u8) {
        self.threshold = (self.threshold & 0xFF00) | value as u16;
    }

    pub fn write_threshold_high(&mut self, value: u8) {
        self.threshold = (self.threshold & 0x00FF) | ((value as u16) << 8);
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(threshold: u16, control: TimerControl) -> Timer0 {
        let mut timer = Timer0::new();
        timer.write_threshold_low(threshold as u8);
        timer.write_threshold_high((threshold >> 8) as u8);
        timer.write_control(control.bits());
        timer
    }

    #[test]
    fn threshold_is_assembled_from_two_bytes() {
        let mut timer = Timer0::new();
        timer.write_threshold_low(0x34);
        timer.write_threshold_high(0x12);
        assert_eq!(timer.threshold(), 0x1234);
        assert_eq!(timer.threshold_low(), 0x34);
        assert_eq!(timer.threshold_high(), 0x12);

        timer.write_threshold_low(0xFF);
        assert_eq!(timer.threshold(), 0x12FF);
    }

    #[test]
    fn disabled_timer_holds_count_at_zero() {
        let mut timer = Timer0::new();
        timer.write_threshold_low(3);
        for _ in 0..10 {
            assert!(!timer.tick());
        }
        assert_eq!(timer.count(), 0);
        assert!(!timer.flags().contains(TimerControl::TRIGGER));
    }

    #[test]
    fn trigger_without_irq() {
        let mut timer = enabled(3, TimerControl::ENABLE);
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.flags().contains(TimerControl::TRIGGER));
        assert_eq!(timer.count(), 0);
    }

    #[test]
    fn trigger_with_irq_repeats_every_threshold() {
        let mut timer = enabled(2, TimerControl::ENABLE | TimerControl::IRQ);
        let fired: Vec<bool> = (0..6).map(|_| timer.tick()).collect();
        assert_eq!(fired, vec![false, true, false, true, false, true]);
    }

    #[test]
    fn disabling_resets_the_count() {
        let mut timer = enabled(4, TimerControl::ENABLE);
        timer.tick();
        timer.tick();
        assert_eq!(timer.count(), 2);

        timer.write_control(0);
        timer.tick();
        assert_eq!(timer.count(), 0);
    }

    #[test]
    fn control_write_acknowledges_trigger() {
        let mut timer = enabled(1, TimerControl::ENABLE);
        timer.tick();
        assert_eq!(
            timer.control(),
            (TimerControl::ENABLE | TimerControl::TRIGGER).bits()
        );

        timer.write_control(TimerControl::ENABLE.bits());
        assert!(!timer.flags().contains(TimerControl::TRIGGER));
    }
}
