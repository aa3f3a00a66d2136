//! IE/IF registers and interrupt priority selection.
//!
//! `Interrupts::request` sets only the `IF` bit for the source. `IE` is
//! guest-configured through writes to 0xFFFF and must never be touched by
//! the hardware itself, so nothing in this module writes it.

use bitflags::bitflags;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    /// Priority order, ascending: lower index serviced first.
    pub const PRIORITY: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    pub fn vector(self) -> u16 {
        match self {
            Interrupt::VBlank => 0x0040,
            Interrupt::LcdStat => 0x0048,
            Interrupt::Timer => 0x0050,
            Interrupt::Serial => 0x0058,
            Interrupt::Joypad => 0x0060,
        }
    }

    fn flag(self) -> InterruptFlags {
        match self {
            Interrupt::VBlank => InterruptFlags::VBLANK,
            Interrupt::LcdStat => InterruptFlags::LCD_STAT,
            Interrupt::Timer => InterruptFlags::TIMER,
            Interrupt::Serial => InterruptFlags::SERIAL,
            Interrupt::Joypad => InterruptFlags::JOYPAD,
        }
    }
}

bitflags! {
    #[derive(Default)]
    pub struct InterruptFlags: u8 {
        const VBLANK   = 0b0000_0001;
        const LCD_STAT = 0b0000_0010;
        const TIMER    = 0b0000_0100;
        const SERIAL   = 0b0000_1000;
        const JOYPAD   = 0b0001_0000;
    }
}

/// Owns `IE` (0xFFFF) and `IF` (0xFF0F).
#[derive(Debug, Default, Clone)]
pub struct Interrupts {
    pub interrupt_enable: InterruptFlags,
    pub interrupt_flag: InterruptFlags,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `IF` bit for `interrupt`. Never touches `IE`.
    pub fn request(&mut self, interrupt: Interrupt) {
        self.interrupt_flag.insert(interrupt.flag());
    }

    pub fn clear(&mut self, interrupt: Interrupt) {
        self.interrupt_flag.remove(interrupt.flag());
    }

    pub fn has_pending(&self) -> bool {
        !(self.interrupt_enable & self.interrupt_flag).is_empty()
    }

    /// Lowest-index set bit of `IE & IF`, if any.
    pub fn next_interrupt(&self) -> Option<Interrupt> {
        let pending = self.interrupt_enable & self.interrupt_flag;
        Interrupt::PRIORITY
            .iter()
            .copied()
            .find(|i| pending.contains(i.flag()))
    }

    pub fn read_ie(&self) -> u8 {
        self.interrupt_enable.bits()
    }

    pub fn write_ie(&mut self, value: u8) {
        self.interrupt_enable = InterruptFlags::from_bits_truncate(value);
    }

    pub fn read_if(&self) -> u8 {
        // Top three bits always read back high.
        0xE0 | self.interrupt_flag.bits()
    }

    pub fn write_if(&mut self, value: u8) {
        self.interrupt_flag = InterruptFlags::from_bits_truncate(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_ascending_index() {
        let mut intr = Interrupts::new();
        intr.write_ie(0x1F);
        intr.write_if(0b0001_0100); // Timer + LcdStat
        assert_eq!(intr.next_interrupt(), Some(Interrupt::LcdStat));
    }

    #[test]
    fn request_never_touches_ie() {
        let mut intr = Interrupts::new();
        intr.write_ie(0x00);
        intr.request(Interrupt::Timer);
        assert_eq!(intr.read_ie() & 0x1F, 0x00);
        assert!(intr.interrupt_flag.contains(InterruptFlags::TIMER));
    }

    #[test]
    fn clearing_removes_only_that_bit() {
        let mut intr = Interrupts::new();
        intr.request(Interrupt::Timer);
        intr.request(Interrupt::VBlank);
        intr.clear(Interrupt::Timer);
        assert!(!intr.interrupt_flag.contains(InterruptFlags::TIMER));
        assert!(intr.interrupt_flag.contains(InterruptFlags::VBLANK));
    }
}
