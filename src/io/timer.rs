//! DIV/TIMA/TMA/TAC: the 16-bit internal divider counter and the falling-edge
//! detector that drives `TIMA`.
//!
//! `update` is driven once per instruction with however many T-cycles the
//! CPU just spent, rather than being ticked inline one 4-cycle quantum at a
//! time, so it loops internally in 4-cycle steps to stay bit-exact across an
//! arbitrary delta while still catching every falling edge and the
//! TIMA-overflow-delayed-by-one-M-cycle reload quirk.

use crate::io::interrupts::Interrupt;

pub const DIV_ADDRESS: u16 = 0xFF04;
pub const TIMA_ADDRESS: u16 = 0xFF05;
pub const TMA_ADDRESS: u16 = 0xFF06;
pub const TAC_ADDRESS: u16 = 0xFF07;

#[derive(Debug, Copy, Clone)]
enum InputClock {
    C1024 = 0x0,
    C16 = 0x1,
    C64 = 0x2,
    C256 = 0x3,
}

impl InputClock {
    fn from_tac(val: u8) -> Self {
        match val & 0x3 {
            0x0 => InputClock::C1024,
            0x1 => InputClock::C16,
            0x2 => InputClock::C64,
            0x3 => InputClock::C256,
            _ => unreachable!(),
        }
    }

    /// The bit of the internal 16-bit counter watched for a falling edge.
    fn watched_bit(self) -> u16 {
        match self {
            InputClock::C16 => 0x0008,   // bit 3, 262144 Hz
            InputClock::C64 => 0x0020,   // bit 5, 65536 Hz
            InputClock::C256 => 0x0080,  // bit 7, 16384 Hz
            InputClock::C1024 => 0x0200, // bit 9, 4096 Hz
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct TimerControl {
    enabled: bool,
    input_select: InputClock,
}

impl Default for TimerControl {
    fn default() -> Self {
        TimerControl {
            enabled: false,
            input_select: InputClock::C1024,
        }
    }
}

impl TimerControl {
    fn to_bits(self) -> u8 {
        let enable_bit = if self.enabled { 0x4 } else { 0 };
        0xF8 | enable_bit | self.input_select as u8
    }
}

#[derive(Debug, Default)]
pub struct Timer {
    /// The internal 16-bit counter; DIV is its high byte.
    div_counter: u16,
    tima: u8,
    tma: u8,
    control: TimerControl,
    /// Set the cycle TIMA overflows; TMA is loaded and the interrupt fires on
    /// the *next* 4-cycle quantum, matching the real one-M-cycle delay.
    overflowed: bool,
    /// True only during the 4-cycle quantum in which TMA was just loaded into TIMA.
    just_reloaded: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn div(&self) -> u8 {
        (self.div_counter >> 8) as u8
    }

    pub fn tima(&self) -> u8 {
        self.tima
    }

    pub fn tma(&self) -> u8 {
        self.tma
    }

    pub fn tac(&self) -> u8 {
        self.control.to_bits()
    }

    /// Advance the internal counter by `cycles` T-cycles, in 4-cycle steps so
    /// the falling-edge detector never misses an edge. Returns `Some(Interrupt::Timer)`
    /// if TIMA overflowed and reloaded during this call.
    pub fn update(&mut self, cycles: u32) -> Option<Interrupt> {
        let mut fired = None;
        let mut remaining = cycles;
        while remaining >= 4 {
            if self.step_one_quantum() {
                fired = Some(Interrupt::Timer);
            }
            remaining -= 4;
        }
        fired
    }

    fn step_one_quantum(&mut self) -> bool {
        self.just_reloaded = false;
        let mut fired = false;

        if self.overflowed {
            self.tima = self.tma;
            self.overflowed = false;
            self.just_reloaded = true;
            fired = true;
        }

        let old = self.div_counter;
        self.div_counter = self.div_counter.wrapping_add(4);

        if self.control.enabled && self.falling_edge(old, self.control.input_select.watched_bit()) {
            self.increment_tima();
        }

        fired
    }

    fn falling_edge(&self, old_counter: u16, watched_bit: u16) -> bool {
        (old_counter & watched_bit) != 0 && (self.div_counter & watched_bit) == 0
    }

    fn increment_tima(&mut self) {
        let (new_value, overflowed) = self.tima.overflowing_add(1);
        self.tima = new_value;
        self.overflowed = overflowed;
    }

    pub fn write_div(&mut self) {
        let old = self.div_counter;
        self.div_counter = 0;
        // Writing DIV can itself trigger a falling edge if the watched bit was high.
        if self.control.enabled && self.falling_edge(old, self.control.input_select.watched_bit()) {
            self.increment_tima();
        }
    }

    /// Writing TIMA during the overflow-pending window cancels the pending
    /// interrupt/reload; writing during the reload quantum itself is ignored.
    pub fn write_tima(&mut self, value: u8) {
        if self.just_reloaded {
            self.tima = self.tma;
            return;
        }
        if self.overflowed {
            self.overflowed = false;
        }
        self.tima = value;
    }

    pub fn write_tma(&mut self, value: u8) {
        self.tma = value;
        if self.just_reloaded {
            self.tima = value;
        }
    }

    pub fn write_tac(&mut self, value: u8) {
        let old = self.control;
        self.control = TimerControl {
            enabled: value & 0b0000_0100 != 0,
            input_select: InputClock::from_tac(value),
        };

        let old_bit = old.input_select.watched_bit();
        let new_bit = self.control.input_select.watched_bit();

        // Disabling the timer, or switching to a frequency whose watched bit is
        // currently 0 where the old one was 1, causes a spurious falling edge.
        if old.enabled && !self.control.enabled && (self.div_counter & old_bit) != 0 {
            self.increment_tima();
        } else if old.enabled
            && self.control.enabled
            && (self.div_counter & old_bit) != 0
            && (self.div_counter & new_bit) == 0
        {
            self.increment_tima();
        }
    }
}
