//! DMG execution core: CPU, bus, interrupts, timer, and PPU. No APU, no CGB
//! modes, no boot ROM -- the CPU starts directly in its post-boot-ROM state.

pub mod emulator;
pub mod error;
pub mod hardware;
pub mod io;

pub use crate::hardware::ppu::palette::{DisplayColour, Rgb};
pub use crate::io::joypad::InputKey;

/// Construction-time knobs for an [`emulator::Emulator`].
#[derive(Debug, Clone)]
pub struct EmulatorOptions {
    /// Initial external cartridge RAM contents, for resuming a save.
    pub saved_ram: Option<Vec<u8>>,
    /// The four shades BGP/OBP0/OBP1 map their color indices onto.
    pub display_colours: DisplayColour,
}

#[derive(Debug, Clone)]
pub struct EmulatorOptionsBuilder {
    saved_ram: Option<Vec<u8>>,
    display_colours: DisplayColour,
}

impl EmulatorOptionsBuilder {
    pub fn new() -> Self {
        EmulatorOptionsBuilder {
            saved_ram: None,
            display_colours: DisplayColour::default(),
        }
    }

    pub fn saved_ram(mut self, saved_ram: Option<Vec<u8>>) -> Self {
        self.saved_ram = saved_ram;
        self
    }

    pub fn display_colours(mut self, display_colours: DisplayColour) -> Self {
        self.display_colours = display_colours;
        self
    }

    pub fn build(self) -> EmulatorOptions {
        EmulatorOptions {
            saved_ram: self.saved_ram,
            display_colours: self.display_colours,
        }
    }
}

impl Default for EmulatorOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<EmulatorOptions> for EmulatorOptionsBuilder {
    fn from(from: EmulatorOptions) -> Self {
        EmulatorOptionsBuilder {
            saved_ram: from.saved_ram,
            display_colours: from.display_colours,
        }
    }
}
