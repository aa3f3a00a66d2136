//! LCDC/STAT/OAM-attribute bit layouts, down to the DMG-only bits this core
//! actually uses.

use crate::hardware::ppu::Mode;
use bitflags::bitflags;

bitflags! {
    /// FF40. Unlike VRAM, LCDC is never locked by the PPU and can be written
    /// mid-scanline.
    #[derive(Default)]
    pub struct LcdControl: u8 {
        /// Bit 0: BG & window enable. When clear, both render as white and
        /// the window enable bit is ignored.
        const BG_WINDOW_ENABLE = 0b0000_0001;
        /// Bit 1: OBJ (sprite) enable.
        const OBJ_ENABLE = 0b0000_0010;
        /// Bit 2: OBJ size, 0=8x8, 1=8x16.
        const OBJ_SIZE = 0b0000_0100;
        /// Bit 3: BG tile map, 0=0x9800, 1=0x9C00.
        const BG_TILE_MAP_SELECT = 0b0000_1000;
        /// Bit 4: BG/window tile data addressing, 0=0x8800 signed, 1=0x8000 unsigned.
        const BG_WINDOW_TILE_SELECT = 0b0001_0000;
        /// Bit 5: window enable.
        const WINDOW_ENABLE = 0b0010_0000;
        /// Bit 6: window tile map, 0=0x9800, 1=0x9C00.
        const WINDOW_TILE_MAP_SELECT = 0b0100_0000;
        /// Bit 7: LCD & PPU enable.
        const LCD_DISPLAY = 0b1000_0000;
    }
}

bitflags! {
    /// FF41. Bits 0-1 (mode) and bit 2 (coincidence) are read-only and
    /// maintained by the PPU itself; bits 3-6 are guest-configured interrupt
    /// source selects.
    #[derive(Default)]
    pub struct LcdStatus: u8 {
        const MODE_FLAG_0 = 0b0000_0001;
        const MODE_FLAG_1 = 0b0000_0010;
        const COINCIDENCE_FLAG = 0b0000_0100;
        const MODE_0_H_INTERRUPT = 0b0000_1000;
        const MODE_1_V_INTERRUPT = 0b0001_0000;
        const MODE_2_OAM_INTERRUPT = 0b0010_0000;
        const COINCIDENCE_INTERRUPT = 0b0100_0000;
    }
}

bitflags! {
    /// Byte 3 of an OAM entry.
    #[derive(Default)]
    pub struct AttributeFlags: u8 {
        /// Bit 4: 0=OBP0, 1=OBP1.
        const PALETTE_NUMBER = 0b0001_0000;
        /// Bit 5: 0=normal, 1=horizontally mirrored.
        const X_FLIP = 0b0010_0000;
        /// Bit 6: 0=normal, 1=vertically mirrored.
        const Y_FLIP = 0b0100_0000;
        /// Bit 7: 0=OBJ above BG, 1=OBJ behind BG colors 1-3.
        const OBJ_TO_BG_PRIORITY = 0b1000_0000;
    }
}

impl LcdControl {
    pub fn bg_tile_map_start(self) -> u16 {
        if self.contains(LcdControl::BG_TILE_MAP_SELECT) {
            0x9C00
        } else {
            0x9800
        }
    }

    pub fn window_tile_map_start(self) -> u16 {
        if self.contains(LcdControl::WINDOW_TILE_MAP_SELECT) {
            0x9C00
        } else {
            0x9800
        }
    }

    pub fn obj_height(self) -> u8 {
        if self.contains(LcdControl::OBJ_SIZE) {
            16
        } else {
            8
        }
    }
}

impl LcdStatus {
    pub fn mode_flag(&self) -> Mode {
        match self.bits & 0x3 {
            0 => Mode::HBlank,
            1 => Mode::VBlank,
            2 => Mode::OamScan,
            3 => Mode::PixelTransfer,
            _ => unreachable!(),
        }
    }

    pub fn set_mode_flag(&mut self, value: Mode) {
        self.bits = (self.bits & 0xFC)
            | match value {
                Mode::HBlank => 0,
                Mode::VBlank => 1,
                Mode::OamScan => 2,
                Mode::PixelTransfer => 3,
            }
    }
}
