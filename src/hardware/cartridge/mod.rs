//! Cartridge: header parsing plus the bank-controller dispatch the bus reads
//! and writes 0x0000-0x7FFF and 0xA000-0xBFFF through.

pub mod header;
mod mbc;

use crate::error::CoreError;
use header::CartridgeHeader;
use mbc::{Mbc1, NoMbc};

/// Which controller a cartridge's 0x0147 byte selects. Only the two variants
/// this core models are recognized; anything else falls back to `NoMbc` over
/// the raw ROM rather than refusing to load.
#[derive(Debug)]
enum Mbc {
    None(NoMbc),
    Mbc1(Mbc1),
}

#[derive(Debug)]
pub struct Cartridge {
    pub header: CartridgeHeader,
    mbc: Mbc,
}

impl Cartridge {
    pub fn new(rom: Vec<u8>) -> Result<Self, CoreError> {
        let header = CartridgeHeader::new(&rom)?;
        let ram_size = header.ram_size_bytes;
        let mbc = match header.cartridge_type {
            0x01..=0x03 => Mbc::Mbc1(Mbc1::new(rom, ram_size)),
            _ => Mbc::None(NoMbc::new(rom, ram_size)),
        };

        Ok(Cartridge { header, mbc })
    }

    pub fn read_rom(&self, address: u16) -> u8 {
        match &self.mbc {
            Mbc::None(mbc) => mbc.read_rom(address),
            Mbc::Mbc1(mbc) => {
                if address < 0x4000 {
                    mbc.read_rom_low(address)
                } else {
                    mbc.read_rom_high(address)
                }
            }
        }
    }

    pub fn read_ram(&self, address: u16) -> u8 {
        match &self.mbc {
            Mbc::None(mbc) => mbc.read_ram(address),
            Mbc::Mbc1(mbc) => mbc.read_ram(address),
        }
    }

    pub fn write_ram(&mut self, address: u16, value: u8) {
        match &mut self.mbc {
            Mbc::None(mbc) => mbc.write_ram(address, value),
            Mbc::Mbc1(mbc) => mbc.write_ram(address, value),
        }
    }

    /// Writes into the 0x0000-0x7FFF ROM window are bank-select registers on
    /// a banked cartridge; on `NoMbc` they are simply ignored.
    pub fn write_register(&mut self, address: u16, value: u8) {
        if let Mbc::Mbc1(mbc) = &mut self.mbc {
            mbc.write_register(address, value);
        }
    }
}
