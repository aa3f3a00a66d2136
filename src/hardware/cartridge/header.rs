//! Parses the DMG cartridge header at 0x0100-0x014F: title, destination,
//! licensee codes, and crucially byte 0x0147 (cartridge/MBC type) and
//! 0x0148/0x0149 (ROM/RAM size) which `cartridge::mod` uses to pick the MBC
//! and size the cartridge's RAM.

use crate::error::CoreError;

pub const HEADER_START: usize = 0x0100;
pub const HEADER_END: usize = 0x014F;

#[derive(Debug, Default, Clone)]
pub struct CartridgeHeader {
    /// Upper-case ASCII, up to 16 characters, zero-filled past the title's length.
    pub title: String,
    pub cgb_flag: bool,
    pub new_licensee_code: u16,
    pub sgb_flag: bool,
    /// Raw byte at 0x0147; `cartridge::mod::McbKind::from_header` derives the MBC from it.
    pub cartridge_type: u8,
    /// Total ROM size in bytes, decoded from the 0x0148 size code.
    pub rom_size_bytes: usize,
    /// Total external RAM size in bytes, decoded from the 0x0149 size code.
    pub ram_size_bytes: usize,
    pub is_japanese: bool,
    pub old_licensee_code: u8,
    pub mask_rom_version_number: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

impl CartridgeHeader {
    pub fn new(rom: &[u8]) -> Result<Self, CoreError> {
        if rom.len() <= HEADER_END {
            return Err(CoreError::RomParseError {
                reason: format!("ROM is only {} bytes, shorter than the header itself", rom.len()),
            });
        }

        let is_cgb_rom = read_cgb_flag(rom);
        Ok(CartridgeHeader {
            title: read_title(rom, is_cgb_rom),
            cgb_flag: is_cgb_rom,
            new_licensee_code: read_new_licensee(rom),
            sgb_flag: read_sgb_flag(rom),
            cartridge_type: rom[0x147],
            rom_size_bytes: decode_rom_size(rom[0x148]),
            ram_size_bytes: decode_ram_size(rom[0x149]),
            is_japanese: read_dest_code(rom),
            old_licensee_code: rom[0x14B],
            mask_rom_version_number: rom[0x14C],
            header_checksum: rom[0x14D],
            global_checksum: read_global_checksum(rom),
        })
    }
}

fn read_title(rom: &[u8], cgb_mode: bool) -> String {
    // CGB titles can be as short as 11 characters (the rest become flag bytes);
    // use the pessimistic (shorter) slice so we never read a CGB-only flag byte
    // as part of the title.
    let slice = if cgb_mode { &rom[0x134..=0x13E] } else { &rom[0x134..=0x143] };

    String::from_utf8_lossy(slice).trim_matches(char::from(0)).to_owned()
}

fn read_cgb_flag(rom: &[u8]) -> bool {
    matches!(rom[0x143], 0x80 | 0xC0)
}

fn read_new_licensee(rom: &[u8]) -> u16 {
    ((rom[0x144] as u16) << 8) | rom[0x145] as u16
}

fn read_sgb_flag(rom: &[u8]) -> bool {
    rom[0x146] == 0x03
}

fn read_dest_code(rom: &[u8]) -> bool {
    rom[0x14A] == 0x00
}

fn read_global_checksum(rom: &[u8]) -> u16 {
    ((rom[0x14E] as u16) << 8) | rom[0x14F] as u16
}

/// 0x148: `32KiB << n`.
fn decode_rom_size(code: u8) -> usize {
    32 * 1024 << code
}

/// 0x149: a handful of fixed sizes; codes not in the documented table fall
/// back to no RAM rather than panicking on a malformed header.
fn decode_ram_size(code: u8) -> usize {
    match code {
        0x00 => 0,
        0x01 => 2 * 1024,
        0x02 => 8 * 1024,
        0x03 => 32 * 1024,
        0x04 => 128 * 1024,
        0x05 => 64 * 1024,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_rom() -> Vec<u8> {
        vec![0u8; 0x8000]
    }

    #[test]
    fn reads_title() {
        let mut rom = blank_rom();
        for (loc, byte) in b"Hello Wor".iter().enumerate() {
            rom[0x134 + loc] = *byte;
        }
        let header = CartridgeHeader::new(&rom).unwrap();
        assert_eq!(header.title, "Hello Wor");
    }

    #[test]
    fn rom_size_code_one_is_64kib() {
        let mut rom = blank_rom();
        rom[0x148] = 0x01;
        let header = CartridgeHeader::new(&rom).unwrap();
        assert_eq!(header.rom_size_bytes, 64 * 1024);
    }

    #[test]
    fn too_short_rom_is_a_parse_error() {
        let rom = vec![0u8; 16];
        assert!(matches!(
            CartridgeHeader::new(&rom),
            Err(CoreError::RomParseError { .. })
        ));
    }
}
