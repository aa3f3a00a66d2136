//! The register file: `A,B,C,D,E,H,L` plus the flags register `F`, the 16-bit
//! `SP`/`PC`, and the `Reg8`/`Reg16` addressing enums the decode tables index
//! into.

use bitflags::bitflags;
use std::fmt;
use std::fmt::{Display, Formatter};

bitflags! {
    #[derive(Default)]
    pub struct Flags: u8 {
        const ZF = 0b1000_0000;
        const N  = 0b0100_0000;
        const H  = 0b0010_0000;
        const CF = 0b0001_0000;
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Reg8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
}

#[derive(Debug, Default, Clone)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub f: Flags,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    pub fn new() -> Self {
        Registers::default()
    }

    pub fn af(&self) -> u16 {
        (self.a as u16) << 8 | self.f.bits() as u16
    }

    pub fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    pub fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    pub fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.f = Flags::from_bits_truncate((value & 0xF0) as u8);
    }

    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = (value & 0xFF) as u8;
    }

    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = (value & 0xFF) as u8;
    }

    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = (value & 0xFF) as u8;
    }

    pub fn zf(&self) -> bool {
        self.f.contains(Flags::ZF)
    }

    pub fn n(&self) -> bool {
        self.f.contains(Flags::N)
    }

    pub fn hf(&self) -> bool {
        self.f.contains(Flags::H)
    }

    pub fn cf(&self) -> bool {
        self.f.contains(Flags::CF)
    }

    pub fn set_zf(&mut self, set: bool) {
        self.f.set(Flags::ZF, set);
    }

    pub fn set_n(&mut self, set: bool) {
        self.f.set(Flags::N, set);
    }

    pub fn set_h(&mut self, set: bool) {
        self.f.set(Flags::H, set);
    }

    pub fn set_cf(&mut self, set: bool) {
        self.f.set(Flags::CF, set);
    }
}

impl Display for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AF: {:04X} BC: {:04X} DE: {:04X} HL: {:04X} SP: {:04X} PC: {:04X}",
            self.af(),
            self.bc(),
            self.de(),
            self.hl(),
            self.sp,
            self.pc
        )
    }
}
