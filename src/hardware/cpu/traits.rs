//! Small addressing-mode traits so the same ALU/load helper can be generic over
//! a plain register, an `(HL)` indirection, or an immediate operand.
//!
//! The concrete implementations live here too, rather than scattered across
//! `mod.rs`/`execute.rs`, so the full addressing-mode table is visible in one
//! place.

use crate::hardware::bus::BusInterface;
use crate::hardware::cpu::execute::{InstructionAddress, WrapperEnum};
use crate::hardware::cpu::CPU;
use crate::hardware::registers::{Reg16, Reg8};

pub trait ToU8<T: Copy> {
    fn read_u8_value(&mut self, target: T) -> u8;
}

pub trait SetU8<T: Copy> {
    fn set_u8_value(&mut self, target: T, value: u8);
}

pub trait ToU16<T: Copy> {
    fn read_u16_value(&mut self, target: T) -> u16;
}

pub trait SetU16<T: Copy> {
    fn set_u16_value(&mut self, target: T, value: u16);
}

impl<M: BusInterface> ToU8<Reg8> for CPU<M> {
    fn read_u8_value(&mut self, target: Reg8) -> u8 {
        match target {
            Reg8::A => self.registers().a,
            Reg8::B => self.registers().b,
            Reg8::C => self.registers().c,
            Reg8::D => self.registers().d,
            Reg8::E => self.registers().e,
            Reg8::H => self.registers().h,
            Reg8::L => self.registers().l,
        }
    }
}

impl<M: BusInterface> SetU8<Reg8> for CPU<M> {
    fn set_u8_value(&mut self, target: Reg8, value: u8) {
        let registers = self.registers_mut();
        match target {
            Reg8::A => registers.a = value,
            Reg8::B => registers.b = value,
            Reg8::C => registers.c = value,
            Reg8::D => registers.d = value,
            Reg8::E => registers.e = value,
            Reg8::H => registers.h = value,
            Reg8::L => registers.l = value,
        }
    }
}

impl<M: BusInterface> ToU16<Reg16> for CPU<M> {
    fn read_u16_value(&mut self, target: Reg16) -> u16 {
        match target {
            Reg16::AF => self.registers().af(),
            Reg16::BC => self.registers().bc(),
            Reg16::DE => self.registers().de(),
            Reg16::HL => self.registers().hl(),
            Reg16::SP => self.registers().sp,
        }
    }
}

impl<M: BusInterface> SetU16<Reg16> for CPU<M> {
    fn set_u16_value(&mut self, target: Reg16, value: u16) {
        let registers = self.registers_mut();
        match target {
            Reg16::AF => registers.set_af(value),
            Reg16::BC => registers.set_bc(value),
            Reg16::DE => registers.set_de(value),
            Reg16::HL => registers.set_hl(value),
            Reg16::SP => registers.sp = value,
        }
    }
}

impl<M: BusInterface> ToU8<InstructionAddress> for CPU<M> {
    fn read_u8_value(&mut self, target: InstructionAddress) -> u8 {
        use InstructionAddress::*;
        match target {
            BCI => {
                let address = self.registers().bc();
                self.read_byte_cycle(address)
            }
            DEI => {
                let address = self.registers().de();
                self.read_byte_cycle(address)
            }
            HLI => {
                let address = self.registers().hl();
                self.read_byte_cycle(address)
            }
            HLIP => {
                let address = self.registers().hl();
                let value = self.read_byte_cycle(address);
                self.registers_mut().set_hl(address.wrapping_add(1));
                value
            }
            HLIN => {
                let address = self.registers().hl();
                let value = self.read_byte_cycle(address);
                self.registers_mut().set_hl(address.wrapping_sub(1));
                value
            }
            DIRECT => self.get_instr_u8(),
            DirectMem => {
                let address = self.get_instr_u16();
                self.read_byte_cycle(address)
            }
            IoDirect => {
                let offset = self.get_instr_u8();
                self.read_byte_cycle(0xFF00 | offset as u16)
            }
            IoC => {
                let offset = self.registers().c;
                self.read_byte_cycle(0xFF00 | offset as u16)
            }
        }
    }
}

impl<M: BusInterface> SetU8<InstructionAddress> for CPU<M> {
    fn set_u8_value(&mut self, target: InstructionAddress, value: u8) {
        use InstructionAddress::*;
        match target {
            BCI => {
                let address = self.registers().bc();
                self.write_byte_cycle(address, value);
            }
            DEI => {
                let address = self.registers().de();
                self.write_byte_cycle(address, value);
            }
            HLI => {
                let address = self.registers().hl();
                self.write_byte_cycle(address, value);
            }
            HLIP => {
                let address = self.registers().hl();
                self.write_byte_cycle(address, value);
                self.registers_mut().set_hl(address.wrapping_add(1));
            }
            HLIN => {
                let address = self.registers().hl();
                self.write_byte_cycle(address, value);
                self.registers_mut().set_hl(address.wrapping_sub(1));
            }
            DirectMem => {
                let address = self.get_instr_u16();
                self.write_byte_cycle(address, value);
            }
            IoDirect => {
                let offset = self.get_instr_u8();
                self.write_byte_cycle(0xFF00 | offset as u16, value);
            }
            IoC => {
                let offset = self.registers().c;
                self.write_byte_cycle(0xFF00 | offset as u16, value);
            }
            DIRECT => unreachable!("an immediate operand can never be a write destination"),
        }
    }
}

impl<M: BusInterface> ToU16<InstructionAddress> for CPU<M> {
    fn read_u16_value(&mut self, target: InstructionAddress) -> u16 {
        match target {
            InstructionAddress::DIRECT => self.get_instr_u16(),
            other => unreachable!("{:?} is not used as a 16-bit read source", other),
        }
    }
}

impl<M: BusInterface> SetU16<InstructionAddress> for CPU<M> {
    fn set_u16_value(&mut self, target: InstructionAddress, value: u16) {
        match target {
            InstructionAddress::DirectMem => {
                let address = self.get_instr_u16();
                self.write_short_cycle(address, value);
            }
            other => unreachable!("{:?} is not used as a 16-bit write destination", other),
        }
    }
}

impl<M: BusInterface> ToU8<WrapperEnum> for CPU<M> {
    fn read_u8_value(&mut self, target: WrapperEnum) -> u8 {
        match target {
            WrapperEnum::Reg8(reg) => self.read_u8_value(reg),
            WrapperEnum::InstructionAddress(addr) => self.read_u8_value(addr),
        }
    }
}

impl<M: BusInterface> SetU8<WrapperEnum> for CPU<M> {
    fn set_u8_value(&mut self, target: WrapperEnum, value: u8) {
        match target {
            WrapperEnum::Reg8(reg) => self.set_u8_value(reg, value),
            WrapperEnum::InstructionAddress(addr) => self.set_u8_value(addr, value),
        }
    }
}
