//! The CPU is the main executor of any ROM's code, and will also keep
//! track of the cycles the CPU has performed so far.

use crate::error::CoreError;
use crate::hardware::bus::BusInterface;
use crate::hardware::cpu::execute::{InstructionAddress, JumpModifier, WrapperEnum};
use crate::hardware::cpu::traits::{SetU16, SetU8, ToU16, ToU8};
use crate::hardware::registers::Reg8::A;
use crate::hardware::registers::{Flags, Reg16, Registers};
use crate::io::interrupts::Interrupt;

use log::*;
use std::fmt::*;

#[cfg(test)]
mod tests;

mod alu;
mod execute;
mod fetch;
mod traits;

/// The five low bits of `IE`/`IF` that can ever actually wake the CPU.
const INTERRUPT_BITS: u8 = 0x1F;

#[derive(Debug)]
pub struct CPU<M: BusInterface> {
    pub cycles_performed: u128,
    pub ime: bool,
    pub halted: bool,
    pub mmu: M,
    opcode: u8,
    registers: Registers,
    delayed_ime: bool,
    pending_error: Option<CoreError>,
}

impl<M: BusInterface> CPU<M> {
    pub fn new(mmu: M) -> Self {
        let mut result = CPU {
            opcode: 0,
            registers: Registers::new(),
            mmu,
            halted: false,
            cycles_performed: 0,
            ime: false,
            delayed_ime: false,
            pending_error: None,
        };

        // Post-boot-ROM register state; this crate never emulates the boot ROM itself.
        result.registers.set_af(0x01B0);
        result.registers.set_bc(0x0013);
        result.registers.set_de(0x00D8);
        result.registers.set_hl(0x014D);
        result.registers.sp = 0xFFFE;
        result.registers.pc = 0x0100;

        result
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    /// Fetches the next instruction (or services a pending interrupt) and
    /// executes it, returning the number of T-cycles it cost.
    pub fn step_cycle(&mut self) -> Result<u32, CoreError> {
        let cycles_before = self.cycles_performed;

        if self.halted {
            if self.pending_wake_interrupt() {
                self.halted = false;
            } else {
                self.add_cycles();
                return Ok((self.cycles_performed - cycles_before) as u32);
            }
        }

        // EI only takes effect after the instruction following it has run, so
        // the interrupt check below must still see the pre-EI `ime`; the
        // delayed flag is only applied once this step's instruction is done.
        let apply_delayed_ime = self.delayed_ime;

        if self.ime && self.pending_wake_interrupt() {
            if let Some(interrupt) = self.mmu.interrupts().next_interrupt() {
                self.mmu.interrupts_mut().clear(interrupt);
                self.interrupts_routine(interrupt);
            }
        } else {
            self.opcode = self.get_instr_u8();

            trace!("Executing opcode: {:02X} - registers: {}", self.opcode, self.registers);

            self.execute(self.opcode);
        }

        if apply_delayed_ime {
            self.ime = true;
            self.delayed_ime = false;
        }

        if let Some(err) = self.pending_error.take().or_else(|| self.mmu.take_pending_error()) {
            return Err(err);
        }

        Ok((self.cycles_performed - cycles_before) as u32)
    }

    fn pending_wake_interrupt(&self) -> bool {
        (self.mmu.interrupts().interrupt_enable.bits() & self.mmu.interrupts().interrupt_flag.bits() & INTERRUPT_BITS) != 0
    }

    /// The routine to be used whenever any kind of `interrupt` is called.
    /// This will reset the `ime` flag and jump to the proper interrupt address.
    pub fn interrupts_routine(&mut self, interrupt: Interrupt) {
        debug!("Interrupt called! {:?}", interrupt);
        // Two wait cycles
        self.add_cycles();
        self.add_cycles();

        self.ime = false;
        self.halted = false;
        self.push_helper(self.registers.pc);

        self.registers.pc = interrupt.vector();
    }

    /// Pass 4 ticks
    fn nop(&mut self) {}

    /// `ld   rr,nn       x1 nn nn  12 ---- rr=nn (rr may be BC,DE,HL or SP)`
    /// OR
    /// `ld   SP,HL       F9         8 ---- SP=HL`
    fn load_16bit<T: Copy, U: Copy>(&mut self, destination: T, source: U)
    where
        Self: SetU16<T>,
        Self: ToU16<U>,
    {
        let source_value = self.read_u16_value(source);

        self.set_u16_value(destination, source_value);
    }

    /// `ld` never sets any flags.
    fn load_8bit<T: Copy, U: Copy>(&mut self, destination: T, source: U)
    where
        T: Debug,
        Self: SetU8<T>,
        Self: ToU8<U>,
    {
        let source_value = self.read_u8_value(source);

        trace!("LD {:?} 0x{:02X}", destination, source_value);

        self.set_u8_value(destination, source_value);
    }

    /// `r=r+1` OR `(HL)=(HL)+1`
    ///
    /// Flags: `z0h-`
    fn increment<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let old_value = self.read_u8_value(target);
        let new_value = old_value.wrapping_add(1);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_h((old_value & 0xF) + 0x1 > 0xF);

        self.set_u8_value(target, new_value);
    }

    /// `rr = rr+1      ;rr may be BC,DE,HL,SP`
    ///
    /// Flags: `----`
    fn increment16(&mut self, target: Reg16) {
        let new_value = self.read_u16_value(target).wrapping_add(1);

        self.set_u16_value(target, new_value);
        self.add_cycles();
    }

    /// `rotate A left; 7th bit to Carry flag`
    ///
    /// Flags: `000c` (current) OR `z00c`
    fn rlca(&mut self) {
        self.rotate_left(A);
        self.registers.set_zf(false);
    }

    /// `HL = HL+rr     ;rr may be BC,DE,HL,SP`
    ///
    /// Flags: `-0hc`
    fn add16(&mut self, target: Reg16) {
        let old_value = self.read_u16_value(target);
        let (result, overflowed) = old_value.overflowing_add(self.registers.hl());
        self.registers.set_n(false);
        self.registers.set_cf(overflowed);
        self.registers
            .set_h((old_value & 0x0FFF) + (self.registers.hl() & 0x0FFF) > 0x0FFF);

        self.registers.set_hl(result);
        self.add_cycles();
    }

    /// `r=r-1` OR `(HL)=(HL)-1`
    ///
    /// Flags: `z1h-`
    fn decrement<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let old_value = self.read_u8_value(target);
        let new_value = old_value.wrapping_sub(1);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(true);
        self.registers.set_h(old_value & 0xF == 0);

        self.set_u8_value(target, new_value);
    }

    /// `rr = rr-1      ;rr may be BC,DE,HL,SP`
    ///
    /// Flags: `----`
    fn decrement16(&mut self, target: Reg16) {
        let new_value = self.read_u16_value(target).wrapping_sub(1);

        self.set_u16_value(target, new_value);
        self.add_cycles();
    }

    /// `Rotate A right. Old bit 0 to Carry flag.`
    ///
    /// Flags: `000C`
    fn rrca(&mut self) {
        self.rotate_right(A);
        self.registers.set_zf(false);
    }

    /// low power standby mode (VERY low power)
    fn stop(&mut self) {
        warn!("STOP executed, treating as a NOP");
    }

    /// Rotate A left through Carry flag.
    ///
    /// Flags: `000C`
    fn rla(&mut self) {
        self.rotate_left_carry(A);
        self.registers.set_zf(false);
    }

    /// `jr   PC+dd` OR `jr   f,PC+dd`
    ///
    /// Add n to current address and jump to it.
    /// Conditional relative jump if nz,z,nc,c.
    ///
    /// Flags: `----`
    fn relative_jump(&mut self, condition: JumpModifier) {
        let offset = self.get_instr_u8() as i8;
        if self.matches_jmp_condition(condition) {
            self.registers.pc = self.registers.pc.wrapping_add(offset as u16);
            self.add_cycles();
        }
    }

    /// Rotate A right through Carry flag.
    ///
    /// Flags: `000C`
    fn rra(&mut self) {
        self.rotate_right_carry(A);
        self.registers.set_zf(false);
    }

    /// Decimal adjust register A so it holds a valid Binary Coded Decimal
    /// representation after an addition or subtraction.
    ///
    /// Flags: `Z-0C`
    fn daa(&mut self) {
        if !self.registers.n() {
            if self.registers.cf() || self.registers.a > 0x99 {
                self.registers.a = self.registers.a.wrapping_add(0x60);
                self.registers.set_cf(true);
            }
            if self.registers.hf() || (self.registers.a & 0x0F) > 0x09 {
                self.registers.a = self.registers.a.wrapping_add(0x06);
            }
        } else {
            if self.registers.cf() {
                self.registers.a = self.registers.a.wrapping_sub(0x60);
            }
            if self.registers.hf() {
                self.registers.a = self.registers.a.wrapping_sub(0x06);
            }
        }

        self.registers.set_zf(self.registers.a == 0);
        self.registers.set_h(false);
    }

    /// ComPLement accumulator (A = ~A).
    ///
    /// Flags: `-11-`
    fn cpl(&mut self) {
        self.registers.a = !self.registers.a;

        self.registers.set_n(true);
        self.registers.set_h(true);
    }

    /// Set Carry Flag.
    ///
    /// Flags: `-001`
    fn scf(&mut self) {
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(true);
    }

    /// Complement Carry Flag.
    ///
    /// Flags: `-00i` where `i = inverted`
    fn ccf(&mut self) {
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.f.toggle(Flags::CF);
    }

    /// `halt until interrupt occurs (low power)`
    ///
    /// Implements the documented HALT bug: if IME is disabled and an
    /// interrupt is already pending at the moment HALT executes, the CPU does
    /// not actually halt. Instead the byte after HALT is fetched and executed
    /// twice, because PC fails to advance between the two fetches.
    fn halt(&mut self) {
        if !self.ime && self.pending_wake_interrupt() {
            debug!("HALT bug triggered");
            self.registers.pc = self.registers.pc.wrapping_sub(1);
        } else {
            debug!("Entering halt");
            self.halted = true;
        }
    }

    /// `A=A+r` OR `A=A+n` OR `A=A+(HL)`
    ///
    /// Flags: `Z0HC`
    fn add<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let (new_value, overflowed) = self.registers.a.overflowing_add(value);
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_cf(overflowed);
        self.registers
            .set_h((self.registers.a & 0xF) + (value & 0xF) > 0xF);

        self.registers.a = new_value;
    }

    /// Add the value in `target` plus the carry flag to A.
    ///
    /// Flags: `Z0HC`
    fn adc<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let carry_flag = self.registers.cf() as u8;
        let new_value = self.registers.a.wrapping_add(value).wrapping_add(carry_flag);
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers
            .set_h((self.registers.a & 0xF) + (value & 0xF) + carry_flag > 0xF);
        self.registers
            .set_cf((self.registers.a as u16) + (value as u16) + carry_flag as u16 > 0xFF);

        self.registers.a = new_value;
    }

    /// Subtract the value in `target` from A.
    ///
    /// Flags: `Z1HC`
    fn sub<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let new_value = self.registers.a.wrapping_sub(value);
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(true);
        self.registers
            .set_h((self.registers.a & 0xF).wrapping_sub(value & 0xF) & 0x10 != 0);
        self.registers.set_cf(value > self.registers.a);

        self.registers.a = new_value;
    }

    /// Subtract the value in `target` and the carry flag from A.
    ///
    /// Flags: `Z1HC`
    fn sbc<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let carry_flag = self.registers.cf() as u8;
        let new_value = self.registers.a.wrapping_sub(value).wrapping_sub(carry_flag);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(true);
        self.registers
            .set_h((self.registers.a & 0xF).wrapping_sub(value & 0xF).wrapping_sub(carry_flag) & 0x10 != 0);
        self.registers
            .set_cf((value as u16 + carry_flag as u16) > self.registers.a as u16);

        self.registers.a = new_value;
    }

    /// Bitwise AND between the value in `target` and A.
    ///
    /// Flags: `Z010`
    fn and<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        self.registers.a &= self.read_u8_value(target);

        self.registers.set_zf(self.registers.a == 0);
        self.registers.set_n(false);
        self.registers.set_h(true);
        self.registers.set_cf(false);
    }

    /// Bitwise XOR between the value in `target` and A.
    ///
    /// Flags: `Z000`
    fn xor<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        self.registers.a ^= self.read_u8_value(target);

        self.registers.set_zf(self.registers.a == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(false);
    }

    /// Store into A the bitwise OR of the value in `target` and A.
    ///
    /// Flags: `Z000`
    fn or<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        self.registers.a |= self.read_u8_value(target);

        self.registers.set_zf(self.registers.a == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(false);
    }

    /// Subtract the value in `target` from A and set flags accordingly, but
    /// don't store the result. Useful for comparing values.
    ///
    /// Flags: `Z1HC`
    fn compare<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let new_value = self.registers.a.wrapping_sub(value);
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(true);
        self.registers.set_cf(value > self.registers.a);
        self.registers
            .set_h((self.registers.a & 0xF).wrapping_sub(value & 0xF) & 0x10 != 0);
    }

    /// Return from subroutine. This is basically a POP PC.
    fn ret(&mut self, target: JumpModifier) {
        // Unconditional `RET` has no condition to check and costs 16 T-cycles
        // (4 fetch + 8 pop + 4 set-PC); only `RET cc` bills the extra 4-cycle
        // condition check, taking it to 20 (taken) or leaving it at 8 (not taken).
        if !matches!(target, JumpModifier::Always) {
            self.add_cycles();
        }
        if self.matches_jmp_condition(target) {
            self.registers.pc = self.read_short_cycle(self.registers.sp);
            self.registers.sp = self.registers.sp.wrapping_add(2);
            self.add_cycles();
        }
    }

    /// Pop register `target` from the stack.
    ///
    /// Flags: `----`
    fn pop(&mut self, target: Reg16) {
        let sp_target = self.read_short_cycle(self.registers.sp);
        self.set_u16_value(target, sp_target);
        self.registers.sp = self.registers.sp.wrapping_add(2);
    }

    /// `jump to nn, PC=nn` OR `jump to HL, PC=HL` OR conditional jump.
    fn jump(&mut self, condition: JumpModifier) {
        let value = self.get_instr_u16();

        if self.matches_jmp_condition(condition) {
            self.registers.pc = if let JumpModifier::HL = condition {
                self.registers.hl()
            } else {
                value
            };

            self.add_cycles();
        }
    }

    fn matches_jmp_condition(&self, condition: JumpModifier) -> bool {
        match condition {
            JumpModifier::NotZero => !self.registers.zf(),
            JumpModifier::Zero => self.registers.zf(),
            JumpModifier::NotCarry => !self.registers.cf(),
            JumpModifier::Carry => self.registers.cf(),
            JumpModifier::Always => true,
            JumpModifier::HL => true,
        }
    }

    /// Call address n16, if condition `target` is met.
    ///
    /// Flags: `----`
    fn call(&mut self, target: JumpModifier) {
        let address = self.get_instr_u16();
        if self.matches_jmp_condition(target) {
            self.push_helper(self.registers.pc);
            self.registers.pc = address;
        }
    }

    /// Push register `target` into the stack.
    ///
    /// Flags: `----`
    fn push(&mut self, target: Reg16) {
        let value = self.read_u16_value(target);
        self.push_helper(value);
    }

    fn push_helper(&mut self, value: u16) {
        self.registers.sp = self.registers.sp.wrapping_sub(2);
        self.write_short_cycle(self.registers.sp, value);
        self.add_cycles();
    }

    /// Call address `vec`, a shorter and faster equivalent to `CALL`.
    ///
    /// Flags: `----`
    fn rst(&mut self, vec: u8) {
        self.push_helper(self.registers.pc);
        self.registers.pc = vec as u16;
    }

    /// There are a handful of opcodes the Sharp LR35902 never decodes to a
    /// real instruction. Real games never execute them; surface it as an
    /// error rather than silently doing nothing.
    fn unknown(&mut self) {
        self.pending_error = Some(CoreError::CpuIllegalOpcode {
            opcode: self.opcode,
            pc: self.registers.pc.wrapping_sub(1),
        });
    }

    /// Return from subroutine and enable interrupts, equivalent to EI then RET.
    ///
    /// Flags: `----`
    fn reti(&mut self) {
        self.ime = true;
        self.registers.pc = self.read_short_cycle(self.registers.sp);
        self.registers.sp = self.registers.sp.wrapping_add(2);
        self.add_cycles();
    }

    /// `ADD SP,e8`
    ///
    /// Flags: `00HC`
    fn add_sp(&mut self) {
        let value = self.get_instr_u8() as i8 as u16;
        let new_value = self.registers.sp.wrapping_add(value);

        self.registers.set_zf(false);
        self.registers.set_n(false);
        self.registers.set_h((self.registers.sp & 0xF) + (value & 0xF) > 0xF);
        self.registers.set_cf((self.registers.sp & 0xFF) + (value & 0xFF) > 0xFF);

        self.registers.sp = new_value;

        self.add_cycles();
        self.add_cycles();
    }

    /// `DI` - Disable Interrupts by clearing the IME flag.
    ///
    /// Flags: `----`
    fn di(&mut self) {
        self.ime = false;
        // Do not also clear IE here - that is a documented bug in other
        // implementations and a real game depends on IE surviving a DI.
    }

    /// `LD HL,SP+i8`
    ///
    /// Flags: `00HC`
    fn load_sp_i(&mut self) {
        let value = self.get_instr_u8() as i8 as u16;
        let new_value = self.registers.sp.wrapping_add(value);

        self.registers.set_hl(new_value);
        self.registers.set_zf(false);
        self.registers.set_n(false);
        self.registers.set_h((self.registers.sp & 0xF) + (value & 0xF) > 0xF);
        self.registers.set_cf((self.registers.sp & 0xFF) + (value & 0xFF) > 0xFF);

        self.add_cycles();
    }

    /// `LD SP, HL`
    ///
    /// Flags: `----`
    fn load_sp_hl(&mut self) {
        self.registers.sp = self.registers.hl();
        self.add_cycles();
    }

    /// `EI` - Enable Interrupts. The flag only actually takes effect after
    /// the instruction following EI has executed.
    fn ei(&mut self) {
        self.delayed_ime = true;
    }

    /*
       Prefixed Instructions
    */

    /// `RLC r8/[HL]`
    ///
    /// Flags: `Z00C`
    fn rlc<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.rotate_left(target);
    }

    /// `RRC r8/[HL]`
    ///
    /// Flags: `Z00C`
    fn rrc<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.rotate_right(target);
    }

    /// `RL r8/[HL]`
    ///
    /// Flags: `Z00C`
    fn rl<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.rotate_left_carry(target);
    }

    /// `RR r8/[HL]`
    ///
    /// Flags: `Z00C`
    fn rr<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.rotate_right_carry(target);
    }

    /// `SLA r8/[HL]`
    ///
    /// Flags: `Z00C`
    fn sla<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.shift_left(target);
    }

    /// `SRA r8/[HL]`
    ///
    /// Flags: `Z00C`
    fn sra<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let value = self.read_u8_value(target);
        let new_value = (value & 0x80) | value.wrapping_shr(1);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf((value & 0x1) != 0);

        self.set_u8_value(target, new_value);
    }

    /// `SWAP r8/[HL]`
    ///
    /// Flags: `Z000`
    fn swap<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let value = self.read_u8_value(target);
        let new_value = ((value & 0x0F) << 4) | ((value & 0xF0) >> 4);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(false);

        self.set_u8_value(target, new_value);
    }

    /// `SRL r8/[HL]`
    ///
    /// Flags: `Z00C`
    fn srl<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.shift_right(target);
    }

    /// `BIT u3,r8/[HL]`
    ///
    /// Flags: `Z01-`
    fn bit<T: Copy + Debug>(&mut self, bit: u8, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let bitmask = 1 << bit;

        self.registers.set_zf((value & bitmask) == 0);
        self.registers.set_n(false);
        self.registers.set_h(true)
    }

    /// `SET u3,r8/[HL]`
    ///
    /// Flags: `----`
    fn set<T: Copy>(&mut self, bit: u8, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let value = self.read_u8_value(target);
        let bitmask: u8 = 1 << bit;

        self.set_u8_value(target, value | bitmask);
    }

    /// `RES u3,r8/[HL]`
    ///
    /// Flags: `----`
    fn res<T: Copy>(&mut self, bit: u8, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let value = self.read_u8_value(target);
        let bit_mask: u8 = 0x1 << bit;

        self.set_u8_value(target, value & !bit_mask);
    }
}
