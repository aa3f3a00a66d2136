//! The orchestrator tying CPU, bus, and callbacks together for a host to
//! drive one instruction (or a whole frame) at a time.

use crate::error::CoreError;
use crate::hardware::bus::{Bus, BusInterface};
use crate::hardware::cpu::CPU;
use crate::hardware::ppu::FRAMEBUFFER_BYTES;
use crate::io::joypad::InputKey;
use crate::EmulatorOptions;

/// T-cycles in one 59.7 Hz frame: 70224 dots at 1 dot/T-cycle.
pub const CYCLES_PER_FRAME: u32 = 70224;

type FrameCallback = Box<dyn FnMut(&[u8; FRAMEBUFFER_BYTES])>;
type SerialCallback = Box<dyn FnMut(u8)>;

pub struct Emulator {
    cpu: CPU<Bus>,
    frame_callback: Option<FrameCallback>,
    serial_callback: Option<SerialCallback>,
}

impl Emulator {
    pub fn new(rom: Vec<u8>, options: EmulatorOptions) -> Result<Self, CoreError> {
        let bus = Bus::new(rom, options.display_colours)?;
        Ok(Emulator {
            cpu: CPU::new(bus),
            frame_callback: None,
            serial_callback: None,
        })
    }

    /// Parses `rom`'s header, picks its MBC, and replaces the bus and CPU
    /// state wholesale -- equivalent to a power cycle with a new cartridge.
    pub fn load_rom(&mut self, rom: Vec<u8>, options: EmulatorOptions) -> Result<(), CoreError> {
        let bus = Bus::new(rom, options.display_colours)?;
        self.cpu = CPU::new(bus);
        self.frame_callback = None;
        self.serial_callback = None;
        Ok(())
    }

    pub fn register_frame_callback(&mut self, callback: impl FnMut(&[u8; FRAMEBUFFER_BYTES]) + 'static) {
        self.frame_callback = Some(Box::new(callback));
    }

    pub fn register_serial_sink(&mut self, callback: impl FnMut(u8) + 'static) {
        self.serial_callback = Some(Box::new(callback));
    }

    /// Runs one CPU step (an instruction, or servicing an interrupt), then
    /// drives the timer/PPU/DMA by the same T-cycle count, in that order.
    fn step_instruction(&mut self) -> Result<u32, CoreError> {
        let cycles = self.cpu.step_cycle()?;
        self.cpu.mmu.step_peripherals(cycles);

        if self.cpu.mmu.take_frame_complete() {
            if let Some(callback) = &mut self.frame_callback {
                callback(self.cpu.mmu.ppu().framebuffer());
            }
        }

        if let Some(byte) = self.cpu.mmu.take_pending_serial() {
            if let Some(callback) = &mut self.serial_callback {
                callback(byte);
            }
        }

        Ok(cycles)
    }

    /// Executes instructions until at least `min_cycles_to_run` T-cycles
    /// have elapsed, returning the actual number consumed (which may
    /// overshoot, since instructions aren't interruptible mid-execution).
    pub fn step(&mut self, min_cycles_to_run: u32) -> Result<u32, CoreError> {
        let mut cycles = 0u32;
        while cycles < min_cycles_to_run {
            cycles += self.step_instruction()?;
        }
        Ok(cycles)
    }

    /// Steps until a frame has completed (one VBlank entry): `step(CYCLES_PER_FRAME)`.
    pub fn run_to_vblank(&mut self) -> Result<u32, CoreError> {
        self.step(CYCLES_PER_FRAME)
    }

    pub fn framebuffer(&self) -> &[u8; FRAMEBUFFER_BYTES] {
        self.cpu.mmu.ppu().framebuffer()
    }

    pub fn press_key(&mut self, key: InputKey) {
        self.cpu.mmu.press_key(key);
    }

    pub fn release_key(&mut self, key: InputKey) {
        self.cpu.mmu.release_key(key);
    }

    pub fn set_joypad_state(&mut self, byte: u8) {
        self.cpu.mmu.set_joypad_state(byte);
    }

    pub fn read_byte(&mut self, address: u16) -> u8 {
        self.cpu.mmu.read_byte(address)
    }

    /// Exposed for debug UIs. Drains the bus's `pending_error` slot itself so
    /// a write rejected here (e.g. to LY) doesn't linger and get misattributed
    /// to the next `step`.
    pub fn write_byte(&mut self, address: u16, value: u8) -> Result<(), CoreError> {
        self.cpu.mmu.write_byte(address, value);
        match self.cpu.mmu.take_pending_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
