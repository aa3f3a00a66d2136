//! The memory bus: owns every addressable device and decodes the full
//! 16-bit address space onto them.
//!
//! An address-range -> handler table registered at construction time would
//! need each handler to close over a `&mut` borrow of its device while the
//! bus holds `&mut self` for the whole dispatch -- that falls apart the
//! moment two handlers need simultaneous access, as OAM DMA does, reading
//! one device and writing another in the same tick. This `Bus` instead owns
//! every device as a plain field and dispatches with a `match` on the
//! address, which compiles to the same decode logic without an indirection
//! table. [`ADDRESS_RANGES`] documents the same ranges the match encodes, and
//! [`Bus::new`] asserts they don't overlap, rejecting a conflict as
//! [`CoreError::BusMappingConflict`] the way a registration-time check would.

use crate::error::CoreError;
use crate::hardware::cartridge::Cartridge;
use crate::hardware::hram::{Hram, HRAM_START};
use crate::hardware::ppu::dma::OamDma;
use crate::hardware::ppu::memory_binds::{DMA_TRANSFER, LY_REGISTER, OAM_END, OAM_START, VRAM_END, VRAM_START};
use crate::hardware::ppu::palette::DisplayColour;
use crate::hardware::ppu::Ppu;
use crate::hardware::wram::{Wram, ECHO_END, ECHO_START, WRAM_END, WRAM_START};
use crate::io::interrupts::{Interrupt, Interrupts};
use crate::io::io_registers::IoRegisters;
use crate::io::joypad::{InputKey, Joypad, JOYPAD_ADDRESS};
use crate::io::timer;
use crate::io::timer::Timer;

/// The address ranges `Bus::read_byte`/`write_byte` decode, documented (and
/// checked for overlap in `Bus::new`) independently of the `match` itself so
/// a future range edit that overlaps an existing one fails loudly instead of
/// silently shadowing a device.
const ADDRESS_RANGES: &[(u16, u16, &str)] = &[
    (0x0000, 0x7FFF, "cartridge ROM"),
    (VRAM_START, VRAM_END, "vram"),
    (0xA000, 0xBFFF, "cartridge RAM"),
    (WRAM_START, WRAM_END, "wram"),
    (ECHO_START, ECHO_END, "echo ram"),
    (OAM_START, OAM_END, "oam"),
    (0xFEA0, 0xFEFF, "unusable"),
    (JOYPAD_ADDRESS, JOYPAD_ADDRESS, "joypad"),
    (0xFF01, 0xFF02, "serial"),
    (timer::DIV_ADDRESS, timer::TAC_ADDRESS, "timer"),
    (0xFF0F, 0xFF0F, "interrupt flag"),
    (0xFF10, 0xFF3F, "sound/wave (unmodeled)"),
    (0xFF40, 0xFF45, "ppu registers"),
    (DMA_TRANSFER, DMA_TRANSFER, "oam dma"),
    (0xFF47, 0xFF4B, "ppu palettes/window"),
    (0xFF4C, 0xFF7F, "unmodeled io"),
    (HRAM_START, 0xFFFE, "hram"),
    (0xFFFF, 0xFFFF, "interrupt enable"),
];

pub trait BusInterface {
    fn read_byte(&mut self, address: u16) -> u8;
    fn write_byte(&mut self, address: u16, value: u8);
    fn interrupts(&self) -> &Interrupts;
    fn interrupts_mut(&mut self) -> &mut Interrupts;
    /// Takes the error (if any) raised by the most recent `write_byte`, the
    /// way [`CPU::pending_error`] surfaces `CpuIllegalOpcode` through an
    /// infallible `step_cycle`.
    fn take_pending_error(&mut self) -> Option<CoreError>;
}

#[derive(Debug)]
pub struct Bus {
    cartridge: Cartridge,
    wram: Wram,
    hram: Hram,
    io: IoRegisters,
    interrupts: Interrupts,
    timer: Timer,
    ppu: Ppu,
    oam_dma: OamDma,
    joypad: Joypad,
    /// A byte latched here whenever a write to SC (0xFF02) sets the transfer
    /// trigger bit; drained once per step by `registerSerialSink`'s host.
    pending_serial: Option<u8>,
    /// Set by `write_byte` on a write to a truly read-only region (e.g. LY);
    /// taken and surfaced by the CPU the same way it surfaces its own
    /// `CpuIllegalOpcode`.
    pending_error: Option<CoreError>,
}

impl Bus {
    pub fn new(rom: Vec<u8>, display_colours: DisplayColour) -> Result<Self, CoreError> {
        check_ranges()?;

        Ok(Bus {
            cartridge: Cartridge::new(rom)?,
            wram: Wram::new(),
            hram: Hram::new(),
            io: IoRegisters::new(),
            interrupts: Interrupts::new(),
            timer: Timer::new(),
            ppu: Ppu::new(display_colours),
            oam_dma: OamDma::new(),
            joypad: Joypad::new(),
            pending_serial: None,
            pending_error: None,
        })
    }

    /// Takes the byte latched by the most recent SB/SC transfer trigger, if any.
    pub fn take_pending_serial(&mut self) -> Option<u8> {
        self.pending_serial.take()
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn take_frame_complete(&mut self) -> bool {
        self.ppu.take_frame_complete()
    }

    pub fn press_key(&mut self, key: InputKey) {
        let was_pressed = self.joypad.any_selected_pressed();
        self.joypad.press_key(key);
        if !was_pressed && self.joypad.any_selected_pressed() {
            self.interrupts.request(Interrupt::Joypad);
        }
    }

    pub fn release_key(&mut self, key: InputKey) {
        self.joypad.release_key(key);
    }

    pub fn set_joypad_state(&mut self, byte: u8) {
        let was_pressed = self.joypad.any_selected_pressed();
        self.joypad.set_state(byte);
        if !was_pressed && self.joypad.any_selected_pressed() {
            self.interrupts.request(Interrupt::Joypad);
        }
    }

    /// Ticks the timer, PPU, and OAM DMA engine by `t_cycles`, the count the
    /// CPU's last step reported -- the fixed per-step ordering §5 of the
    /// execution model specifies.
    pub fn step_peripherals(&mut self, t_cycles: u32) {
        if let Some(interrupt) = self.timer.update(t_cycles) {
            self.interrupts.request(interrupt);
        }

        self.ppu.tick(t_cycles, &mut self.interrupts);

        let m_cycles = t_cycles / 4;
        let Bus { oam_dma, ppu, cartridge, wram, .. } = self;
        oam_dma.tick(
            m_cycles,
            |address| match address {
                0x0000..=0x7FFF => cartridge.read_rom(address),
                0xA000..=0xBFFF => cartridge.read_ram(address),
                WRAM_START..=WRAM_END => wram.read_byte(address),
                _ => 0xFF,
            },
            |offset, value| ppu.write_oam_raw(offset, value),
        );
    }

    fn oam_dma_blocks_reads(&self, address: u16) -> bool {
        self.oam_dma.is_active() && !(HRAM_START..=0xFFFE).contains(&address)
    }
}

impl BusInterface for Bus {
    fn read_byte(&mut self, address: u16) -> u8 {
        if self.oam_dma_blocks_reads(address) {
            return 0xFF;
        }

        match address {
            0x0000..=0x7FFF => self.cartridge.read_rom(address),
            VRAM_START..=VRAM_END => self.ppu.read_vram(address),
            0xA000..=0xBFFF => self.cartridge.read_ram(address),
            WRAM_START..=WRAM_END => self.wram.read_byte(address),
            ECHO_START..=ECHO_END => self.wram.read_echo(address),
            OAM_START..=OAM_END => self.ppu.read_oam(address),
            0xFEA0..=0xFEFF => 0xFF,
            JOYPAD_ADDRESS => self.joypad.read(),
            timer::DIV_ADDRESS => self.timer.div(),
            timer::TIMA_ADDRESS => self.timer.tima(),
            timer::TMA_ADDRESS => self.timer.tma(),
            timer::TAC_ADDRESS => self.timer.tac(),
            0xFF0F => self.interrupts.read_if(),
            0xFF40..=0xFF45 | 0xFF47..=0xFF4B => self.ppu.read_register(address),
            DMA_TRANSFER => 0xFF,
            HRAM_START..=0xFFFE => self.hram.read_byte(address),
            0xFFFF => self.interrupts.read_ie(),
            _ => self.io.read_byte(address),
        }
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        // LY is the spec's example of a region "truly read-only": unlike MBC
        // control-register writes, which are accepted silently, a write here
        // must raise instead of being dropped.
        if address == LY_REGISTER {
            self.pending_error = Some(CoreError::BusInvalidAddress { address });
            return;
        }

        match address {
            0x0000..=0x7FFF => self.cartridge.write_register(address, value),
            VRAM_START..=VRAM_END => self.ppu.write_vram(address, value),
            0xA000..=0xBFFF => self.cartridge.write_ram(address, value),
            WRAM_START..=WRAM_END => self.wram.write_byte(address, value),
            ECHO_START..=ECHO_END => self.wram.write_echo(address, value),
            OAM_START..=OAM_END => self.ppu.write_oam(address, value),
            0xFEA0..=0xFEFF => {}
            JOYPAD_ADDRESS => self.joypad.write(value),
            timer::DIV_ADDRESS => self.timer.write_div(),
            timer::TIMA_ADDRESS => self.timer.write_tima(value),
            timer::TMA_ADDRESS => self.timer.write_tma(value),
            timer::TAC_ADDRESS => self.timer.write_tac(value),
            0xFF02 => {
                self.io.write_byte(address, value);
                if value & 0x80 != 0 {
                    self.pending_serial = Some(self.io.read_byte(0xFF01));
                }
            }
            0xFF0F => self.interrupts.write_if(value),
            0xFF40..=0xFF45 | 0xFF47..=0xFF4B => self.ppu.write_register(address, value),
            DMA_TRANSFER => self.oam_dma.start(value),
            HRAM_START..=0xFFFE => self.hram.write_byte(address, value),
            0xFFFF => self.interrupts.write_ie(value),
            _ => self.io.write_byte(address, value),
        }
    }

    fn interrupts(&self) -> &Interrupts {
        &self.interrupts
    }

    fn interrupts_mut(&mut self) -> &mut Interrupts {
        &mut self.interrupts
    }

    fn take_pending_error(&mut self) -> Option<CoreError> {
        self.pending_error.take()
    }
}

fn check_ranges() -> Result<(), CoreError> {
    for (i, &(start_a, end_a, _)) in ADDRESS_RANGES.iter().enumerate() {
        for &(start_b, end_b, _) in &ADDRESS_RANGES[i + 1..] {
            if start_a <= end_b && start_b <= end_a {
                return Err(CoreError::BusMappingConflict { start: start_a, end: end_a });
            }
        }
    }
    Ok(())
}
