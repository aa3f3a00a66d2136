//! End-to-end scenarios driving the CPU and bus together, in the style of the
//! Blargg CPU-instruction test ROMs: a handful of bytes dropped at 0x0100 and
//! run for a fixed cycle budget, then the resulting register/memory state
//! checked directly.

use dmg_core::hardware::bus::{Bus, BusInterface};
use dmg_core::hardware::cpu::CPU;
use dmg_core::hardware::ppu::palette::DisplayColour;

/// A 32 KiB ROM (no MBC) with `code` dropped at 0x0100 and a valid-enough
/// header for `Cartridge::new` to accept it.
fn rom_with_code(code: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x148] = 0x00; // 32 KiB, matches the buffer's actual length
    rom[0x149] = 0x00; // no external RAM
    rom[0x100..0x100 + code.len()].copy_from_slice(code);
    rom
}

fn cpu_with_code(code: &[u8]) -> CPU<Bus> {
    let bus = Bus::new(rom_with_code(code), DisplayColour::default()).unwrap();
    CPU::new(bus)
}

/// Steps the CPU until at least `min_cycles` T-cycles have elapsed, draining
/// each instruction's cycles into the bus's peripherals exactly as
/// `Emulator::step` does.
fn run_cycles(cpu: &mut CPU<Bus>, min_cycles: u32) -> u32 {
    let mut total = 0;
    while total < min_cycles {
        let cycles = cpu.step_cycle().unwrap();
        cpu.mmu.step_peripherals(cycles);
        total += cycles;
    }
    total
}

#[test]
fn nop_advances_pc_and_consumes_four_cycles() {
    let mut cpu = cpu_with_code(&[0x00]); // NOP

    let cycles = run_cycles(&mut cpu, 4);

    assert_eq!(cycles, 4);
    assert_eq!(cpu.registers().pc, 0x0101);
}

#[test]
fn ld_a_d8_loads_the_immediate() {
    let mut cpu = cpu_with_code(&[0x3E, 0x42]); // LD A,0x42

    run_cycles(&mut cpu, 8);

    assert_eq!(cpu.registers().a, 0x42);
    assert_eq!(cpu.registers().pc, 0x0102);
}

#[test]
fn ld_a_ff_then_ld_b_one_then_add_a_b_overflows_to_zero() {
    // LD A,0xFF; LD B,0x01; ADD A,B
    let mut cpu = cpu_with_code(&[0x3E, 0xFF, 0x06, 0x01, 0x80]);

    run_cycles(&mut cpu, 8 + 8 + 4);

    assert_eq!(cpu.registers().a, 0x00);
    assert!(cpu.registers().zf());
    assert!(cpu.registers().cf());
    assert!(cpu.registers().hf());
    assert!(!cpu.registers().n());
}

#[test]
fn jp_imm16_sets_pc() {
    let mut cpu = cpu_with_code(&[0xC3, 0x34, 0x12]); // JP 0x1234

    run_cycles(&mut cpu, 16);

    assert_eq!(cpu.registers().pc, 0x1234);
}

#[test]
fn div_register_is_the_high_byte_of_the_internal_counter() {
    let mut cpu = cpu_with_code(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    // 63 NOPs' worth of cycles (252 T-cycles) isn't enough to flip DIV...
    run_cycles(&mut cpu, 252);
    assert_eq!(cpu.mmu.read_byte(0xFF04), 0);

    // ...but 4 more T-cycles crosses the 256-cycle boundary.
    run_cycles(&mut cpu, 4);
    assert_eq!(cpu.mmu.read_byte(0xFF04), 1);
}

#[test]
fn timer_overflow_requests_an_interrupt_that_is_serviced_once_ime_is_on() {
    // EI; NOP; then an idle loop so there's always an instruction to fetch
    // while we wait out the timer.
    let mut cpu = cpu_with_code(&[0xFB, 0x00, 0x18, 0xFE]); // EI; NOP; JR -2 (spin)

    // EI takes effect only after the instruction following it finishes.
    run_cycles(&mut cpu, 4); // EI
    run_cycles(&mut cpu, 4); // NOP -- IME becomes true now
    assert!(cpu.ime);

    cpu.mmu.write_byte(0xFFFF, 0x04); // IE: Timer enabled
    cpu.mmu.write_byte(0xFF06, 0x01); // TMA
    cpu.mmu.write_byte(0xFF07, 0b100); // TAC: enabled, 4096 Hz (bit 9 watched)
    cpu.mmu.write_byte(0xFF05, 0xFF); // TIMA, one tick from overflow

    // Drains the JR -2 spin loop until TIMA overflows and reloads from TMA,
    // requesting Interrupt::Timer via IF.
    run_cycles(&mut cpu, 1024);

    // The very next step now sees IME && pending, and services the interrupt
    // instead of continuing the spin loop.
    run_cycles(&mut cpu, 4);

    assert_eq!(cpu.registers().pc, 0x0050);
    assert!(!cpu.ime);
}

#[test]
fn call_then_ret_restores_pc_to_the_instruction_after_call() {
    // CALL 0x0200; at 0x0200: RET. The byte after CALL's 3 bytes is 0x0103.
    let mut cpu = cpu_with_code(&[0xCD, 0x00, 0x02]);
    cpu.mmu.write_byte(0x0200, 0xC9); // RET

    run_cycles(&mut cpu, 24 + 16);

    assert_eq!(cpu.registers().pc, 0x0103);
}

#[test]
fn push_pop_round_trips_af_with_flag_nibble_zeroed() {
    let mut cpu = cpu_with_code(&[0xF5, 0xF1]); // PUSH AF; POP AF
    cpu.registers_mut().set_af(0x12FF); // low nibble of F would be masked on read anyway
    let expected = cpu.registers().af();

    run_cycles(&mut cpu, 16 + 12);

    assert_eq!(cpu.registers().af(), expected);
    assert_eq!(cpu.registers().af() & 0x0F, 0);
}
