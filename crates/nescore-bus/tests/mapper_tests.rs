//! Mapper test suite validation.
//!
//! Runs the Holy Mapperel and MMC3 IRQ test ROMs to validate the NROM,
//! MMC1, UxROM, CNROM, and MMC3 mapper implementations. Skipped when the
//! corresponding ROM isn't present under `test-roms/mappers/`.

mod common;

use common::{StatusResult, rom_path, run_status_rom};

/// ~20 seconds of emulated frame-equivalent polling windows.
const MAX_POLLS: u32 = 1200;

fn run_mapper_test(rom_name: &str) {
    let path = rom_path("mappers", rom_name);
    match run_status_rom(&path, MAX_POLLS) {
        None => eprintln!("skipping {rom_name}: ROM not found at {}", path.display()),
        Some(StatusResult::Pass) => println!("{rom_name}: PASS"),
        Some(StatusResult::Fail(msg)) => panic!("{rom_name}: FAIL ({msg})"),
        Some(StatusResult::Timeout) => panic!("{rom_name}: TIMEOUT"),
    }
}

// NROM (mapper 0)

#[test]
fn nrom_p32k_cr32k_v() {
    run_mapper_test("mapper_holymapperel_0_P32K_CR32K_V.nes");
}

#[test]
fn nrom_p32k_cr8k_v() {
    run_mapper_test("mapper_holymapperel_0_P32K_CR8K_V.nes");
}

// MMC1 (mapper 1)

#[test]
fn mmc1_p512k_cr8k_s32k() {
    run_mapper_test("mapper_holymapperel_1_P512K_CR8K_S32K.nes");
}

#[test]
fn mmc1_p512k_cr8k_s8k() {
    run_mapper_test("mapper_holymapperel_1_P512K_CR8K_S8K.nes");
}

#[test]
fn mmc1_p512k_s32k() {
    run_mapper_test("mapper_holymapperel_1_P512K_S32K.nes");
}

#[test]
fn mmc1_p512k_s8k() {
    run_mapper_test("mapper_holymapperel_1_P512K_S8K.nes");
}

#[test]
fn mmc1_p128k_cr8k() {
    run_mapper_test("mapper_holymapperel_1_P128K_CR8K.nes");
}

#[test]
fn mmc1_p128k() {
    run_mapper_test("mapper_holymapperel_1_P128K.nes");
}

// UxROM (mapper 2)

#[test]
fn uxrom_p128k_cr8k_v() {
    run_mapper_test("mapper_holymapperel_2_P128K_CR8K_V.nes");
}

#[test]
fn uxrom_p128k_v() {
    run_mapper_test("mapper_holymapperel_2_P128K_V.nes");
}

// MMC3 (mapper 4)

#[test]
fn mmc3_p128k_cr32k() {
    run_mapper_test("mapper_holymapperel_4_P128K_CR32K.nes");
}

#[test]
fn mmc3_p128k_cr8k() {
    run_mapper_test("mapper_holymapperel_4_P128K_CR8K.nes");
}

#[test]
fn mmc3_p128k() {
    run_mapper_test("mapper_holymapperel_4_P128K.nes");
}

#[test]
fn mmc3_p256k_c256k() {
    run_mapper_test("mapper_holymapperel_4_P256K_C256K.nes");
}

// MMC3 IRQ timing

#[test]
fn mmc3_irq_1_clocking() {
    run_mapper_test("mapper_mmc3_irq_1_clocking.nes");
}

#[test]
fn mmc3_irq_2_details() {
    run_mapper_test("mapper_mmc3_irq_2_details.nes");
}

#[test]
fn mmc3_irq_3_a12_clocking() {
    run_mapper_test("mapper_mmc3_irq_3_a12_clocking.nes");
}

#[test]
fn mmc3_irq_4_scanline_timing() {
    run_mapper_test("mapper_mmc3_irq_4_scanline_timing.nes");
}

#[test]
fn mmc3_irq_5_rev_a() {
    run_mapper_test("mapper_mmc3_irq_5_rev_a.nes");
}

#[test]
fn mmc3_irq_6_rev_b() {
    run_mapper_test("mapper_mmc3_irq_6_rev_b.nes");
}
