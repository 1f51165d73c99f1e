//! NES address buses and cartridge loading: wires the CPU core to mappers.
//!
//! This crate provides the CPU-side and PPU-side memory maps (`MainBus` and
//! `PictureBus`), the iNES/NES 2.0 cartridge loader (`Cartridge`), and the
//! `Emulator` facade that drives a 6502 instruction at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Emulator                          │
//! │  ┌──────────┐   ┌───────────┐   ┌──────────────────────┐ │
//! │  │   CPU    │──▶│  MainBus  │──▶│  Cartridge (Mapper)  │ │
//! │  │  6502    │   │ RAM/PPU/IO│   └──────────────────────┘ │
//! │  └──────────┘   └───────────┘              ▲             │
//! │                                             │             │
//! │                                   ┌─────────┴─────────┐   │
//! │                                   │    PictureBus      │   │
//! │                                   │ CHR/nametable/pal. │   │
//! │                                   └─────────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The PPU pixel pipeline and APU audio synthesis are external collaborators
//! (see [`ports`]); `Emulator` reserves a framebuffer but never renders into
//! it itself.
//!
//! # Usage
//!
//! ```no_run
//! use nescore_bus::Emulator;
//!
//! let rom_data = std::fs::read("game.nes").expect("failed to read ROM");
//! let mut emu = Emulator::load(&rom_data).expect("failed to load cartridge");
//!
//! emu.reset();
//! for _ in 0..29_780 {
//!     emu.cycle();
//! }
//! let _framebuffer = emu.framebuffer();
//! ```
//!
//! # Features
//!
//! - `std` (default): enable standard library support.
//! - `serde`: enable serialization for `Mirroring`/`RomHeader`/cartridge metadata.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod cartridge;
mod emulator;
mod input;
mod main_bus;
mod picture_bus;
mod ports;

pub use cartridge::{Cartridge, LoadError};
pub use emulator::{Emulator, screen, timing};
pub use input::{Button, Controller, StandardIoPort};
pub use main_bus::MainBus;
pub use picture_bus::PictureBus;
pub use ports::{IoPort, NullPort, PpuPort};

// Re-export the types needed to integrate with the rest of the core.
pub use nescore_cpu::Cpu;
pub use nescore_mappers::{Mapper, Mirroring, Rom, RomError, RomFormat, RomHeader, create_mapper};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    fn nrom_bytes() -> Vec<u8> {
        let mut data = vec![0u8; 16 + 16384 + 8192];
        data[0..4].copy_from_slice(&[0x4E, 0x45, 0x53, 0x1A]);
        data[4] = 1; // 16 KiB PRG
        data[5] = 1; // 8 KiB CHR
        data[16 + 0x3FFC] = 0x00; // reset vector low (mirrors to $FFFC)
        data[16 + 0x3FFD] = 0xC0; // reset vector high -> $C000
        data
    }

    #[test]
    fn load_and_reset_via_public_api() {
        let mut emu = Emulator::load(&nrom_bytes()).unwrap();
        assert_eq!(emu.mapper_number(), 0);
        assert_eq!(emu.mapper_name(), "NROM");
        assert_eq!(emu.cpu().pc, 0xC000);

        emu.step();
        assert!(emu.total_cycles() > 0);
    }

    #[test]
    fn screen_and_timing_constants() {
        assert_eq!(screen::WIDTH, 256);
        assert_eq!(screen::HEIGHT, 240);
        assert_eq!(screen::PIXELS, 61_440);
        assert_eq!(timing::CPU_CYCLES_PER_FRAME, 29_780);
    }

    #[test]
    fn controller_buttons_roundtrip() {
        let mut emu = Emulator::load(&nrom_bytes()).unwrap();
        emu.controller_press(0, Button::Start);
        emu.controller_release(0, Button::Start);
    }
}
