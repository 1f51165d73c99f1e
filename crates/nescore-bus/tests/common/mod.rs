//! Shared helpers for ROM-driven integration tests.
//!
//! Test ROMs that follow the common `$6000` status-port convention write:
//! - `$6000`: `0x80` while running, `0x00` on pass, any other code on failure
//! - `$6001-$6003`: signature bytes (`0xDE 0xB0 0x61`) once the status is final
//! - `$6004+`: a null-terminated ASCII status message
//!
//! These ROMs are not checked into the tree; tests look for them under
//! `test-roms/<category>/` at the workspace root and skip gracefully when
//! that directory (or the specific ROM) is absent.

use std::path::{Path, PathBuf};

use nescore_bus::Emulator;

/// Cycles budget for one simulated "frame" worth of polling, loosely modeled
/// on NTSC timing since there is no PPU here to drive real vblank pacing.
const CYCLES_PER_POLL: u64 = 29_780;

/// Resolve `test-roms/<category>/<name>` relative to the workspace root.
#[must_use]
pub fn rom_path(category: &str, name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("test-roms")
        .join(category)
        .join(name)
}

/// Outcome of polling a status-port ROM to completion.
pub enum StatusResult {
    Pass,
    Fail(String),
    Timeout,
}

/// Load `path`, run it until the `$6000` status port reports pass/fail, or
/// `max_polls` polling windows elapse. Returns `None` if `path` doesn't
/// exist, so callers can skip rather than fail when test ROM assets are
/// not present in the environment.
pub fn run_status_rom(path: &Path, max_polls: u32) -> Option<StatusResult> {
    if !path.exists() {
        return None;
    }

    let rom_data = std::fs::read(path).expect("failed to read test ROM");
    let mut emu = Emulator::load(&rom_data).expect("failed to load test ROM cartridge");

    for poll in 0..max_polls {
        let mut cycles_this_poll = 0u64;
        while cycles_this_poll < CYCLES_PER_POLL {
            cycles_this_poll += u64::from(emu.step());
        }

        // Give the ROM a few polling windows to initialize before trusting $6000.
        if poll < 10 {
            continue;
        }

        let status = emu.peek_memory(0x6000);
        match status {
            0x80 | 0x81 => continue,
            0x00 => return Some(StatusResult::Pass),
            _ => return Some(StatusResult::Fail(read_status_message(&emu, status))),
        }
    }

    Some(StatusResult::Timeout)
}

fn read_status_message(emu: &Emulator, status: u8) -> String {
    let sig = (
        emu.peek_memory(0x6001),
        emu.peek_memory(0x6002),
        emu.peek_memory(0x6003),
    );

    if sig != (0xDE, 0xB0, 0x61) {
        return format!("status ${status:02X} (no result signature present)");
    }

    let mut text = String::new();
    for offset in 0u16..256 {
        let ch = emu.peek_memory(0x6004 + offset);
        if ch == 0 {
            break;
        }
        if ch.is_ascii() && ch >= 0x20 {
            text.push(ch as char);
        }
    }

    if text.is_empty() {
        format!("status ${status:02X}")
    } else {
        text
    }
}
