//! Top-level emulator facade: owns the cartridge, CPU, and both address buses.

use nescore_cpu::Cpu;

use crate::cartridge::{Cartridge, LoadError};
use crate::input::{Button, StandardIoPort};
use crate::main_bus::MainBus;
use crate::picture_bus::PictureBus;
use crate::ports::PpuPort;

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

/// NES screen dimensions.
pub mod screen {
    /// Screen width in pixels.
    pub const WIDTH: usize = 256;
    /// Screen height in pixels.
    pub const HEIGHT: usize = 240;
    /// Total pixels per frame.
    pub const PIXELS: usize = WIDTH * HEIGHT;
}

/// NES emulation timing constants (NTSC).
pub mod timing {
    /// Master clock frequency.
    pub const MASTER_CLOCK_NTSC: u32 = 21_477_272;
    /// CPU clock frequency, derived from the master clock.
    pub const CPU_CLOCK_NTSC: u32 = MASTER_CLOCK_NTSC / 12;
    /// PPU dots per CPU cycle.
    pub const PPU_DOTS_PER_CPU_CYCLE: u32 = 3;
    /// CPU cycles per frame.
    pub const CPU_CYCLES_PER_FRAME: u32 = 29_780;
}

/// `PpuPort` collaborator that does nothing beyond reserving the framebuffer.
///
/// Per the documented decision that the PPU pixel pipeline is out of scope,
/// this core never writes a non-zero pixel; a real front end supplies its
/// own [`PpuPort`] implementation (and usually its own `Emulator`-equivalent
/// wiring) to render frames. This stub exists so `Emulator` is directly
/// usable for CPU/mapper-correctness testing without a PPU attached.
#[derive(Debug, Clone, Copy, Default)]
struct HeadlessPpuPort;

impl PpuPort for HeadlessPpuPort {
    fn read_register(&mut self, _addr: u16) -> u8 {
        0
    }

    fn write_register(&mut self, _addr: u16, _value: u8) {}

    fn write_oam_byte(&mut self, _offset: u8, _value: u8) {}
}

/// Owns a cartridge, the CPU, and both address buses; advances the machine
/// one CPU cycle at a time.
pub struct Emulator {
    cpu: Cpu,
    cartridge: Cartridge,
    ram: [u8; 0x0800],
    ppu: HeadlessPpuPort,
    io: StandardIoPort,
    picture_bus: PictureBus,
    framebuffer: Box<[u32; screen::PIXELS]>,
    total_cycles: u64,
}

impl Emulator {
    /// Parse `rom_bytes` and construct an emulator with its cartridge loaded
    /// and reset.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the ROM header is malformed or names an
    /// unsupported mapper.
    pub fn load(rom_bytes: &[u8]) -> Result<Self, LoadError> {
        let cartridge = Cartridge::load(rom_bytes)?;
        let picture_bus = PictureBus::new(cartridge.mapper().mirroring());

        let mut emu = Self {
            cpu: Cpu::new(),
            cartridge,
            ram: [0; 0x0800],
            ppu: HeadlessPpuPort,
            io: StandardIoPort::new(),
            picture_bus,
            framebuffer: Box::new([0; screen::PIXELS]),
            total_cycles: 0,
        };
        emu.reset();
        Ok(emu)
    }

    /// Hardware reset: reset the CPU (which re-reads the reset vector
    /// through the bus), the mapper, and both bus address spaces.
    pub fn reset(&mut self) {
        self.cartridge.reset();
        self.ram = [0; 0x0800];
        self.picture_bus.reset();
        self.picture_bus.refresh_mirroring(self.cartridge.mapper().mirroring());

        let mut bus = MainBus::new(&mut self.ram, self.cartridge.mapper_mut(), &mut self.ppu, &mut self.io);
        self.cpu.reset(&mut bus);
        self.total_cycles = 0;
    }

    /// Advance the machine by one CPU cycle, plus the three PPU dots
    /// (delegated to the attached [`PpuPort`] collaborator) that occur in
    /// lockstep on NTSC.
    ///
    /// Returns the number of CPU cycles consumed by the instruction that
    /// completed on this call, or 0 if the CPU is still mid-instruction.
    pub fn cycle(&mut self) -> u8 {
        self.picture_bus.refresh_mirroring(self.cartridge.mapper().mirroring());

        let cycles_before = self.cpu.get_cycles();
        let instruction_boundary = {
            let mut bus = MainBus::new(&mut self.ram, self.cartridge.mapper_mut(), &mut self.ppu, &mut self.io);
            let boundary = self.cpu.tick(&mut bus);

            if let Some(page) = bus.take_pending_oam_dma() {
                self.run_oam_dma(page);
            }

            boundary
        };

        self.cartridge.mapper_mut().clock(1);
        let cycles_after = self.cpu.get_cycles();
        self.total_cycles = cycles_after;

        if instruction_boundary {
            u8::try_from(cycles_after - cycles_before).unwrap_or(u8::MAX)
        } else {
            0
        }
    }

    /// Run one full instruction, calling [`Self::cycle`] until an
    /// instruction boundary is reached. Test/harness convenience layered
    /// over [`Self::cycle`]; introduces no additional state.
    pub fn step(&mut self) -> u8 {
        loop {
            let cycles = self.cycle();
            if cycles > 0 {
                return cycles;
            }
        }
    }

    /// Copy 256 bytes from CPU page `page` into OAM via the PPU port,
    /// stalling the CPU for 513 (or 514 on an odd cycle) cycles.
    fn run_oam_dma(&mut self, page: u8) {
        let base = u16::from(page) << 8;
        log::trace!("executing OAM DMA from page {page:#04x}");

        for offset in 0u16..256 {
            let value = {
                let mut bus = MainBus::new(&mut self.ram, self.cartridge.mapper_mut(), &mut self.ppu, &mut self.io);
                nescore_cpu::Bus::read(&mut bus, base.wrapping_add(offset))
            };
            self.ppu.write_oam_byte(offset as u8, value);
        }

        // 513 cycles, or 514 if DMA starts on an odd CPU cycle.
        self.cpu.stall = if self.cpu.get_cycles() % 2 == 1 { 514 } else { 513 };
    }

    /// Current framebuffer (row-major, 256x240, one packed RGB(A) `u32` per
    /// pixel). Always zeroed: rendering is out of scope for this core (see
    /// the `PpuPort` collaborator contract); a real front end renders into
    /// its own buffer and this one is reserved purely for API shape.
    #[must_use]
    pub fn framebuffer(&self) -> &[u32; screen::PIXELS] {
        &self.framebuffer
    }

    /// Press `button` on controller `port` (0 or 1).
    pub fn controller_press(&mut self, port: u8, button: Button) {
        self.controller_mut(port).set_button(button, true);
    }

    /// Release `button` on controller `port` (0 or 1).
    pub fn controller_release(&mut self, port: u8, button: Button) {
        self.controller_mut(port).set_button(button, false);
    }

    fn controller_mut(&mut self, port: u8) -> &mut crate::input::Controller {
        if port == 0 {
            &mut self.io.controller1
        } else {
            &mut self.io.controller2
        }
    }

    /// Total CPU cycles executed since the last reset.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Peek at a CPU-space address without triggering read side effects.
    #[must_use]
    pub fn peek_memory(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x4020..=0xFFFF => self.cartridge.mapper().read_prg(addr),
            _ => 0,
        }
    }

    /// Reference to the CPU, for debugging/tracing.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The cartridge's mapper number.
    #[must_use]
    pub fn mapper_number(&self) -> u16 {
        self.cartridge.mapper_number()
    }

    /// The cartridge's mapper name.
    #[must_use]
    pub fn mapper_name(&self) -> &'static str {
        self.cartridge.mapper().mapper_name()
    }

    /// Read through the PPU address space (CHR, name tables, palette).
    ///
    /// Exposed so an attached `PpuPort` collaborator can resolve its own
    /// register reads/writes against the same `PictureBus` this core owns.
    #[must_use]
    pub fn read_ppu_bus(&self, addr: u16) -> u8 {
        self.picture_bus.read(self.cartridge.mapper(), addr)
    }

    /// Write through the PPU address space (CHR, name tables, palette).
    pub fn write_ppu_bus(&mut self, addr: u16, value: u8) {
        self.picture_bus.write(self.cartridge.mapper_mut(), addr, value);
    }
}
