//! CPU-side address bus.
//!
//! Routes `$0000-$FFFF` to internal RAM, the PPU register window, the
//! IO/controller window, and cartridge PRG via the mapper.

use nescore_cpu::Bus;
use nescore_mappers::Mapper;

use crate::ports::{IoPort, PpuPort};

/// CPU memory map, generic over the PPU/IO register-window collaborators.
///
/// | Range | Target |
/// |---|---|
/// | `0x0000-0x1FFF` | 2 KiB RAM mirrored every `0x800` |
/// | `0x2000-0x3FFF` | PPU registers, 8 bytes mirrored every 8 |
/// | `0x4000-0x4017` | APU + IO (controllers, OAM DMA at `0x4014`) |
/// | `0x4018-0x401F` | Disabled, reads 0 |
/// | `0x4020-0xFFFF` | Mapper PRG |
pub struct MainBus<'a, P: PpuPort, I: IoPort> {
    ram: &'a mut [u8; 0x0800],
    mapper: &'a mut dyn Mapper,
    ppu: &'a mut P,
    io: &'a mut I,
    /// Set by a `$4014` write; the caller (`Emulator::cycle`) drains this to
    /// perform the DMA copy and apply the CPU stall.
    pending_oam_dma: Option<u8>,
}

impl<'a, P: PpuPort, I: IoPort> MainBus<'a, P, I> {
    /// Borrow RAM, the mapper, and the register-window collaborators for one cycle.
    ///
    /// RAM is borrowed rather than owned so that [`crate::Emulator`] can keep
    /// it alive across cycles while re-constructing the bus (and re-borrowing
    /// the mapper/ports) fresh on every call.
    pub fn new(ram: &'a mut [u8; 0x0800], mapper: &'a mut dyn Mapper, ppu: &'a mut P, io: &'a mut I) -> Self {
        Self {
            ram,
            mapper,
            ppu,
            io,
            pending_oam_dma: None,
        }
    }

    /// Take the OAM DMA source page set by a `$4014` write this cycle, if any.
    pub fn take_pending_oam_dma(&mut self) -> Option<u8> {
        self.pending_oam_dma.take()
    }

    /// Copy a byte into OAM via the PPU port, used by the OAM DMA driver in
    /// [`crate::Emulator`] since DMA reads come from the CPU's own address
    /// space (so must go through `Bus::read`, not straight through RAM).
    pub fn write_oam_byte(&mut self, offset: u8, value: u8) {
        self.ppu.write_oam_byte(offset, value);
    }

    fn ram_index(addr: u16) -> usize {
        (addr & 0x07FF) as usize
    }
}

impl<P: PpuPort, I: IoPort> Bus for MainBus<'_, P, I> {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[Self::ram_index(addr)],
            0x2000..=0x3FFF => self.ppu.read_register(0x2000 + (addr & 0x0007)),
            0x4000..=0x4017 => self.io.read_io(addr),
            0x4018..=0x401F => 0,
            0x4020..=0xFFFF => self.mapper.read_prg(addr),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[Self::ram_index(addr)] = value,
            0x2000..=0x3FFF => self.ppu.write_register(0x2000 + (addr & 0x0007), value),
            0x4014 => {
                log::trace!("OAM DMA triggered from page {value:#04x}");
                self.pending_oam_dma = Some(value);
            }
            0x4000..=0x4017 => self.io.write_io(addr, value),
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => self.mapper.write_prg(addr, value),
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[Self::ram_index(addr)],
            0x4020..=0xFFFF => self.mapper.read_prg(addr),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NullPort;
    use nescore_mappers::{Mirroring, Nrom, Rom, RomFormat, RomHeader};

    fn test_mapper() -> Nrom {
        let rom = Rom {
            header: RomHeader {
                format: RomFormat::INes,
                mapper: 0,
                submapper: 0,
                prg_rom_size: 16384,
                chr_rom_size: 8192,
                prg_ram_size: 0,
                prg_nvram_size: 0,
                chr_ram_size: 0,
                chr_nvram_size: 0,
                mirroring: Mirroring::Horizontal,
                has_battery: false,
                has_trainer: false,
                tv_system: 0,
            },
            prg_rom: vec![0xEA; 16384],
            chr_rom: vec![0; 8192],
            trainer: None,
        };
        Nrom::new(&rom)
    }

    #[test]
    fn ram_mirrors_every_0x800() {
        let mut ram = [0u8; 0x0800];
        let mut mapper = test_mapper();
        let mut ppu = NullPort;
        let mut io = NullPort;
        let mut bus = MainBus::new(&mut ram, &mut mapper, &mut ppu, &mut io);

        Bus::write(&mut bus, 0x0000, 0x42);
        assert_eq!(Bus::read(&mut bus, 0x0800), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1000), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1800), 0x42);
    }

    #[test]
    fn oam_dma_write_is_latched_not_applied() {
        let mut ram = [0u8; 0x0800];
        let mut mapper = test_mapper();
        let mut ppu = NullPort;
        let mut io = NullPort;
        let mut bus = MainBus::new(&mut ram, &mut mapper, &mut ppu, &mut io);

        Bus::write(&mut bus, 0x4014, 0x02);
        assert_eq!(bus.take_pending_oam_dma(), Some(0x02));
        assert_eq!(bus.take_pending_oam_dma(), None);
    }

    #[test]
    fn disabled_window_reads_zero() {
        let mut ram = [0u8; 0x0800];
        let mut mapper = test_mapper();
        let mut ppu = NullPort;
        let mut io = NullPort;
        let mut bus = MainBus::new(&mut ram, &mut mapper, &mut ppu, &mut io);

        assert_eq!(Bus::read(&mut bus, 0x4018), 0);
        assert_eq!(Bus::read(&mut bus, 0x401F), 0);
    }

    #[test]
    fn prg_reads_route_to_mapper() {
        let mut ram = [0u8; 0x0800];
        let mut mapper = test_mapper();
        let mut ppu = NullPort;
        let mut io = NullPort;
        let mut bus = MainBus::new(&mut ram, &mut mapper, &mut ppu, &mut io);

        // NROM NOP-filled PRG at $8000, mirrored from the 16 KiB bank.
        assert_eq!(Bus::read(&mut bus, 0x8000), 0xEA);
        assert_eq!(Bus::read(&mut bus, 0xC000), 0xEA);
    }
}
