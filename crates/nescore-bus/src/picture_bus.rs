//! PPU-side address bus.
//!
//! Routes `$0000-$3FFF` to cartridge CHR, mirrored name-table RAM, and
//! palette RAM with the NES's palette-entry aliasing quirk.

use nescore_mappers::{Mapper, Mirroring};

/// 2 KiB of physical name-table RAM, indexed through a per-mirroring-mode
/// lookup table rather than `Mapper::mirroring()` directly so the fallback
/// decision for `FourScreen` (see [`Self::refresh_mirroring`]) lives here.
pub struct PictureBus {
    nametables: [u8; 0x0800],
    palette: [u8; 32],
    /// 10-bit offset into `nametables` for each of the four logical name
    /// tables, recomputed whenever the mapper's mirroring mode changes.
    name_table_offsets: [u16; 4],
}

impl PictureBus {
    /// Construct a fresh bus with its mirroring table seeded from `mirroring`.
    #[must_use]
    pub fn new(mirroring: Mirroring) -> Self {
        let mut bus = Self {
            nametables: [0; 0x0800],
            palette: [0; 32],
            name_table_offsets: [0; 4],
        };
        bus.refresh_mirroring(mirroring);
        bus
    }

    /// Recompute `name_table_offsets` from the mapper's current mirroring mode.
    ///
    /// `FourScreen` needs 2 KiB of cartridge-supplied extra RAM this crate
    /// does not model; per the documented fallback it is treated as
    /// `Horizontal` here rather than inside [`crate::Cartridge`], so
    /// `Cartridge::has_extended_ram` stays an honest fact about the ROM image.
    pub fn refresh_mirroring(&mut self, mirroring: Mirroring) {
        self.name_table_offsets = match mirroring {
            Mirroring::Horizontal | Mirroring::FourScreen => [0x000, 0x000, 0x400, 0x400],
            Mirroring::Vertical => [0x000, 0x400, 0x000, 0x400],
            Mirroring::SingleScreenLower => [0x000, 0x000, 0x000, 0x000],
            Mirroring::SingleScreenUpper => [0x400, 0x400, 0x400, 0x400],
        };
    }

    fn nametable_addr(&self, addr: u16) -> usize {
        let addr = addr & 0x0FFF;
        let table = (addr >> 10) & 0x03;
        let offset = addr & 0x03FF;
        (self.name_table_offsets[table as usize] + offset) as usize
    }

    /// Map a palette address, applying the background-color aliasing rule:
    /// `$3F10/14/18/1C` mirror `$3F00/04/08/0C`.
    fn palette_index(addr: u16) -> usize {
        let addr = addr & 0x1F;
        if addr & 0x13 == 0x10 {
            (addr & 0x0F) as usize
        } else {
            addr as usize
        }
    }

    /// Read a byte through the PPU address space, routing CHR through `mapper`.
    pub fn read(&self, mapper: &dyn Mapper, addr: u16) -> u8 {
        match addr & 0x3FFF {
            0x0000..=0x1FFF => mapper.read_chr(addr),
            0x2000..=0x3EFF => self.nametables[self.nametable_addr(addr)],
            0x3F00..=0x3FFF => self.palette[Self::palette_index(addr)],
            _ => unreachable!("addr masked to 14 bits"),
        }
    }

    /// Write a byte through the PPU address space, routing CHR through `mapper`.
    pub fn write(&mut self, mapper: &mut dyn Mapper, addr: u16, value: u8) {
        match addr & 0x3FFF {
            0x0000..=0x1FFF => mapper.write_chr(addr, value),
            0x2000..=0x3EFF => {
                let idx = self.nametable_addr(addr);
                self.nametables[idx] = value;
            }
            0x3F00..=0x3FFF => self.palette[Self::palette_index(addr)] = value,
            _ => unreachable!("addr masked to 14 bits"),
        }
    }

    /// Raw palette RAM (32 bytes), for a collaborator rendering a scanline.
    #[must_use]
    pub fn palette(&self) -> &[u8; 32] {
        &self.palette
    }

    /// Reset name-table and palette RAM to zero (mirroring table is left
    /// alone; callers re-derive it from the mapper after a cartridge reset).
    pub fn reset(&mut self) {
        self.nametables = [0; 0x0800];
        self.palette = [0; 32];
    }
}
