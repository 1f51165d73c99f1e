//! Cartridge: owns the parsed ROM image and its mapper instance.

use nescore_mappers::{Mapper, Mirroring, Rom, RomError, create_mapper};

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

/// Error loading a ROM image into a [`Cartridge`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The iNES magic number was missing or the file was truncated.
    #[error("malformed ROM header: {0}")]
    BadMagic(#[source] RomError),

    /// The file was shorter than the header's declared PRG/CHR sizes.
    #[error("truncated ROM data: {0}")]
    Truncated(#[source] RomError),

    /// The header names a mapper number this crate has no implementation for.
    #[error("unsupported mapper: {0}")]
    UnsupportedMapper(u16),
}

impl From<RomError> for LoadError {
    fn from(err: RomError) -> Self {
        match err {
            RomError::UnsupportedMapper(id) => Self::UnsupportedMapper(id),
            RomError::FileTooSmall(_) | RomError::InvalidMagic(_) => Self::BadMagic(err),
            RomError::InvalidPrgSize(_)
            | RomError::InvalidChrSize(_)
            | RomError::SizeMismatch { .. }
            | RomError::UnsupportedFormat(_) => Self::Truncated(err),
        }
    }
}

/// A loaded NES cartridge: ROM image plus its mapper.
///
/// Owned by the [`crate::Emulator`]; [`crate::MainBus`] and [`crate::PictureBus`]
/// only ever see it through the `&dyn Mapper` they're handed each cycle.
pub struct Cartridge {
    mapper: Box<dyn Mapper>,
    mirroring: Mirroring,
    mapper_number: u16,
    has_extended_ram: bool,
}

impl Cartridge {
    /// Parse an iNES/NES 2.0 ROM image and construct the matching mapper.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the header is malformed, the file is
    /// truncated relative to the sizes it declares, or the mapper number is
    /// not one of the variants this crate implements.
    pub fn load(rom_bytes: &[u8]) -> Result<Self, LoadError> {
        log::debug!("parsing ROM image ({} bytes)", rom_bytes.len());
        let rom = Rom::load(rom_bytes)?;
        let mapper = create_mapper(&rom)?;

        log::debug!(
            "loaded cartridge: mapper {} ({}), prg={}B chr={}B mirroring={:?}",
            mapper.mapper_number(),
            mapper.mapper_name(),
            rom.header.prg_rom_size,
            rom.header.chr_rom_size,
            rom.header.mirroring,
        );

        Ok(Self {
            mirroring: rom.header.mirroring,
            mapper_number: mapper.mapper_number(),
            has_extended_ram: rom.header.chr_rom_size == 0 || rom.header.prg_ram_size > 0,
            mapper,
        })
    }

    /// Construct directly from an already-built mapper (test/embedding hook).
    #[must_use]
    pub fn with_mapper(mapper: Box<dyn Mapper>, has_extended_ram: bool) -> Self {
        let mirroring = mapper.mirroring();
        let mapper_number = mapper.mapper_number();
        Self {
            mapper,
            mirroring,
            mapper_number,
            has_extended_ram,
        }
    }

    /// The cartridge's declared nametable mirroring mode.
    ///
    /// This is a fact about the ROM image at load time; [`crate::PictureBus`]
    /// re-derives the live mirroring from `mapper.mirroring()` each cycle
    /// since some mappers (MMC1, MMC3) change it at runtime.
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// The iNES mapper number this cartridge was loaded with.
    #[must_use]
    pub fn mapper_number(&self) -> u16 {
        self.mapper_number
    }

    /// Whether the cartridge declares extended (CHR-RAM or battery PRG-RAM) storage.
    #[must_use]
    pub fn has_extended_ram(&self) -> bool {
        self.has_extended_ram
    }

    /// Borrow the mapper immutably.
    #[must_use]
    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    /// Borrow the mapper mutably.
    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        self.mapper.as_mut()
    }

    /// Reset the mapper to its power-on state.
    pub fn reset(&mut self) {
        self.mapper.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nrom_bytes() -> Vec<u8> {
        let mut data = vec![0u8; 16 + 16384 + 8192];
        data[0..4].copy_from_slice(&[0x4E, 0x45, 0x53, 0x1A]);
        data[4] = 1; // 16 KiB PRG
        data[5] = 1; // 8 KiB CHR
        data
    }

    #[test]
    fn loads_nrom() {
        let cart = Cartridge::load(&nrom_bytes()).unwrap();
        assert_eq!(cart.mapper_number(), 0);
        assert_eq!(cart.mapper().mapper_name(), "NROM");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = nrom_bytes();
        data[0] = 0;
        assert!(matches!(Cartridge::load(&data), Err(LoadError::BadMagic(_))));
    }

    #[test]
    fn rejects_unsupported_mapper() {
        let mut data = nrom_bytes();
        data[6] = 0xF0; // mapper low nibble -> 0xFF high bits
        data[7] = 0xF0;
        assert!(matches!(
            Cartridge::load(&data),
            Err(LoadError::UnsupportedMapper(_))
        ));
    }
}
