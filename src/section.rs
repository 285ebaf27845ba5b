use std::io::{Read, Result};
use crate::utils::ElfReadExt;
use crate::types;

/// The part of a section header the cutter cares about.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SectionHeaderEntry {
    pub offset: u64, //file offset of the section data
    pub size:   u64,
    pub link:   u32, //for entry 0, holds the extended e_shstrndx
}

impl SectionHeaderEntry {
    /// minimum e_shentsize for the class
    pub fn entsize(class: types::Class) -> usize {
        4 + 4 + match class {
            types::Class::Class64 => 6 * 8,
            types::Class::Class32 => 6 * 4,
        } + 4 + 4
    }

    pub fn from_reader<R>(io: &mut R, class: types::Class) -> Result<SectionHeaderEntry>
    where
        R: Read,
    {
        let _name   = io.elf_read_u32()?;
        let _shtype = io.elf_read_u32()?;
        let _flags  = io.elf_read_uclass(class)?;
        let _addr   = io.elf_read_uclass(class)?;
        let offset  = io.elf_read_uclass(class)?;
        let size    = io.elf_read_uclass(class)?;
        let link    = io.elf_read_u32()?;
        Ok(SectionHeaderEntry {
            offset,
            size,
            link,
        })
    }

    /// end of the section data, None if it overflows
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.size)
    }
}
