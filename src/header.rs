use std::io;
use std::ops::Range;
use crate::error::FormatError;
use crate::utils::ElfReadExt;
use crate::types;

/// The section header bookkeeping fields of the ELF header,
/// the ones a cut has to read and later clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Shoff,
    Shentsize,
    Shnum,
    Shstrndx,
}

impl HeaderField {
    pub const ALL: [HeaderField; 4] = [
        HeaderField::Shoff,
        HeaderField::Shentsize,
        HeaderField::Shnum,
        HeaderField::Shstrndx,
    ];

    /// byte range of this field inside an ELF header of the given class
    pub fn span(&self, class: types::Class) -> Range<usize> {
        let (off, width) = match (class, *self) {
            (types::Class::Class32, HeaderField::Shoff)     => (0x20, 4),
            (types::Class::Class64, HeaderField::Shoff)     => (0x28, 8),
            (types::Class::Class32, HeaderField::Shentsize) => (0x2e, 2),
            (types::Class::Class64, HeaderField::Shentsize) => (0x3a, 2),
            (types::Class::Class32, HeaderField::Shnum)     => (0x30, 2),
            (types::Class::Class64, HeaderField::Shnum)     => (0x3c, 2),
            (types::Class::Class32, HeaderField::Shstrndx)  => (0x32, 2),
            (types::Class::Class64, HeaderField::Shstrndx)  => (0x3e, 2),
        };
        off..off + width
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Header32 {
    pub shoff:      u32, //offset of section header table
    pub shentsize:  u16, //the size of a section header table entry
    pub shnum:      u16, //the number of entries in the section header table
    pub shstrndx:   u16, //where to find section names
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Header64 {
    pub shoff:      u64,
    pub shentsize:  u16,
    pub shnum:      u16,
    pub shstrndx:   u16,
}

/// Class tagged view of the ELF header. Everything outside this module
/// goes through the accessors and never matches on the class itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElfHeader {
    Class32(Header32),
    Class64(Header64),
}

impl ElfHeader {
    pub fn from_bytes(class: types::Class, b: &[u8]) -> Result<ElfHeader, FormatError> {
        if b.len() < class.ehsize() {
            return Err(FormatError::TruncatedHeader {
                needed:    class.ehsize() as u64,
                file_size: b.len() as u64,
            });
        }
        let mut io = &b[HeaderField::Shoff.span(class).start..class.ehsize()];
        ElfHeader::from_reader(&mut io, class).map_err(|_| FormatError::TruncatedHeader {
            needed:    class.ehsize() as u64,
            file_size: b.len() as u64,
        })
    }

    // reads from e_shoff up to the end of the header
    fn from_reader<R>(io: &mut R, class: types::Class) -> io::Result<ElfHeader>
    where
        R: io::Read,
    {
        let shoff = io.elf_read_uclass(class)?;
        let _flags     = io.elf_read_u32()?;
        let _ehsize    = io.elf_read_u16()?;
        let _phentsize = io.elf_read_u16()?;
        let _phnum     = io.elf_read_u16()?;
        let shentsize  = io.elf_read_u16()?;
        let shnum      = io.elf_read_u16()?;
        let shstrndx   = io.elf_read_u16()?;

        Ok(match class {
            types::Class::Class32 => ElfHeader::Class32(Header32 {
                shoff: shoff as u32,
                shentsize,
                shnum,
                shstrndx,
            }),
            types::Class::Class64 => ElfHeader::Class64(Header64 {
                shoff,
                shentsize,
                shnum,
                shstrndx,
            }),
        })
    }

    pub fn class(&self) -> types::Class {
        match self {
            &ElfHeader::Class32(_) => types::Class::Class32,
            &ElfHeader::Class64(_) => types::Class::Class64,
        }
    }

    pub fn shoff(&self) -> u64 {
        match self {
            &ElfHeader::Class32(ref h) => h.shoff as u64,
            &ElfHeader::Class64(ref h) => h.shoff,
        }
    }

    pub fn shentsize(&self) -> u16 {
        match self {
            &ElfHeader::Class32(ref h) => h.shentsize,
            &ElfHeader::Class64(ref h) => h.shentsize,
        }
    }

    pub fn shnum(&self) -> u16 {
        match self {
            &ElfHeader::Class32(ref h) => h.shnum,
            &ElfHeader::Class64(ref h) => h.shnum,
        }
    }

    pub fn shstrndx(&self) -> u16 {
        match self {
            &ElfHeader::Class32(ref h) => h.shstrndx,
            &ElfHeader::Class64(ref h) => h.shstrndx,
        }
    }

    /// any of the section header fields, widened to u64
    pub fn field(&self, field: HeaderField) -> u64 {
        match field {
            HeaderField::Shoff     => self.shoff(),
            HeaderField::Shentsize => self.shentsize() as u64,
            HeaderField::Shnum     => self.shnum() as u64,
            HeaderField::Shstrndx  => self.shstrndx() as u64,
        }
    }
}
