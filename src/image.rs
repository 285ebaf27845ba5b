use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use log::{debug, trace};
use num_traits::FromPrimitive;

use crate::error::{FormatError, IndexFault, IoContext, Result};
use crate::header::{ElfHeader, HeaderField};
use crate::section::SectionHeaderEntry;
use crate::types;

/// A whole ELF file held in memory.
///
/// Construction validates the ident bytes, so an `ElfImage` always starts
/// with the ELF magic and carries a class this crate understands. The
/// backing buffer is exactly as long as the file.
#[derive(Debug, Clone)]
pub struct ElfImage {
    header: ElfHeader,
    bytes:  Vec<u8>,
}

impl ElfImage {
    /// Read `path` into memory and validate it. The descriptor is closed
    /// before this returns.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ElfImage> {
        let path = path.as_ref();
        let mut file = File::open(path).at("open", path)?;
        let len = file.metadata().at("stat", path)?.len();
        let mut bytes = Vec::with_capacity(len as usize);
        file.read_to_end(&mut bytes).at("read", path)?;
        drop(file);

        let image = ElfImage::from_bytes(bytes)?;
        debug!(
            "opened {}: {:?}, {} bytes, e_shoff {:#x}, e_shnum {}",
            path.display(),
            image.class(),
            image.file_size(),
            image.shoff(),
            image.shnum()
        );
        Ok(image)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<ElfImage> {
        let mut magic = [0; 4];
        for (m, b) in magic.iter_mut().zip(bytes.iter()) {
            *m = *b;
        }
        if magic != types::MAGIC {
            return Err(FormatError::BadMagic(magic).into());
        }

        let class = match bytes.get(types::EI_CLASS) {
            None => {
                return Err(FormatError::TruncatedHeader {
                    needed:    types::EI_CLASS as u64 + 1,
                    file_size: bytes.len() as u64,
                }.into())
            }
            Some(&b) => match types::Class::from_u8(b) {
                Some(v) => v,
                None => return Err(FormatError::UnsupportedClass(b).into()),
            },
        };

        let header = ElfHeader::from_bytes(class, &bytes)?;

        let data = bytes[types::EI_DATA];
        match types::Endianness::from_u8(data) {
            Some(ref e) if *e == types::Endianness::host() => {}
            _ => return Err(FormatError::UnsupportedByteOrder(data).into()),
        }

        Ok(ElfImage { header, bytes })
    }

    pub fn class(&self) -> types::Class {
        self.header.class()
    }

    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn read_header_field(&self, field: HeaderField) -> u64 {
        self.header.field(field)
    }

    pub fn shoff(&self) -> u64 {
        self.header.shoff()
    }

    pub fn shentsize(&self) -> u16 {
        self.header.shentsize()
    }

    pub fn shnum(&self) -> u16 {
        self.header.shnum()
    }

    pub fn shstrndx(&self) -> u16 {
        self.header.shstrndx()
    }

    /// Read entry `index` of the section header table. Every way the
    /// entry can be unreachable is reported as `IndexOutOfRange`.
    pub fn read_section_header_entry(&self, index: u32) -> Result<SectionHeaderEntry> {
        let out_of_range = |fault| FormatError::IndexOutOfRange {
            index,
            count: self.shnum(),
            fault,
        };

        if index >= self.shnum() as u32 {
            return Err(out_of_range(IndexFault::PastCount).into());
        }

        let class = self.class();
        let need = SectionHeaderEntry::entsize(class);
        if (self.shentsize() as usize) < need {
            return Err(out_of_range(IndexFault::EntryTooSmall(self.shentsize())).into());
        }

        let start = (index as u64)
            .checked_mul(self.shentsize() as u64)
            .and_then(|o| o.checked_add(self.shoff()));
        let past_end = IndexFault::PastEnd {
            offset:    start.unwrap_or(u64::max_value()),
            len:       need as u64,
            file_size: self.file_size(),
        };
        let (start, end) = match start.and_then(|s| s.checked_add(need as u64).map(|e| (s, e))) {
            Some((s, e)) if e <= self.file_size() => (s as usize, e as usize),
            _ => return Err(out_of_range(past_end).into()),
        };

        let mut io = &self.bytes[start..end];
        let entry = SectionHeaderEntry::from_reader(&mut io, class)
            .map_err(|_| out_of_range(past_end))?;
        trace!("section header {} at {:#x}: {:?}", index, start, entry);
        Ok(entry)
    }

    /// Zero e_shoff, e_shentsize, e_shnum and e_shstrndx so the header
    /// reports no section header table.
    pub fn clear_section_header_fields(&mut self) {
        let class = self.class();
        for field in HeaderField::ALL.iter() {
            for b in &mut self.bytes[field.span(class)] {
                *b = 0;
            }
        }
        self.header = match self.header {
            ElfHeader::Class32(_) => ElfHeader::Class32(Default::default()),
            ElfHeader::Class64(_) => ElfHeader::Class64(Default::default()),
        };
    }

    /// Overwrite `[offset, offset+size)` with zero bytes.
    pub fn zero_range(&mut self, offset: u64, size: u64) -> Result<()> {
        let end = match offset.checked_add(size) {
            Some(e) if e <= self.file_size() => e,
            _ => {
                return Err(FormatError::RangeOutOfBounds {
                    offset,
                    len: size,
                    file_size: self.file_size(),
                }.into())
            }
        };
        for b in &mut self.bytes[offset as usize..end as usize] {
            *b = 0;
        }
        Ok(())
    }

    /// Write the whole buffer back to `path`, replacing its content.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .at("open", path)?;
        file.write_all(&self.bytes).at("write", path)?;
        file.flush().at("write", path)?;
        Ok(())
    }
}
