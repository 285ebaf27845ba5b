use std::io::{Read, Result};
use byteorder::{NativeEndian, ReadBytesExt};
use crate::types;

/// Field readers for the byte order the image was written in.
/// Only host order images get this far, so everything reads `NativeEndian`.
pub trait ElfReadExt: Read {
    fn elf_read_u16(&mut self) -> Result<u16> {
        self.read_u16::<NativeEndian>()
    }
    fn elf_read_u32(&mut self) -> Result<u32> {
        self.read_u32::<NativeEndian>()
    }
    fn elf_read_uclass(&mut self, class: types::Class) -> Result<u64> {
        match class {
            types::Class::Class32 => Ok(self.read_u32::<NativeEndian>()? as u64),
            types::Class::Class64 => self.read_u64::<NativeEndian>(),
        }
    }
}
impl<R: Read + ?Sized> ElfReadExt for R {}

pub fn hextab<S>(align: usize, s: S) -> String
where
    S: std::fmt::LowerHex,
{
    let s = format!("{:x}", s);
    let pad: String = vec!['0'; align.saturating_sub(s.len())].into_iter().collect();
    format!("\x1b[90m{}\x1b[0;m{}", pad, s)
}
