use enum_primitive_derive::Primitive;

pub const MAGIC: [u8; 4] = [0x7F, 0x45, 0x4c, 0x46];

pub const EI_CLASS: usize = 4;
pub const EI_DATA:  usize = 5;

/// no section header string table
pub const SHN_UNDEF:  u32 = 0;
/// real index lives in sh_link of section header 0
pub const SHN_XINDEX: u32 = 0xffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum Class {
    Class32 = 1,
    Class64 = 2,
}

impl Default for Class {
    fn default() -> Self {Class::Class64}
}

impl Class {
    /// size of the ELF header of this class (e_ehsize as the ABI defines it)
    pub fn ehsize(&self) -> usize {
        match *self {
            Class::Class32 => 52,
            Class::Class64 => 64,
        }
    }

    /// width in bytes of an address/offset sized field
    pub fn uclass_width(&self) -> usize {
        match *self {
            Class::Class32 => 4,
            Class::Class64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum Endianness {
    LittleEndian = 1,
    BigEndian    = 2,
}

impl Endianness {
    pub fn host() -> Endianness {
        if cfg!(target_endian = "little") {
            Endianness::LittleEndian
        } else {
            Endianness::BigEndian
        }
    }
}

impl Default for Endianness {
    fn default() -> Self {Endianness::host()}
}
