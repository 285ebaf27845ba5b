use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op:     &'static str,
        path:   PathBuf,
        source: io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// The input is not an ELF image this crate can cut.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad magic {0:02x?}, not an ELF file")]
    BadMagic([u8; 4]),

    #[error("unsupported ELF class {0}")]
    UnsupportedClass(u8),

    #[error("unsupported byte order {0}, only host order images are handled")]
    UnsupportedByteOrder(u8),

    #[error("file is {file_size} bytes, the ELF header needs {needed}")]
    TruncatedHeader { needed: u64, file_size: u64 },

    #[error("section header {index} out of range ({count} in table): {fault}")]
    IndexOutOfRange { index: u32, count: u16, fault: IndexFault },

    #[error("byte range {offset:#x}+{len:#x} runs past the end of the file ({file_size} bytes)")]
    RangeOutOfBounds { offset: u64, len: u64, file_size: u64 },

    #[error("e_shoff {shoff:#x} is not inside a {file_size} byte file, section headers already stripped?")]
    AlreadyStripped { shoff: u64, file_size: u64 },
}

/// Why a section header entry could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFault {
    /// index >= e_shnum
    PastCount,
    /// the entry would end past the last byte of the file
    PastEnd { offset: u64, len: u64, file_size: u64 },
    /// e_shentsize is smaller than a section header of this class
    EntryTooSmall(u16),
}

impl fmt::Display for IndexFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IndexFault::PastCount => write!(f, "index past e_shnum"),
            IndexFault::PastEnd { offset, len, file_size } => write!(
                f,
                "entry {:#x}+{:#x} runs past the end of the file ({} bytes)",
                offset, len, file_size
            ),
            IndexFault::EntryTooSmall(v) => write!(f, "e_shentsize {} is too small", v),
        }
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

pub(crate) trait IoContext<T> {
    fn at(self, op: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, op: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            op,
            path: path.to_path_buf(),
            source,
        })
    }
}
