use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use log::{debug, warn};

use crate::error::{Error, FormatError, IoContext, Result};
use crate::image::ElfImage;
use crate::types;

/// permission bits of a stripped file: owner rwx, group r
pub const DEFAULT_MODE: u32 = 0o740;

#[derive(Debug, Clone)]
pub struct StripOptions {
    /// zero the section name string table when it sits inside the kept prefix
    pub scrub_strtab: bool,
    /// build the output in a temporary file and rename it into place
    pub atomic:       bool,
    /// unix permission bits of the output
    pub mode:         u32,
}

impl Default for StripOptions {
    fn default() -> Self {
        StripOptions {
            scrub_strtab: true,
            atomic:       false,
            mode:         DEFAULT_MODE,
        }
    }
}

/// Location of the section header string table in the original file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrtabRange {
    pub offset: u64,
    pub size:   u64,
}

impl StrtabRange {
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.size)
    }

    /// true if the table lies after the ELF header and before `cut`
    pub fn fits_before(&self, cut: u64, class: types::Class) -> bool {
        match self.end() {
            Some(end) => self.offset >= class.ehsize() as u64 && end <= cut,
            None => false,
        }
    }
}

/// Where to cut a file, computed from the unmodified original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutPlan {
    pub class:       types::Class,
    /// first byte that is not kept
    pub cut_offset:  u64,
    pub file_size:   u64,
    pub shstrtab:    Option<StrtabRange>,
}

impl CutPlan {
    /// a file without section headers is copied as is
    pub fn is_noop(&self) -> bool {
        self.cut_offset == self.file_size
    }

    pub fn removed_bytes(&self) -> u64 {
        self.file_size - self.cut_offset
    }
}

/// What the scrub pass changed in the output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Scrubbed {
    pub header_cleared: bool,
    pub strtab_zeroed:  bool,
}

pub fn compute_cut_offset(image: &ElfImage) -> Result<CutPlan> {
    let file_size = image.file_size();

    if image.shnum() == 0 {
        debug!("e_shnum is 0, nothing to cut");
        return Ok(CutPlan {
            class: image.class(),
            cut_offset: file_size,
            file_size,
            shstrtab: None,
        });
    }

    let shoff = image.shoff();
    if shoff == 0 || shoff < image.class().ehsize() as u64 || shoff >= file_size {
        return Err(FormatError::AlreadyStripped { shoff, file_size }.into());
    }

    let plan = CutPlan {
        class: image.class(),
        cut_offset: shoff,
        file_size,
        shstrtab: locate_shstrtab(image)?,
    };
    debug!(
        "cut at {:#x}, dropping {} bytes, shstrtab {:?}",
        plan.cut_offset,
        plan.removed_bytes(),
        plan.shstrtab
    );
    Ok(plan)
}

// An unreadable string table only costs us the scrub, the cut itself
// does not depend on it.
fn locate_shstrtab(image: &ElfImage) -> Result<Option<StrtabRange>> {
    if image.shstrndx() as u32 == types::SHN_UNDEF {
        return Ok(None);
    }
    match read_shstrtab_entry(image) {
        Ok(r) => Ok(Some(r)),
        Err(Error::Format(e)) => {
            warn!("cannot locate section name string table: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn read_shstrtab_entry(image: &ElfImage) -> Result<StrtabRange> {
    let mut index = image.shstrndx() as u32;
    if index == types::SHN_XINDEX {
        index = image.read_section_header_entry(0)?.link;
    }
    let sh = image.read_section_header_entry(index)?;
    Ok(StrtabRange {
        offset: sh.offset,
        size:   sh.size,
    })
}

/// Write the first `plan.cut_offset` bytes of `image` to `dest`,
/// creating or truncating it. Returns the number of bytes written.
pub fn write_truncated<P: AsRef<Path>>(
    image: &ElfImage,
    plan:  &CutPlan,
    dest:  P,
    opts:  &StripOptions,
) -> Result<u64> {
    let dest = dest.as_ref();
    if plan.cut_offset == 0 || plan.cut_offset > image.file_size() {
        return Err(FormatError::AlreadyStripped {
            shoff:     plan.cut_offset,
            file_size: image.file_size(),
        }.into());
    }

    let mut out = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)
        .at("create", dest)?;

    let kept = &image.bytes()[..plan.cut_offset as usize];
    out.write_all(kept).at("write", dest)?;
    out.flush().at("write", dest)?;
    set_mode(&out, dest, opts.mode)?;

    debug!("wrote {} bytes to {}", kept.len(), dest.display());
    Ok(kept.len() as u64)
}

#[cfg(unix)]
fn set_mode(out: &::std::fs::File, dest: &Path, mode: u32) -> Result<()> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;
    out.set_permissions(Permissions::from_mode(mode)).at("chmod", dest)
}

#[cfg(not(unix))]
fn set_mode(_out: &::std::fs::File, _dest: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Reopen the truncated output at `dest`, clear its section header fields
/// and, if asked to, zero the section name string table.
///
/// A no-op plan leaves the output untouched so it stays identical to the
/// input. The string table is only zeroed when it lies completely between
/// the ELF header and the cut; anywhere else it is already gone or shares
/// bytes with the header.
pub fn scrub_string_table<P: AsRef<Path>>(
    plan: &CutPlan,
    dest: P,
    opts: &StripOptions,
) -> Result<Scrubbed> {
    let dest = dest.as_ref();
    let mut res = Scrubbed::default();
    if plan.is_noop() {
        return Ok(res);
    }

    let mut out = ElfImage::open(dest)?;
    out.clear_section_header_fields();
    res.header_cleared = true;

    if opts.scrub_strtab {
        if let Some(strtab) = plan.shstrtab {
            if strtab.fits_before(plan.cut_offset, out.class()) {
                out.zero_range(strtab.offset, strtab.size)?;
                res.strtab_zeroed = true;
            } else {
                warn!(
                    "section name string table {:#x}+{:#x} is outside the kept {:#x} bytes, not scrubbed",
                    strtab.offset, strtab.size, plan.cut_offset
                );
            }
        }
    }

    out.persist(dest)?;
    debug!("scrubbed {}: {:?}", dest.display(), res);
    Ok(res)
}
