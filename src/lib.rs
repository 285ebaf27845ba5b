//! Cut the section header table off ELF32 and ELF64 files.
//!
//! The loader only needs the ELF header and the program headers. Linkers
//! and debuggers also want the section header table, which compilers put
//! at the very end of the file. Cutting the file at `e_shoff` removes that
//! table without touching anything that gets mapped at run time.
//!
//! ```no_run
//! let report = elfcut::strip_file("a.out", "a.stripped", &Default::default()).unwrap();
//! println!("removed {} bytes", report.plan.removed_bytes());
//! ```

pub mod error;
pub mod header;
pub mod image;
pub mod section;
pub mod strip;
pub mod types;
pub mod utils;

use std::path::Path;

use log::debug;

pub use crate::error::{Error, FormatError, IndexFault, Result};
pub use crate::header::{ElfHeader, Header32, Header64, HeaderField};
pub use crate::image::ElfImage;
pub use crate::section::SectionHeaderEntry;
pub use crate::strip::{
    compute_cut_offset, scrub_string_table, write_truncated, CutPlan, Scrubbed, StripOptions, StrtabRange,
};

use crate::error::IoContext;

#[derive(Debug, Clone)]
pub struct StripReport {
    pub plan:          CutPlan,
    pub bytes_written: u64,
    pub scrubbed:      Scrubbed,
}

/// Open `src`, cut it at its section header table and write the result
/// to `dest`.
///
/// Nothing is written when `src` is rejected. Without `opts.atomic` a
/// failure while writing leaves `dest` as far as it got.
pub fn strip_file<S, D>(src: S, dest: D, opts: &StripOptions) -> Result<StripReport>
where
    S: AsRef<Path>,
    D: AsRef<Path>,
{
    let dest = dest.as_ref();
    let image = ElfImage::open(src)?;
    let plan = compute_cut_offset(&image)?;

    if !opts.atomic {
        let bytes_written = write_truncated(&image, &plan, dest, opts)?;
        let scrubbed = scrub_string_table(&plan, dest, opts)?;
        return Ok(StripReport { plan, bytes_written, scrubbed });
    }

    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".elfcut-")
        .tempfile_in(dir)
        .at("create", dir)?
        .into_temp_path();

    let bytes_written = write_truncated(&image, &plan, &tmp, opts)?;
    let scrubbed = scrub_string_table(&plan, &tmp, opts)?;
    debug!("renaming {} to {}", tmp.display(), dest.display());
    tmp.persist(dest).map_err(|e| Error::Io {
        op:     "rename",
        path:   dest.to_path_buf(),
        source: e.error,
    })?;

    Ok(StripReport { plan, bytes_written, scrubbed })
}
