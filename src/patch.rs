use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use log::debug;
use memchr::memmem;
use memmap2::MmapMut;

use crate::consts;
use crate::error::{UnlockError, UnlockResult};

/// Corrupts every VBA password marker in the project binary at `path`, in place.
///
/// Each `DPB` is overwritten with `DPx`, so the file keeps its exact length. A missing binary
/// is not an error as plenty of documents carry no macros. Returns the number of markers
/// replaced.
pub fn patch_macro_guard(path: &Path) -> UnlockResult<usize> {
    if !path.is_file() {
        debug!("No VBA project at {}, nothing to patch", path.display());
        return Ok(0);
    }
    let patch_err = |source: io::Error| UnlockError::BinaryPatch {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(patch_err)?;
    if file.metadata().map_err(patch_err)?.len() == 0 {
        return Ok(0);
    }

    // SAFETY: the scratch workspace belongs to this unlock alone, nothing else has the file open
    let mut map = unsafe { MmapMut::map_mut(&file) }.map_err(patch_err)?;
    let offsets: Vec<usize> = memmem::find_iter(&map, consts::MACRO_GUARD_MARKER).collect();
    for &offset in &offsets {
        map[offset..offset + consts::MACRO_GUARD_PATCHED.len()]
            .copy_from_slice(consts::MACRO_GUARD_PATCHED);
    }
    map.flush().map_err(patch_err)?;

    debug!(
        "Patched {} VBA protection marker(s) in {}",
        offsets.len(),
        path.display()
    );
    Ok(offsets.len())
}
