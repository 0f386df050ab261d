//! Moving an OOXML package between its zip form and a directory on disk
//!
//! An unlock unpacks the whole archive into a scratch workspace, edits parts in place, then
//! builds a brand new archive from everything left in the workspace. Entries other than the
//! edited parts go back in with their bytes untouched.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Component, Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::result::{ZipError, ZipResult};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::consts;
use crate::error::{UnlockError, UnlockResult};

/// Extracts every entry of `archive_path` under `dest`, keeping the relative layout.
///
/// Archives that are not zips, or whose entries are encrypted at the zip layer, fail with
/// [`UnlockError::ArchiveRead`]. Whatever was extracted before a failure is left in `dest`.
pub fn unpack(archive_path: &Path, dest: &Path) -> UnlockResult<()> {
    let read_err = |source: ZipError| UnlockError::ArchiveRead {
        path: archive_path.to_path_buf(),
        source,
    };
    let file = File::open(archive_path).map_err(|e| read_err(e.into()))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(read_err)?;
    archive.extract(dest).map_err(read_err)?;
    debug!(
        "Extracted {} entries from {} into {}",
        archive.len(),
        archive_path.display(),
        dest.display()
    );
    Ok(())
}

/// All regular files under `dir`, sorted by name at each level. Directories are not listed
pub fn list_files_recursive(dir: &Path) -> UnlockResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Builds a new archive at `output` from every file under `source_dir`.
///
/// The archive is written to a temporary file next to `output` and only renamed into place once
/// it is complete, so a failure never leaves a truncated archive behind.
pub fn repackage(source_dir: &Path, output: &Path) -> UnlockResult<()> {
    let write_err = |source: ZipError| UnlockError::ArchiveWrite {
        path: output.to_path_buf(),
        source,
    };

    let mut files = list_files_recursive(source_dir)?;
    // Keep the content types part at the front, where Office writes it
    let content_types = source_dir.join(consts::CONTENT_TYPES);
    if let Some(pos) = files.iter().position(|f| *f == content_types) {
        let content_types = files.remove(pos);
        files.insert(0, content_types);
    }

    let dir = parent_dir_or_dot(output);
    fs::create_dir_all(dir).map_err(|e| write_err(e.into()))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_err(e.into()))?;
    write_entries(source_dir, &files, tmp.as_file_mut()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(|e| write_err(e.into()))?;
    tmp.persist(output).map_err(|e| write_err(e.error.into()))?;

    debug!("Wrote {} entries to {}", files.len(), output.display());
    Ok(())
}

fn write_entries(source_dir: &Path, files: &[PathBuf], out: &mut File) -> ZipResult<()> {
    let mut archive = ZipWriter::new(out);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for file in files {
        let name = entry_name(source_dir, file)?;
        archive.start_file(name, options)?;
        let mut source = File::open(file)?;
        io::copy(&mut source, &mut archive)?;
    }
    archive.finish()?.flush()?;
    Ok(())
}

/// Archive-internal name of a file: its path relative to the source directory, joined with `/`
/// whatever the host separator is
fn entry_name(source_dir: &Path, file: &Path) -> ZipResult<String> {
    let relative = file
        .strip_prefix(source_dir)
        .map_err(|_| ZipError::InvalidArchive("file is outside of the source directory"))?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` returns `Some("")` for bare file names
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
