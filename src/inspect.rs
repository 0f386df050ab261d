use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use memchr::memmem;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::consts;
use crate::error::{UnlockError, UnlockResult};
use crate::file::{Application, FileDescriptor};
use crate::prune;

/// Protection elements found in one part
#[derive(Debug)]
pub struct PartReport {
    pub name: String,
    pub elements: Vec<String>,
}

#[derive(Debug)]
pub struct Report {
    pub application: Application,
    /// Every protection-relevant part in the archive, locked or not
    pub parts: Vec<PartReport>,
    /// VBA markers in the project binary, `None` if the file has no macros
    pub macro_markers: Option<usize>,
}

impl Report {
    pub fn is_protected(&self) -> bool {
        self.parts.iter().any(|p| !p.elements.is_empty()) || self.macro_markers.unwrap_or(0) > 0
    }
}

/// Reports the protection in an Office file without changing it. The archive is read directly,
/// nothing is unpacked to disk
pub fn inspect(path: &Path) -> UnlockResult<Report> {
    let application = FileDescriptor::new(path).application()?;
    if !path.is_file() {
        return Err(UnlockError::FileNotFound(path.to_path_buf()));
    }
    let profile = application.profile();
    let read_err = |source: ZipError| UnlockError::ArchiveRead {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| read_err(e.into()))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(read_err)?;
    let macro_binary = profile.macro_binary();

    let mut parts = Vec::new();
    let mut macro_markers = None;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(read_err)?;
        let name = entry.name().to_owned();
        let rule = profile.rule_for_entry(&name);
        if rule.is_none() && name != macro_binary {
            continue;
        }

        let mut buffer = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .read_to_end(&mut buffer)
            .map_err(|e| read_err(e.into()))?;

        if let Some(rule) = rule {
            let pruned = prune::prune_document(&buffer, rule.fragments, Path::new(&name))?;
            parts.push(PartReport {
                name,
                elements: pruned.removed,
            });
        } else {
            macro_markers = Some(memmem::find_iter(&buffer, consts::MACRO_GUARD_MARKER).count());
        }
    }

    Ok(Report {
        application,
        parts,
        macro_markers,
    })
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} file", self.application.name())?;
        for part in &self.parts {
            if part.elements.is_empty() {
                writeln!(f, "🔓 {}: not protected", part.name)?;
            } else {
                writeln!(f, "🔐 {}: {}", part.name, part.elements.join(", "))?;
            }
        }
        match self.macro_markers {
            None => writeln!(f, "No VBA project")?,
            Some(0) => writeln!(f, "🔓 The VBA is not locked")?,
            Some(_) => writeln!(f, "🔐 The VBA is locked")?,
        }
        if self.is_protected() {
            write!(
                f,
                "You can remove the protection with `unlock_office unlock FILENAME`"
            )
        } else {
            write!(f, "Nothing is protected, you can freely edit it 🥳")
        }
    }
}
