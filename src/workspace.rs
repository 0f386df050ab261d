use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::UnlockResult;

const MAX_ATTEMPTS: usize = 16;

/// A uniquely named directory under the temp root that holds one unlock's unpacked archive.
///
/// Nothing is removed on drop: a failed unlock leaves its workspace behind for inspection, and
/// a successful one calls [`ScratchWorkspace::cleanup`] unless asked to keep it.
#[derive(Debug)]
pub struct ScratchWorkspace {
    root: PathBuf,
}

impl ScratchWorkspace {
    pub fn create(temp_root: &Path) -> UnlockResult<Self> {
        fs::create_dir_all(temp_root)?;
        for _ in 0..MAX_ATTEMPTS {
            let root = temp_root.join(format!("{:032x}", rand::random::<u128>()));
            match fs::create_dir(&root) {
                Ok(()) => {
                    debug!("Created scratch workspace {}", root.display());
                    return Ok(Self { root });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "could not find an unused scratch workspace name",
        )
        .into())
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of a part given by its `/` separated name inside the archive
    pub fn part(&self, name: &str) -> PathBuf {
        name.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |path, s| path.join(s))
    }

    /// Keeps the workspace on disk, handing back where it lives
    pub fn keep(self) -> PathBuf {
        debug!("Keeping scratch workspace {}", self.root.display());
        self.root
    }

    /// Deletes the workspace. Failing to do so does not undo the unlock, so it is only logged
    pub fn cleanup(self) {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => debug!("Removed scratch workspace {}", self.root.display()),
            Err(e) => warn!(
                "Could not remove scratch workspace {}: {e}",
                self.root.display()
            ),
        }
    }
}
