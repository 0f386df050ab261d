use std::fs;
use std::path::PathBuf;

use crate::consts;
use crate::error::{UnlockError, UnlockResult};

/// Where unlocked copies are saved and where scratch workspaces are created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub save_dir: PathBuf,
    pub temp_root: PathBuf,
}

impl Context {
    pub fn new(save_dir: impl Into<PathBuf>, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            temp_root: temp_root.into(),
        }
    }

    /// Creates the save and temp directories if they are not already there
    pub fn ensure_dirs(&self) -> UnlockResult<()> {
        fs::create_dir_all(&self.save_dir)?;
        fs::create_dir_all(&self.temp_root)?;
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(consts::DEFAULT_SAVE_DIR, consts::DEFAULT_TEMP_DIR)
    }
}

/// Which parts of a spreadsheet's protection get removed. Other applications only
/// have one kind of protection and ignore this
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionMode {
    #[default]
    Full,
    WorksheetOnly,
    WorkbookOnly,
}

impl ProtectionMode {
    pub fn from_flags(worksheet_only: bool, workbook_only: bool) -> UnlockResult<Self> {
        match (worksheet_only, workbook_only) {
            (false, false) => Ok(Self::Full),
            (true, false) => Ok(Self::WorksheetOnly),
            (false, true) => Ok(Self::WorkbookOnly),
            (true, true) => Err(UnlockError::Config(
                "worksheet-only and workbook-only cannot be used together".to_owned(),
            )),
        }
    }

    pub const fn workbook(self) -> bool {
        matches!(self, Self::Full | Self::WorkbookOnly)
    }

    pub const fn worksheets(self) -> bool {
        matches!(self, Self::Full | Self::WorksheetOnly)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub mode: ProtectionMode,
    /// Also corrupt the VBA project's password marker
    pub strip_macro: bool,
    /// Leave the scratch workspace on disk after a successful run
    pub keep_scratch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_from_flags() {
        assert_eq!(ProtectionMode::Full, ProtectionMode::from_flags(false, false).unwrap());
        assert_eq!(
            ProtectionMode::WorksheetOnly,
            ProtectionMode::from_flags(true, false).unwrap()
        );
        assert_eq!(
            ProtectionMode::WorkbookOnly,
            ProtectionMode::from_flags(false, true).unwrap()
        );
    }

    #[test]
    fn both_flags_rejected() {
        assert!(matches!(
            ProtectionMode::from_flags(true, true),
            Err(UnlockError::Config(_))
        ));
    }

    #[test]
    fn mode_coverage() {
        assert!(ProtectionMode::Full.workbook() && ProtectionMode::Full.worksheets());
        assert!(!ProtectionMode::WorksheetOnly.workbook());
        assert!(ProtectionMode::WorksheetOnly.worksheets());
        assert!(ProtectionMode::WorkbookOnly.workbook());
        assert!(!ProtectionMode::WorkbookOnly.worksheets());
    }

    #[test]
    fn ensure_dirs_creates_both() {
        let root = tempfile::tempdir().unwrap();
        let ctx = Context::new(root.path().join("a/save"), root.path().join("b/temp"));
        ctx.ensure_dirs().unwrap();
        assert!(ctx.save_dir.is_dir());
        assert!(ctx.temp_root.is_dir());
        // second call is a no-op
        ctx.ensure_dirs().unwrap();
    }
}
