use std::path::{Path, PathBuf};

use crate::consts;
use crate::error::{UnlockError, UnlockResult};
use crate::profile::{FormatProfile, DOCUMENT, PRESENTATION, SPREADSHEET};

/// The Office applications whose files can be unlocked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Application {
    Spreadsheet,
    Document,
    Presentation,
}

impl Application {
    /// Maps a dot-prefixed extension onto its application. The match is exact and
    /// case-sensitive, so `.XLSX` is not recognised
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".xlsx" | ".xlsm" => Some(Self::Spreadsheet),
            ".docx" | ".docm" => Some(Self::Document),
            ".pptx" | ".pptm" => Some(Self::Presentation),
            _ => None,
        }
    }

    pub fn profile(self) -> &'static FormatProfile {
        match self {
            Self::Spreadsheet => &SPREADSHEET,
            Self::Document => &DOCUMENT,
            Self::Presentation => &PRESENTATION,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Spreadsheet => "Excel",
            Self::Document => "Word",
            Self::Presentation => "PowerPoint",
        }
    }
}

/// A target file, split into the pieces needed to dispatch and name the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    path: PathBuf,
    name: String,
    extension: String,
}

impl FileDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self {
            path,
            name,
            extension,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dot-prefixed extension, or an empty string if the file has none
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Picks the application from the extension alone; the filesystem is not touched
    pub fn application(&self) -> UnlockResult<Application> {
        if let Some(app) = Application::from_extension(&self.extension) {
            return Ok(app);
        }
        if self.extension == consts::LIST_EXTENSION {
            return Err(UnlockError::ListFileMistake(self.path.clone()));
        }
        Err(UnlockError::UnsupportedFormat(
            self.path.clone(),
            self.extension.clone(),
        ))
    }

    /// File name of the unlocked copy: the stem, the fixed suffix, then the original extension
    pub fn output_name(&self) -> String {
        let stem = &self.name[..self.name.len() - self.extension.len()];
        format!("{stem}{}{}", consts::OUTPUT_SUFFIX, self.extension)
    }
}
