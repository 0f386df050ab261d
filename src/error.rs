use std::{
    fmt::{Debug, Display},
    io,
    path::PathBuf,
};
use thiserror::Error;

pub type UnlockResult<T> = Result<T, UnlockError>;

#[allow(clippy::module_name_repetitions)]
#[derive(Error)]
pub enum UnlockError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{} could not be found", .0.display())]
    FileNotFound(PathBuf),

    #[error("{} has an unsupported file extension '{}'", .0.display(), .1)]
    UnsupportedFormat(PathBuf, String),

    #[error("{} is a text file. Did you mean to use list mode? Try `unlock_office unlock --help`", .0.display())]
    ListFileMistake(PathBuf),

    #[error("Problem with the zip representation of {}: {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Could not write the repackaged archive {}: {source}", .path.display())]
    ArchiveWrite {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Could not find the XML part {}", .0.display())]
    XmlNotFound(PathBuf),

    #[error("Malformed XML in {}: {message}", .path.display())]
    XmlParse { path: PathBuf, message: String },

    #[error("There was a problem patching the VBA project binary {}: {source}", .path.display())]
    BinaryPatch { path: PathBuf, source: io::Error },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{stage} failed. {source}")]
    Stage {
        stage: Stage,
        source: Box<UnlockError>,
    },
}

impl Debug for UnlockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl UnlockError {
    /// The step of the unlock run the error was raised in, if it was raised inside one
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Strips any stage tagging to get at the underlying failure
    pub fn root(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Errors raised before any work is done on the file, because it is not something
    /// that can be unlocked
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(..) | Self::ListFileMistake(_))
    }
}

/// The steps an unlock runs through, in order
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unpack,
    ApplicationProtection,
    MacroProtection,
    Repackage,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpack => write!(f, "Unpacking the archive"),
            Self::ApplicationProtection => write!(f, "Removing the application protection"),
            Self::MacroProtection => write!(f, "Removing the VBA protection"),
            Self::Repackage => write!(f, "Repackaging the archive"),
        }
    }
}

impl Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// Builds a closure that tags an error with the stage it happened in, for use with `map_err`
pub fn at(stage: Stage) -> impl FnOnce(UnlockError) -> UnlockError {
    move |e| UnlockError::Stage {
        stage,
        source: Box::new(e),
    }
}
