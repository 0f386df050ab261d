#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Removes the password protection markers from Office Open XML files (`.xlsx`, `.docx`,
//! `.pptx` and their macro-enabled variants).
//!
//! Office only checks for the presence of protection elements in a package's XML parts, so
//! taking them out unlocks the file without ever knowing the password. The VBA project can be
//! unlocked too, by corrupting the marker that records its protected state. Files encrypted
//! with a password to open are a different matter and are not handled.

pub mod archive;
pub mod batch;
pub mod config;
pub mod consts;
pub mod error;
pub mod file;
pub mod inspect;
pub mod patch;
pub mod profile;
pub mod prune;
pub mod unlock;
pub mod workspace;

pub use config::{Context, Options, ProtectionMode};
pub use error::{Stage, UnlockError, UnlockResult};
pub use file::{Application, FileDescriptor};
pub use unlock::{unlock, UnlockOutcome, UnlockRequest};
