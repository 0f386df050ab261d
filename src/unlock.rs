use std::path::PathBuf;

use log::{debug, info};

use crate::archive;
use crate::config::{Context, Options};
use crate::error::{at, Stage, UnlockError, UnlockResult};
use crate::file::FileDescriptor;
use crate::patch;
use crate::workspace::ScratchWorkspace;

/// One file to unlock and how to go about it
#[derive(Debug, Clone)]
pub struct UnlockRequest {
    pub file: FileDescriptor,
    pub options: Options,
}

impl UnlockRequest {
    pub fn new(path: impl Into<PathBuf>, options: Options) -> Self {
        Self {
            file: FileDescriptor::new(path),
            options,
        }
    }
}

#[derive(Debug)]
pub struct UnlockOutcome {
    /// The unlocked copy, in the save directory
    pub output: PathBuf,
    /// Protection elements pruned from the XML parts
    pub elements_removed: usize,
    /// VBA markers patched, `None` when macro protection was not asked for
    pub markers_patched: Option<usize>,
    /// The scratch workspace, if it was kept
    pub scratch: Option<PathBuf>,
}

/// Unlocks one file, writing an unlocked copy to the save directory.
///
/// Runs unpack, application protection removal, the optional VBA patch and repackaging in
/// that order, stopping at the first failure. Errors from those steps come back wrapped in
/// [`UnlockError::Stage`]. The input file is never modified, and on failure the scratch
/// workspace is left on disk.
pub fn unlock(ctx: &Context, request: &UnlockRequest) -> UnlockResult<UnlockOutcome> {
    let file = &request.file;
    let options = request.options;
    let application = file.application()?;
    if !file.path().is_file() {
        return Err(UnlockError::FileNotFound(file.path().to_path_buf()));
    }
    let profile = application.profile();
    ctx.ensure_dirs()?;

    let workspace = ScratchWorkspace::create(&ctx.temp_root).map_err(at(Stage::Unpack))?;
    archive::unpack(file.path(), workspace.path()).map_err(at(Stage::Unpack))?;
    info!("File unpacked...");

    let elements_removed = profile
        .remove_application_protection(&workspace, options.mode)
        .map_err(at(Stage::ApplicationProtection))?;
    info!(
        "{} protection removed ({elements_removed} element(s))...",
        application.name()
    );

    let markers_patched = if options.strip_macro {
        let bin = workspace.part(&profile.macro_binary());
        let patched = patch::patch_macro_guard(&bin).map_err(at(Stage::MacroProtection))?;
        info!("VBA protection removed ({patched} marker(s))...");
        Some(patched)
    } else {
        None
    };

    let output = ctx.save_dir.join(file.output_name());
    archive::repackage(workspace.path(), &output).map_err(at(Stage::Repackage))?;
    info!("File repackaged...");

    let scratch = if options.keep_scratch {
        Some(workspace.keep())
    } else {
        workspace.cleanup();
        None
    };

    debug!("Unlocked {} into {}", file.path().display(), output.display());
    Ok(UnlockOutcome {
        output,
        elements_removed,
        markers_patched,
        scratch,
    })
}
