use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::error;

use crate::config::{Context, Options};
use crate::error::{UnlockError, UnlockResult};
use crate::unlock::{unlock, UnlockOutcome, UnlockRequest};

/// Reads a list of target paths, one per line. Trailing whitespace is stripped and blank lines
/// are skipped
pub fn read_list_file(path: &Path) -> UnlockResult<Vec<PathBuf>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => UnlockError::FileNotFound(path.to_path_buf()),
        _ => e.into(),
    })?;
    let mut targets = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim_end();
        if !line.is_empty() {
            targets.push(PathBuf::from(line));
        }
    }
    Ok(targets)
}

#[derive(Debug)]
pub enum Outcome {
    Unlocked(UnlockOutcome),
    Missing,
    /// Not an Office file, never attempted
    Rejected(UnlockError),
    Failed(UnlockError),
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Per-file results of a batch, in the order the files were given
#[derive(Debug, Default)]
pub struct Summary {
    pub reports: Vec<FileReport>,
}

impl Summary {
    pub fn unlocked(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Unlocked(_)))
            .count()
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn all_unlocked(&self) -> bool {
        self.unlocked() == self.total()
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} files unlocked", self.unlocked(), self.total())
    }
}

/// Unlocks each target in turn.
///
/// A file that is missing, not an Office file, or fails part way through is reported and
/// counted as not unlocked; the remaining files are still processed.
pub fn run_batch(ctx: &Context, targets: &[PathBuf], options: Options) -> Summary {
    let mut summary = Summary::default();
    for path in targets {
        println!("\nChecking file {}...", path.display());
        let outcome = unlock_one(ctx, path, options);
        match &outcome {
            Outcome::Unlocked(done) => {
                println!("🔓 Unlocked, saved to {}", done.output.display());
                if let Some(scratch) = &done.scratch {
                    println!("Scratch files kept in {}", scratch.display());
                }
            }
            Outcome::Missing => println!("❌ File not found..."),
            Outcome::Rejected(e) => println!("❌ File rejected. {e}"),
            Outcome::Failed(e) => {
                error!("{e}");
                println!("❌ An error occurred while unlocking {}", path.display());
            }
        }
        summary.reports.push(FileReport {
            path: path.clone(),
            outcome,
        });
    }
    summary
}

fn unlock_one(ctx: &Context, path: &Path, options: Options) -> Outcome {
    if !path.is_file() {
        return Outcome::Missing;
    }
    let request = UnlockRequest::new(path, options);
    match unlock(ctx, &request) {
        Ok(done) => Outcome::Unlocked(done),
        Err(e) if e.is_rejection() => Outcome::Rejected(e),
        Err(e) => Outcome::Failed(e),
    }
}
