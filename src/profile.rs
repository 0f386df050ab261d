//! What protection looks like in each kind of Office package
//!
//! Every application keeps its parts under one root folder of the archive (`xl`, `word`, `ppt`)
//! and records protection as elements inside a few known parts. A [`FormatProfile`] lists those
//! parts and the element names to take out of them.

use std::path::{Path, PathBuf};

use log::debug;

use crate::archive;
use crate::config::ProtectionMode;
use crate::consts;
use crate::error::UnlockResult;
use crate::file::Application;
use crate::prune;
use crate::workspace::ScratchWorkspace;

/// Which spreadsheet protection a rule belongs to, so the workbook/worksheet modes can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Workbook,
    Worksheet,
    /// The only protection the application has, always removed
    Whole,
}

/// Where a rule applies, relative to the application's root folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Part(&'static str),
    /// Every file under the folder
    Folder(&'static str),
}

#[derive(Debug)]
pub struct ProtectionRule {
    pub scope: Scope,
    pub target: Target,
    pub fragments: &'static [&'static str],
}

#[derive(Debug)]
pub struct FormatProfile {
    pub application: Application,
    pub root: &'static str,
    pub rules: &'static [ProtectionRule],
}

pub static SPREADSHEET: FormatProfile = FormatProfile {
    application: Application::Spreadsheet,
    root: "xl",
    rules: &[
        ProtectionRule {
            scope: Scope::Workbook,
            target: Target::Part("workbook.xml"),
            fragments: &["fileSharing", "workbookProtection"],
        },
        ProtectionRule {
            scope: Scope::Worksheet,
            target: Target::Folder("worksheets"),
            fragments: &["sheetProtection"],
        },
    ],
};

pub static DOCUMENT: FormatProfile = FormatProfile {
    application: Application::Document,
    root: "word",
    rules: &[ProtectionRule {
        scope: Scope::Whole,
        target: Target::Part("settings.xml"),
        fragments: &["writeProtection", "documentProtection"],
    }],
};

pub static PRESENTATION: FormatProfile = FormatProfile {
    application: Application::Presentation,
    root: "ppt",
    rules: &[ProtectionRule {
        scope: Scope::Whole,
        target: Target::Part("presentation.xml"),
        fragments: &["modifyVerifier"],
    }],
};

impl ProtectionMode {
    pub const fn covers(self, scope: Scope) -> bool {
        match scope {
            Scope::Workbook => self.workbook(),
            Scope::Worksheet => self.worksheets(),
            Scope::Whole => true,
        }
    }
}

impl FormatProfile {
    /// Archive name of the VBA project binary, e.g. `xl/vbaProject.bin`
    pub fn macro_binary(&self) -> String {
        format!("{}/{}", self.root, consts::VBA_FILENAME)
    }

    /// The rule that applies to an archive entry, if any
    pub fn rule_for_entry(&self, name: &str) -> Option<&ProtectionRule> {
        let inner = name.strip_prefix(self.root)?.strip_prefix('/')?;
        self.rules.iter().find(|rule| match rule.target {
            Target::Part(part) => inner == part,
            Target::Folder(folder) => inner
                .strip_prefix(folder)
                .and_then(|rest| rest.strip_prefix('/'))
                .is_some_and(|rest| !rest.is_empty() && !rest.ends_with('/')),
        })
    }

    /// Prunes the protection elements the mode asks for out of an unpacked package.
    ///
    /// Parts that are not there are skipped: a document only has them if that kind of
    /// protection was ever applied. Returns the number of elements removed.
    pub fn remove_application_protection(
        &self,
        workspace: &ScratchWorkspace,
        mode: ProtectionMode,
    ) -> UnlockResult<usize> {
        let root = workspace.part(self.root);
        let mut removed = 0;
        for rule in self.rules.iter().filter(|r| mode.covers(r.scope)) {
            for part in target_files(&root, rule.target)? {
                removed += prune::prune_elements(&part, rule.fragments)?;
            }
        }
        Ok(removed)
    }
}

fn target_files(root: &Path, target: Target) -> UnlockResult<Vec<PathBuf>> {
    match target {
        Target::Part(part) => {
            let path = root.join(part);
            if path.is_file() {
                Ok(vec![path])
            } else {
                debug!("{} not present, skipping", path.display());
                Ok(Vec::new())
            }
        }
        Target::Folder(folder) => {
            let path = root.join(folder);
            if path.is_dir() {
                archive::list_files_recursive(&path)
            } else {
                debug!("{} not present, skipping", path.display());
                Ok(Vec::new())
            }
        }
    }
}
