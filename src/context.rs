use crate::config::RouterConfig;
use crate::vfs::{self, FileNode, VirtualFileSystem};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const README: &str = "Welcome to your private vault.\n\
Everything here is simulated and lives only in this conversation.\n\
Try: ls -l, cd vault, cat contacts.json, mkdir notes, touch notes/todo.txt\n";

/// Demo resources every session starts with under `/vault`.
pub const DEMO_RESOURCES: &[&str] = &[
    "contacts.json",
    "photos_archive.zip",
    "documents_2024.docx",
    "financial_records.csv",
];

/// Path-keyed view of the terminal state, handed to callers that want to
/// inspect the vault without the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemSnapshot {
    pub current_directory: String,
    pub entries: BTreeMap<String, FileNode>,
}

/// Working state for one command: the filesystem tree plus the little bit of
/// shell state that survives between commands.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalContext {
    pub vfs: VirtualFileSystem,
    pub cwd: String,
    /// Previous directory, for `cd -`.
    pub oldpwd: Option<String>,
    /// Logical clock. Advances one minute per executed command so that
    /// modification times depend only on command order.
    pub clock: DateTime<Utc>,
    pub identity: String,
}

impl TerminalContext {
    /// Canonical starting state: root with the readme and the demo vault.
    pub fn new(config: &RouterConfig) -> Self {
        let epoch = config.epoch_or_default();
        let mut ctx = Self::new_with_vfs(VirtualFileSystem::new(epoch), epoch);
        ctx.identity = config.identity.clone();
        ctx.seed();
        ctx
    }

    pub fn new_with_vfs(vfs: VirtualFileSystem, epoch: DateTime<Utc>) -> Self {
        Self {
            vfs,
            cwd: "/".to_string(),
            oldpwd: None,
            clock: epoch,
            identity: RouterConfig::default().identity,
        }
    }

    fn seed(&mut self) {
        let at = self.clock;
        // Fresh tree, none of these can collide.
        let _ = self.vfs.create_file("/readme.txt", README.to_string(), at);
        let _ = self.vfs.create_dir("/vault", at);
        for name in DEMO_RESOURCES {
            let path = vfs::join_path("/vault", name);
            let _ = self.vfs.create_file(&path, vfs::placeholder_content(name), at);
        }
    }

    /// Absolute form of a path argument.
    pub fn resolve(&self, target: &str) -> String {
        vfs::absolute_path(&self.cwd, target)
    }

    pub fn tick(&mut self) {
        self.clock += Duration::minutes(1);
    }

    pub fn snapshot(&self) -> FilesystemSnapshot {
        FilesystemSnapshot {
            current_directory: self.cwd.clone(),
            entries: self.vfs.entries(),
        }
    }
}
