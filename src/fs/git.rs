use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// How an entry differs from the git index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GitMark {
    Untracked,
    Added,
    Modified,
}

impl GitMark {
    /// Classify a two-character porcelain status code.
    pub fn from_code(code: &str) -> Option<Self> {
        if code.contains('?') {
            Some(GitMark::Untracked)
        } else if code.contains('A') {
            Some(GitMark::Added)
        } else if code.contains('M') {
            Some(GitMark::Modified)
        } else {
            None
        }
    }
}

/// Changed paths of the repository containing a directory.
///
/// Outside a repository (or without git installed) the map is empty.
#[derive(Debug, Clone, Default)]
pub struct GitStatus {
    changes: HashMap<PathBuf, String>,
}

impl GitStatus {
    pub fn load(dir: &Path) -> Self {
        let Some(root) = git_output(dir, &["rev-parse", "--show-toplevel"]) else {
            return Self::default();
        };
        let root = PathBuf::from(root.trim_end_matches('\n'));
        match git_output(dir, &["status", "--porcelain=v1"]) {
            Some(out) => Self {
                changes: parse_porcelain(&root, &out),
            },
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Mark for `path`, taking every change at or below it into account.
    ///
    /// When several changes fall under a directory the strongest one wins:
    /// modified, then added, then untracked.
    pub fn mark_for(&self, path: &Path) -> Option<GitMark> {
        self.changes
            .iter()
            .filter(|(changed, _)| changed.starts_with(path))
            .filter_map(|(_, code)| GitMark::from_code(code))
            .max()
    }
}

fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

/// Parse `git status --porcelain=v1` output into absolute path -> status code.
pub fn parse_porcelain(root: &Path, output: &str) -> HashMap<PathBuf, String> {
    let mut changes = HashMap::new();
    for line in output.lines() {
        if line.len() < 4 || !line.is_char_boundary(2) || !line.is_char_boundary(3) {
            continue;
        }
        let code = &line[..2];
        let mut rel = &line[3..];
        // Renames are reported as "old -> new".
        if let Some((_, new)) = rel.split_once(" -> ") {
            rel = new;
        }
        let rel = rel.trim_matches('"').trim_end_matches('/');
        changes.insert(root.join(rel), code.to_string());
    }
    changes
}
