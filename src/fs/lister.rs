use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::fs::entry::{assign_padding, icon_for, FileEntry};

/// Filters and ordering applied to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub show_hidden: bool,
    pub dir_only: bool,
    pub dirs_first: bool,
    pub icons: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_hidden: true,
            dir_only: false,
            dirs_first: false,
            icons: false,
        }
    }
}

/// Directories currently expanded inline, keyed by absolute path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenTreeSet {
    dirs: HashSet<PathBuf>,
}

impl OpenTreeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, dir: &Path) {
        self.dirs.insert(dir.to_path_buf());
    }

    /// Collapse `dir` and everything expanded below it.
    pub fn close(&mut self, dir: &Path) -> bool {
        let before = self.dirs.len();
        self.dirs.retain(|d| !d.starts_with(dir));
        self.dirs.len() != before
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    pub fn clear(&mut self) {
        self.dirs.clear();
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// List `root` as a flat depth-first sequence.
///
/// Directories in `open` are expanded in place with their children directly
/// after them. Paths in `excluded` (pending deletions) are left out. Only a
/// failure to read `root` itself is an error; unreadable subtrees are logged
/// and skipped.
pub fn list(
    root: &Path,
    open: &OpenTreeSet,
    options: &ListOptions,
    excluded: &HashSet<PathBuf>,
) -> Result<Vec<FileEntry>> {
    let mut entries = list_level(root, 0, open, options, excluded)
        .map_err(|e| AppError::list(root, e))?;
    assign_padding(&mut entries);
    Ok(entries)
}

fn list_level(
    dir: &Path,
    depth: usize,
    open: &OpenTreeSet,
    options: &ListOptions,
    excluded: &HashSet<PathBuf>,
) -> std::io::Result<Vec<FileEntry>> {
    let mut level = Vec::new();
    for dir_entry in fs::read_dir(dir)? {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = dir_entry.path();
        let entry = match FileEntry::from_path(&path, depth) {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !options.show_hidden && entry.name.starts_with('.') {
            continue;
        }
        if options.dir_only && !entry.is_dir {
            continue;
        }
        if excluded.contains(&path) {
            continue;
        }
        level.push(entry);
    }

    level.sort_by(|a, b| a.name.cmp(&b.name));
    if options.dirs_first {
        // Stable, so names stay ordered inside each group.
        level.sort_by_key(|e| !e.is_dir);
    }

    let mut out = Vec::with_capacity(level.len());
    for mut entry in level {
        if options.icons {
            entry.icon = Some(icon_for(&entry));
        }
        let path = entry.path();
        let expand = entry.is_dir && open.contains(&path);
        out.push(entry);
        if expand {
            match list_level(&path, depth + 1, open, options, excluded) {
                Ok(children) => out.extend(children),
                Err(e) => log::warn!("cannot list {}: {}", path.display(), e),
            }
        }
    }
    Ok(out)
}
