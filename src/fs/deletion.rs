use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::commands::parse_command_line;
use crate::error::{AppError, Result};

/// Default delay between scheduling a deletion and performing it.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(6);

/// A path waiting to be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    pub path: PathBuf,
    pub due: Instant,
}

/// Deletions that can still be undone.
///
/// Queued paths are hidden from listings right away; the files stay on disk
/// until their grace period runs out.
#[derive(Debug)]
pub struct DeletionQueue {
    pending: Vec<PendingDeletion>,
    grace: Duration,
    /// External remover (e.g. `trash`) run as `command <path>` instead of deleting directly.
    command: Option<String>,
}

impl DeletionQueue {
    pub fn new(grace: Duration, command: Option<String>) -> Self {
        Self {
            pending: Vec::new(),
            grace,
            command,
        }
    }

    pub fn schedule(&mut self, path: PathBuf, now: Instant) {
        if self.contains(&path) {
            return;
        }
        let due = now + self.grace;
        self.pending.push(PendingDeletion { path, due });
    }

    /// Cancel the most recently scheduled deletion.
    pub fn undo(&mut self) -> Option<PathBuf> {
        self.pending.pop().map(|p| p.path)
    }

    /// Remove and return every deletion whose grace period is over.
    pub fn take_due(&mut self, now: Instant) -> Vec<PathBuf> {
        let (due, keep): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = keep;
        due.into_iter().map(|p| p.path).collect()
    }

    /// Remove and return every pending deletion regardless of its deadline.
    pub fn take_all(&mut self) -> Vec<PathBuf> {
        self.pending.drain(..).map(|p| p.path).collect()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.pending.iter().any(|p| p.path == path)
    }

    pub fn paths(&self) -> HashSet<PathBuf> {
        self.pending.iter().map(|p| p.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Actually remove `path` from disk.
    pub fn remove(&self, path: &Path) -> Result<()> {
        match &self.command {
            Some(cmd) => run_remove_command(cmd, path),
            None => delete(path),
        }
    }

    /// Remove every path, returning the ones that failed.
    pub fn remove_all(&self, paths: &[PathBuf]) -> Vec<(PathBuf, AppError)> {
        let mut failed = Vec::new();
        for path in paths {
            match self.remove(path) {
                Ok(()) => log::info!("deleted {}", path.display()),
                Err(e) => {
                    log::warn!("failed to delete {}: {}", path.display(), e);
                    failed.push((path.clone(), e));
                }
            }
        }
        failed
    }
}

impl Default for DeletionQueue {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE, None)
    }
}

/// Delete a file or directory. Directories are removed recursively, symlinks are not followed.
pub fn delete(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

fn run_remove_command(cmd: &str, path: &Path) -> Result<()> {
    let (program, args) = parse_command_line(cmd)?;
    let status = Command::new(&program)
        .args(&args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| AppError::Command(format!("{}: {}", program, e)))?;
    if status.success() {
        Ok(())
    } else {
        Err(AppError::Command(format!("{} exited with {}", program, status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn undo_cancels_latest_first() {
        let mut queue = DeletionQueue::default();
        let now = Instant::now();
        queue.schedule(PathBuf::from("/a"), now);
        queue.schedule(PathBuf::from("/b"), now);
        assert_eq!(queue.undo(), Some(PathBuf::from("/b")));
        assert!(queue.contains(Path::new("/a")));
        assert_eq!(queue.undo(), Some(PathBuf::from("/a")));
        assert_eq!(queue.undo(), None);
    }

    #[test]
    fn scheduling_twice_is_ignored() {
        let mut queue = DeletionQueue::default();
        let now = Instant::now();
        queue.schedule(PathBuf::from("/a"), now);
        queue.schedule(PathBuf::from("/a"), now);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn only_expired_entries_are_due() {
        let mut queue = DeletionQueue::default();
        let start = Instant::now();
        queue.schedule(PathBuf::from("/old"), start);
        queue.schedule(PathBuf::from("/new"), start + Duration::from_secs(3));

        assert!(queue.take_due(start + Duration::from_secs(5)).is_empty());
        assert_eq!(
            queue.take_due(start + Duration::from_secs(6)),
            vec![PathBuf::from("/old")]
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.take_due(start + Duration::from_secs(10)),
            vec![PathBuf::from("/new")]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn take_all_flushes_queue() {
        let mut queue = DeletionQueue::default();
        let now = Instant::now();
        queue.schedule(PathBuf::from("/a"), now);
        queue.schedule(PathBuf::from("/b"), now);
        assert_eq!(queue.take_all().len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn remove_deletes_files_and_directories() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        File::create(&file).unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(sub.join("nested")).unwrap();
        File::create(sub.join("nested/x")).unwrap();

        let queue = DeletionQueue::default();
        assert!(queue.remove_all(&[file.clone(), sub.clone()]).is_empty());
        assert!(!file.exists());
        assert!(!sub.exists());
    }

    #[test]
    fn remove_symlink_keeps_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();
        File::create(target.join("keep")).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        delete(&link).unwrap();
        assert!(target.join("keep").exists());
        assert!(fs::symlink_metadata(&link).is_err());
    }

    #[test]
    fn failures_are_reported() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let queue = DeletionQueue::default();
        let failed = queue.remove_all(&[missing.clone()]);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, missing);
    }

    #[test]
    fn remove_command_is_used_when_configured() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        File::create(&file).unwrap();
        let queue = DeletionQueue::new(DEFAULT_GRACE, Some("rm -f".into()));
        queue.remove(&file).unwrap();
        assert!(!file.exists());

        let failing = DeletionQueue::new(DEFAULT_GRACE, Some("false".into()));
        assert!(matches!(failing.remove(&file), Err(AppError::Command(_))));
    }

    #[test]
    fn remove_command_keeps_quoted_arguments() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        File::create(&file).unwrap();
        let log = dir.path().join("removed list");
        let cmd = format!(
            r#"sh -c 'echo "$1" > "{}" && rm -- "$1"' remover"#,
            log.display()
        );
        let queue = DeletionQueue::new(DEFAULT_GRACE, Some(cmd));
        queue.remove(&file).unwrap();
        assert!(!file.exists());
        assert_eq!(fs::read_to_string(&log).unwrap().trim(), file.to_string_lossy());
    }
}
