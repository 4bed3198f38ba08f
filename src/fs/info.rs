//! One-line summaries of a file for the status bar.

use std::fs::{self, FileType, Metadata};
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::Path;
use std::time::SystemTime;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Status bar fields for the entry under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub mode: String,
    pub size: String,
    pub modified: String,
    pub link_target: Option<String>,
}

impl FileInfo {
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let meta = fs::symlink_metadata(path)?;
        let link_target = if meta.file_type().is_symlink() {
            fs::read_link(path)
                .ok()
                .map(|t| t.to_string_lossy().to_string())
        } else {
            None
        };
        Ok(Self {
            mode: format_mode(&meta),
            size: format_size(meta.len()),
            modified: meta
                .modified()
                .map(|t| format_mtime(t, SystemTime::now(), local_offset()))
                .unwrap_or_else(|_| "???".to_string()),
            link_target,
        })
    }
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Human readable size with one decimal above bytes, e.g. `1.5KB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, UNITS[unit])
}

fn type_char(ft: FileType) -> char {
    if ft.is_dir() {
        'd'
    } else if ft.is_symlink() {
        'l'
    } else if ft.is_socket() {
        's'
    } else if ft.is_fifo() {
        'p'
    } else if ft.is_char_device() {
        'c'
    } else if ft.is_block_device() {
        'b'
    } else {
        '-'
    }
}

/// `ls -l` style mode string such as `drwxr-xr-x`.
pub fn format_mode(meta: &Metadata) -> String {
    mode_string(type_char(meta.file_type()), meta.permissions().mode())
}

fn mode_string(kind: char, mode: u32) -> String {
    let bit = |mask: u32, ch: char| if mode & mask != 0 { ch } else { '-' };
    let special = |exec: u32, flag: u32, set: char| match (mode & exec != 0, mode & flag != 0) {
        (true, true) => set,
        (false, true) => set.to_ascii_uppercase(),
        (true, false) => 'x',
        (false, false) => '-',
    };
    let mut s = String::with_capacity(10);
    s.push(kind);
    s.push(bit(0o400, 'r'));
    s.push(bit(0o200, 'w'));
    s.push(special(0o100, 0o4000, 's'));
    s.push(bit(0o040, 'r'));
    s.push(bit(0o020, 'w'));
    s.push(special(0o010, 0o2000, 's'));
    s.push(bit(0o004, 'r'));
    s.push(bit(0o002, 'w'));
    s.push(special(0o001, 0o1000, 't'));
    s
}

/// `Jan 2 15:04` for this year, `Jan 2 2006` otherwise.
pub fn format_mtime(modified: SystemTime, now: SystemTime, offset: UtcOffset) -> String {
    let modified = OffsetDateTime::from(modified).to_offset(offset);
    let now = OffsetDateTime::from(now).to_offset(offset);
    let formatted = if modified.year() == now.year() {
        modified.format(format_description!(
            "[month repr:short] [day padding:none] [hour]:[minute]"
        ))
    } else {
        modified.format(format_description!(
            "[month repr:short] [day padding:none] [year]"
        ))
    };
    formatted.unwrap_or_else(|_| "???".to_string())
}
