use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use unicode_width::UnicodeWidthStr;

/// Indentation added per tree level in front of a name.
pub const TREE_INDENT: &str = "    ";

/// One row of a listing.
///
/// Kind flags come from `symlink_metadata`, so a symlink to a directory is a
/// symlink here and not a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Directory this entry lives in.
    pub parent: PathBuf,
    pub name: String,
    /// Nesting level inside the listing; 0 for the directory being browsed.
    pub depth: usize,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub is_executable: bool,
    /// Multi-select flag, independent of the cursor.
    pub is_selected: bool,
    pub icon: Option<&'static str>,
    /// Spaces needed to pad this entry to the widest entry of the listing.
    pub padding: usize,
}

impl FileEntry {
    pub fn from_path(path: &Path, depth: usize) -> std::io::Result<Self> {
        let metadata = fs::symlink_metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let file_type = metadata.file_type();
        let is_dir = file_type.is_dir();
        Ok(Self {
            parent,
            name,
            depth,
            is_dir,
            is_symlink: file_type.is_symlink(),
            is_executable: !is_dir && metadata.permissions().mode() & 0o111 != 0,
            is_selected: false,
            icon: None,
            padding: 0,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.parent.join(&self.name)
    }

    /// Type marker appended to the name.
    pub fn suffix(&self) -> &'static str {
        if self.is_dir {
            "/"
        } else if self.is_symlink {
            "@"
        } else if self.is_executable {
            "*"
        } else {
            ""
        }
    }

    /// Text before the name: selection mark, icon and tree indent.
    pub fn prefix(&self, mark: char) -> String {
        let mut s = String::new();
        s.push(if self.is_selected { mark } else { ' ' });
        s.push(' ');
        if let Some(icon) = self.icon {
            s.push_str(icon);
            s.push(' ');
        }
        for _ in 0..self.depth {
            s.push_str(TREE_INDENT);
        }
        s
    }

    /// Full unpadded label as drawn in the grid.
    pub fn display_name(&self, mark: char) -> String {
        format!("{}{}{}", self.prefix(mark), self.name, self.suffix())
    }

    /// Terminal columns taken by the unpadded label.
    pub fn display_width(&self) -> usize {
        // The mark is a single cell whether or not the entry is selected.
        self.display_name(' ').width()
    }
}

/// Pad every entry to the widest label of the listing.
pub fn assign_padding(entries: &mut [FileEntry]) {
    let widths: Vec<usize> = entries.iter().map(FileEntry::display_width).collect();
    let max = widths.iter().copied().max().unwrap_or(0);
    for (entry, width) in entries.iter_mut().zip(widths) {
        entry.padding = max - width;
    }
}

/// Nerd-font glyph for an entry.
pub fn icon_for(entry: &FileEntry) -> &'static str {
    if entry.is_dir {
        return match entry.name.as_str() {
            ".git" => "\u{e5fb}",
            "node_modules" => "\u{e5fa}",
            ".config" => "\u{e5fc}",
            _ => "\u{f115}",
        };
    }
    if entry.is_symlink {
        return "\u{f0c1}";
    }
    match entry.name.as_str() {
        "Cargo.toml" | "Cargo.lock" => return "\u{e7a8}",
        "Makefile" | "Dockerfile" => return "\u{f489}",
        "LICENSE" => return "\u{f0219}",
        _ => {}
    }
    let ext = Path::new(&entry.name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("rs") => "\u{e7a8}",
        Some("go") => "\u{e626}",
        Some("py") => "\u{e606}",
        Some("js" | "mjs" | "cjs") => "\u{e74e}",
        Some("ts" | "tsx") => "\u{e628}",
        Some("c" | "h") => "\u{e61e}",
        Some("cpp" | "cc" | "hpp") => "\u{e61d}",
        Some("java") => "\u{e738}",
        Some("rb") => "\u{e21e}",
        Some("sh" | "bash" | "zsh" | "fish") => "\u{f489}",
        Some("md" | "markdown") => "\u{e609}",
        Some("json") => "\u{e60b}",
        Some("toml" | "yaml" | "yml" | "ini" | "conf") => "\u{e615}",
        Some("html" | "htm") => "\u{e736}",
        Some("css" | "scss") => "\u{e749}",
        Some("png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" | "ico") => "\u{f1c5}",
        Some("zip" | "tar" | "gz" | "xz" | "bz2" | "7z" | "rar" | "zst") => "\u{f410}",
        Some("pdf") => "\u{f1c1}",
        Some("mp3" | "flac" | "wav" | "ogg") => "\u{f001}",
        Some("mp4" | "mkv" | "webm" | "mov" | "avi") => "\u{f03d}",
        Some("lock") => "\u{f023}",
        _ if entry.is_executable => "\u{f489}",
        _ => "\u{f15b}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn entry(name: &str) -> FileEntry {
        FileEntry {
            parent: PathBuf::from("/tmp"),
            name: name.to_string(),
            depth: 0,
            is_dir: false,
            is_symlink: false,
            is_executable: false,
            is_selected: false,
            icon: None,
            padding: 0,
        }
    }

    #[test]
    fn from_path_reads_kind() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let file = dir.path().join("run.sh");
        File::create(&file).unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o755)).unwrap();
        std::os::unix::fs::symlink(&file, dir.path().join("link")).unwrap();

        let sub = FileEntry::from_path(&dir.path().join("sub"), 0).unwrap();
        assert!(sub.is_dir && !sub.is_executable);
        assert_eq!(sub.parent, dir.path());

        let exe = FileEntry::from_path(&file, 1).unwrap();
        assert!(exe.is_executable);
        assert_eq!(exe.depth, 1);

        let link = FileEntry::from_path(&dir.path().join("link"), 0).unwrap();
        assert!(link.is_symlink && !link.is_dir);
    }

    #[test]
    fn suffix_by_kind() {
        let mut e = entry("a");
        assert_eq!(e.suffix(), "");
        e.is_executable = true;
        assert_eq!(e.suffix(), "*");
        e.is_symlink = true;
        assert_eq!(e.suffix(), "@");
        e.is_dir = true;
        assert_eq!(e.suffix(), "/");
    }

    #[test]
    fn display_name_includes_mark_indent_and_icon() {
        let mut e = entry("src");
        e.is_dir = true;
        e.depth = 2;
        assert_eq!(e.display_name('+'), "          src/");
        e.is_selected = true;
        assert_eq!(e.display_name('+'), "+         src/");
        e.icon = Some("I");
        e.depth = 0;
        assert_eq!(e.display_name('+'), "+ I src/");
    }

    #[test]
    fn width_counts_wide_characters() {
        let e = entry("日本");
        assert_eq!(e.display_width(), 2 + 4);
    }

    #[test]
    fn padding_aligns_to_widest() {
        let mut entries = vec![entry("a"), entry("abcd"), entry("ab")];
        assign_padding(&mut entries);
        let padded: Vec<usize> = entries
            .iter()
            .map(|e| e.display_width() + e.padding)
            .collect();
        assert_eq!(padded, vec![6, 6, 6]);
        assert_eq!(entries[1].padding, 0);
    }

    #[test]
    fn icons_by_extension_and_kind() {
        let mut d = entry("docs");
        d.is_dir = true;
        assert_eq!(icon_for(&d), "\u{f115}");
        assert_eq!(icon_for(&entry("main.RS")), "\u{e7a8}");
        assert_eq!(icon_for(&entry("notes")), "\u{f15b}");
    }
}
