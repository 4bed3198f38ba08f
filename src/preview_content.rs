//! Content for the preview pane: directory listings, highlighted text,
//! image thumbnails and a metadata card for binaries.

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use image::imageops::FilterType;
use image::GenericImageView;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::fs::info::FileInfo;

const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Known binary file extensions.
const BINARY_EXTENSIONS: &[&str] = &[
    "zip", "tar", "gz", "bz2", "xz", "zst", "7z", "so", "dylib", "a", "o", "exe", "bin", "img",
    "iso", "pdf", "class", "jar", "wasm",
];

/// Syntax definitions and the color theme, loaded once.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new(theme_name: &str) -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme: load_theme(theme_name),
        }
    }
}

/// What to show for `path` in a `width` x `height` pane.
pub struct PreviewRequest<'a> {
    pub path: &'a Path,
    pub width: u16,
    pub height: u16,
    pub show_hidden: bool,
    pub max_bytes: u64,
}

/// Build the preview lines for a request. Never fails; problems become a
/// single red line.
pub fn load_preview(req: &PreviewRequest<'_>, highlighter: &Highlighter) -> Vec<Line<'static>> {
    let meta = match fs::metadata(req.path) {
        Ok(m) => m,
        Err(e) => return vec![error_line(format!("{}: {}", req.path.display(), e))],
    };
    let height = usize::from(req.height);
    if meta.is_dir() {
        load_directory_listing(req.path, req.show_hidden, height)
    } else if is_image(req.path) {
        load_image(req.path, req.width, req.height).unwrap_or_else(|_| load_binary_metadata(req.path))
    } else if is_binary_file(req.path) {
        load_binary_metadata(req.path)
    } else {
        load_highlighted_content(req.path, highlighter, height, req.max_bytes)
    }
}

fn error_line(msg: String) -> Line<'static> {
    Line::from(Span::styled(msg, Style::default().fg(Color::Red)))
}

/// Detect the syntax name for a file based on its extension.
pub fn detect_syntax_name(path: &Path) -> &str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => "Python",
        Some("rs") => "Rust",
        Some("yaml" | "yml") => "YAML",
        Some("json") => "JSON",
        Some("toml") => "TOML",
        Some("sh" | "bash" | "zsh") => "Bash",
        Some("md" | "markdown") => "Markdown",
        Some("html" | "htm") => "HTML",
        Some("css") => "CSS",
        Some("js" | "jsx" | "mjs") => "JavaScript",
        Some("ts" | "tsx") => "TypeScript",
        Some("c" | "h") => "C",
        Some("cpp" | "hpp" | "cc") => "C++",
        Some("java") => "Java",
        Some("go") => "Go",
        Some("rb") => "Ruby",
        None => detect_from_shebang(path),
        _ => "Plain Text",
    }
}

/// Syntax for extensionless scripts, from the `#!` line.
fn detect_from_shebang(path: &Path) -> &str {
    let Ok(file) = fs::File::open(path) else {
        return "Plain Text";
    };
    let mut first_line = String::new();
    if BufReader::new(file).read_line(&mut first_line).is_err() || !first_line.starts_with("#!") {
        return "Plain Text";
    }
    let line = first_line.to_lowercase();
    if line.contains("python") {
        "Python"
    } else if line.contains("bash") || line.contains("/sh") {
        "Bash"
    } else if line.contains("ruby") {
        "Ruby"
    } else if line.contains("node") || line.contains("deno") {
        "JavaScript"
    } else if line.contains("perl") {
        "Perl"
    } else {
        "Plain Text"
    }
}

/// Built-in syntect theme by name, falling back to the default dark one.
pub fn load_theme(name: &str) -> Theme {
    let mut set = ThemeSet::load_defaults();
    if let Some(theme) = set.themes.remove(name) {
        return theme;
    }
    log::warn!("unknown syntax theme {:?}, using {}", name, DEFAULT_SYNTAX_THEME);
    set.themes.remove(DEFAULT_SYNTAX_THEME).unwrap_or_default()
}

/// First `max_lines` lines of a text file, highlighted.
///
/// At most `max_bytes` are read; invalid UTF-8 is replaced.
pub fn load_highlighted_content(
    path: &Path,
    highlighter: &Highlighter,
    max_lines: usize,
    max_bytes: u64,
) -> Vec<Line<'static>> {
    let mut bytes = Vec::new();
    let read = fs::File::open(path).and_then(|f| f.take(max_bytes).read_to_end(&mut bytes));
    if let Err(e) = read {
        return vec![error_line(format!("Error reading file: {}", e))];
    }
    let content = String::from_utf8_lossy(&bytes);
    if content.is_empty() {
        return vec![Line::from(Span::styled(
            "(empty file)",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let ss = &highlighter.syntaxes;
    let syntax = ss
        .find_syntax_by_name(detect_syntax_name(path))
        .or_else(|| ss.find_syntax_by_extension(path.extension()?.to_str()?))
        .unwrap_or_else(|| ss.find_syntax_plain_text());
    let mut lines = HighlightLines::new(syntax, &highlighter.theme);

    content
        .lines()
        .take(max_lines)
        .map(|text| {
            // Tabs would desync ratatui's width accounting.
            let text = text.replace('\t', "    ");
            match lines.highlight_line(&text, ss) {
                Ok(ranges) => Line::from(
                    ranges
                        .into_iter()
                        .map(|(style, part)| {
                            let fg = style.foreground;
                            Span::styled(part.to_string(), Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)))
                        })
                        .collect::<Vec<_>>(),
                ),
                Err(_) => Line::from(text),
            }
        })
        .collect()
}

/// Names inside a directory, sorted, with a trailing `/` on subdirectories.
pub fn load_directory_listing(path: &Path, show_hidden: bool, max_lines: usize) -> Vec<Line<'static>> {
    let entries = match fs::read_dir(path) {
        Ok(e) => e,
        Err(e) => return vec![error_line(format!("cannot list {}: {}", path.display(), e))],
    };
    let mut names: Vec<(String, bool)> = entries
        .flatten()
        .map(|e| {
            let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
            (e.file_name().to_string_lossy().to_string(), is_dir)
        })
        .filter(|(name, _)| show_hidden || !name.starts_with('.'))
        .collect();
    if names.is_empty() {
        return vec![Line::from(Span::styled(
            "(empty directory)",
            Style::default().fg(Color::DarkGray),
        ))];
    }
    names.sort();

    let dir_style = Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD);
    names
        .into_iter()
        .take(max_lines)
        .map(|(name, is_dir)| {
            if is_dir {
                Line::from(Span::styled(format!("{}/", name), dir_style))
            } else {
                Line::from(name)
            }
        })
        .collect()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|i| i.eq_ignore_ascii_case(ext)))
}

/// Check if a file is binary by extension or null-byte scan.
pub fn is_binary_file(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if BINARY_EXTENSIONS.iter().any(|b| b.eq_ignore_ascii_case(ext)) {
            return true;
        }
    }
    let Ok(file) = fs::File::open(path) else {
        return false;
    };
    let mut buf = [0u8; 8192];
    match BufReader::new(file).read(&mut buf) {
        Ok(n) => buf[..n].contains(&0),
        Err(_) => false,
    }
}

/// Thumbnail drawn with upper half blocks, two pixel rows per cell.
pub fn load_image(path: &Path, width: u16, height: u16) -> image::ImageResult<Vec<Line<'static>>> {
    let img = image::open(path)?;
    let (cols, rows) = (u32::from(width.max(1)), u32::from(height.max(1)) * 2);
    let thumb = img.resize(cols, rows, FilterType::Triangle).to_rgba8();
    let (w, h) = thumb.dimensions();

    let mut lines = Vec::with_capacity(h.div_ceil(2) as usize);
    for y in (0..h).step_by(2) {
        let spans: Vec<Span<'static>> = (0..w)
            .map(|x| {
                let top = thumb.get_pixel(x, y);
                let style = Style::default().fg(Color::Rgb(top[0], top[1], top[2]));
                let style = if y + 1 < h {
                    let bottom = thumb.get_pixel(x, y + 1);
                    style.bg(Color::Rgb(bottom[0], bottom[1], bottom[2]))
                } else {
                    style
                };
                Span::styled("▀", style)
            })
            .collect();
        lines.push(Line::from(spans));
    }
    let (ow, oh) = img.dimensions();
    lines.push(Line::from(Span::styled(
        format!("{}x{}", ow, oh),
        Style::default().fg(Color::DarkGray),
    )));
    Ok(lines)
}

/// Metadata card for files that cannot be shown as text.
pub fn load_binary_metadata(path: &Path) -> Vec<Line<'static>> {
    let info = match FileInfo::load(path) {
        Ok(info) => info,
        Err(e) => return vec![error_line(format!("Error reading metadata: {}", e))],
    };

    let label_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let value_style = Style::default().fg(Color::White);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let field = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, label_style), Span::styled(value, value_style)])
    };
    vec![
        Line::from(""),
        field("  File: ", file_name),
        field("  Size: ", info.size),
        field("  Modified: ", info.modified),
        field("  Mode: ", info.mode),
        Line::from(""),
        Line::from(Span::styled(
            "  [binary file]",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn request(path: &Path) -> PreviewRequest<'_> {
        PreviewRequest {
            path,
            width: 20,
            height: 10,
            show_hidden: true,
            max_bytes: 1024,
        }
    }

    #[test]
    fn detect_syntax_by_extension() {
        assert_eq!(detect_syntax_name(Path::new("foo.rs")), "Rust");
        assert_eq!(detect_syntax_name(Path::new("bar.py")), "Python");
        assert_eq!(detect_syntax_name(Path::new("baz.yml")), "YAML");
        assert_eq!(detect_syntax_name(Path::new("app.tsx")), "TypeScript");
        assert_eq!(detect_syntax_name(Path::new("file.xyz")), "Plain Text");
    }

    #[test]
    fn detect_shebang() {
        let dir = TempDir::new().unwrap();
        let py = dir.path().join("script");
        writeln!(File::create(&py).unwrap(), "#!/usr/bin/env python3").unwrap();
        assert_eq!(detect_syntax_name(&py), "Python");

        let sh = dir.path().join("run");
        writeln!(File::create(&sh).unwrap(), "#!/bin/sh").unwrap();
        assert_eq!(detect_syntax_name(&sh), "Bash");

        let plain = dir.path().join("data");
        writeln!(File::create(&plain).unwrap(), "just text").unwrap();
        assert_eq!(detect_syntax_name(&plain), "Plain Text");
    }

    #[test]
    fn unknown_theme_falls_back() {
        let theme = load_theme("nonexistent-theme");
        assert!(!theme.scopes.is_empty());
    }

    #[test]
    fn text_preview_is_capped_to_height() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.rs");
        let mut f = File::create(&path).unwrap();
        for i in 0..50 {
            writeln!(f, "let x{} = {};", i, i).unwrap();
        }
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME);
        let lines = load_preview(&request(&path), &hl);
        assert_eq!(lines.len(), 10);
        assert_eq!(text_of(&lines[0]), "let x0 = 0;");
    }

    #[test]
    fn text_preview_respects_byte_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.txt");
        fs::write(&path, "abcdefghij\nsecond line\n").unwrap();
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME);
        let lines = load_highlighted_content(&path, &hl, 10, 4);
        assert_eq!(lines.len(), 1);
        assert_eq!(text_of(&lines[0]), "abcd");
    }

    #[test]
    fn empty_file_preview() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        File::create(&path).unwrap();
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME);
        let lines = load_preview(&request(&path), &hl);
        assert_eq!(text_of(&lines[0]), "(empty file)");
    }

    #[test]
    fn directory_preview_lists_sorted_names() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("b.txt")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();

        let lines = load_directory_listing(dir.path(), false, 10);
        let names: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(names, vec!["b.txt", "sub/"]);

        let lines = load_directory_listing(dir.path(), true, 10);
        assert_eq!(lines.len(), 3);

        let lines = load_directory_listing(dir.path(), true, 2);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn empty_directory_preview() {
        let dir = TempDir::new().unwrap();
        let lines = load_directory_listing(dir.path(), true, 10);
        assert_eq!(text_of(&lines[0]), "(empty directory)");
    }

    #[test]
    fn binary_detection() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("blob");
        fs::write(&bin, [0u8, 1, 2, 3]).unwrap();
        assert!(is_binary_file(&bin));
        assert!(is_binary_file(Path::new("archive.ZIP")));

        let text = dir.path().join("notes.txt");
        fs::write(&text, "hello").unwrap();
        assert!(!is_binary_file(&text));
    }

    #[test]
    fn binary_preview_shows_metadata() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("blob.bin");
        fs::write(&bin, [0u8; 2048]).unwrap();
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME);
        let lines = load_preview(&request(&bin), &hl);
        let text: Vec<String> = lines.iter().map(text_of).collect();
        assert!(text.iter().any(|l| l.contains("blob.bin")));
        assert!(text.iter().any(|l| l.contains("2.0KB")));
    }

    #[test]
    fn image_preview_uses_half_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dot.png");
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let lines = load_image(&path, 4, 2).unwrap();
        // Two cell rows of pixels plus the size caption.
        assert_eq!(lines.len(), 3);
        assert_eq!(text_of(&lines[0]), "▀▀▀▀");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Rgb(255, 0, 0)));
        assert_eq!(text_of(&lines[2]), "4x4");
    }

    #[test]
    fn broken_image_falls_back_to_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not a png").unwrap();
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME);
        let lines = load_preview(&request(&path), &hl);
        assert!(lines.iter().map(text_of).any(|l| l.contains("[binary file]")));
    }

    #[test]
    fn missing_path_is_an_error_line() {
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME);
        let lines = load_preview(&request(Path::new("/nonexistent/x")), &hl);
        assert_eq!(lines.len(), 1);
        assert!(text_of(&lines[0]).contains("/nonexistent/x"));
    }
}
