//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--icons`, `--dirs-first`, `--config`, etc.)
//! 2. `--config <file>`
//! 3. `$GRIDWALK_CONFIG` environment variable (path to config file)
//! 4. Project-local `.gridwalk.toml` in the current working directory
//! 5. Global `~/.config/gridwalk/config.toml`
//! 6. Built-in defaults

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::grid::LayoutLimits;
use crate::search::SearchMode;

// ── Section configs ──────────────────────────────────────────────────────────

/// General browser settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Show dotfiles.
    pub show_hidden: Option<bool>,
    /// List directories only.
    pub dir_only: Option<bool>,
    /// Directories before files.
    pub dirs_first: Option<bool>,
    /// Nerd font icons in front of names.
    pub icons: Option<bool>,
    /// Draw a border around the grid and preview.
    pub with_border: Option<bool>,
    /// Program used to open files (falls back to `$EDITOR`, then `less`).
    pub editor: Option<String>,
}

/// Grid layout settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LayoutConfig {
    pub max_columns: Option<usize>,
    pub long_list_limit: Option<usize>,
    pub long_list_columns: Option<usize>,
    /// Single character drawn between columns.
    pub column_separator: Option<String>,
    /// Single character marking multi-selected entries.
    pub selection_mark: Option<String>,
}

/// Search behaviour.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// "modal" (start with `/`) or "timeout" (type to jump).
    pub mode: Option<String>,
    /// Idle time after which a type-to-jump query restarts.
    pub timeout_ms: Option<u64>,
}

/// Deferred deletion settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DeleteConfig {
    /// Seconds a deletion can be undone.
    pub grace_secs: Option<u64>,
    /// External remover run as `command <path>`, e.g. "trash".
    pub command: Option<String>,
}

/// Preview panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    /// Show the preview panel at startup.
    pub enabled: Option<bool>,
    /// Syntax highlighting theme (syntect theme name).
    pub syntax_theme: Option<String>,
    /// Files larger than this are previewed from their first bytes only.
    pub max_bytes: Option<u64>,
}

/// Filesystem watcher settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    pub enabled: Option<bool>,
    pub debounce_ms: Option<u64>,
}

/// What a custom command receives as arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CommandArgs {
    CurrentDir,
    CurrentFile,
    SelectedFiles,
    #[default]
    SelectedOrCurrentFile,
    Input,
}

/// A user-defined external command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    pub description: String,
    pub cmd: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub args: CommandArgs,
    /// Prompt shown when `args = "input"`.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Status message shown after the command finishes.
    #[serde(default)]
    pub completed_message: Option<String>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub grid_fg: Option<String>,
    pub cursor_bg: Option<String>,
    pub cursor_fg: Option<String>,
    pub dir_fg: Option<String>,
    pub symlink_fg: Option<String>,
    pub exec_fg: Option<String>,
    pub selected_fg: Option<String>,
    pub bar_bg: Option<String>,
    pub bar_fg: Option<String>,
    pub search_bg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
    pub git_untracked_fg: Option<String>,
    pub git_added_fg: Option<String>,
    pub git_modified_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub layout: LayoutConfig,
    pub search: SearchConfig,
    pub delete: DeleteConfig,
    pub preview: PreviewConfig,
    pub watcher: WatcherConfig,
    pub theme: ThemeConfig,
    /// Action name -> key strings, e.g. `up = ["up", "k"]`.
    pub keys: HashMap<String, Vec<String>>,
    /// Lowercase extension -> program used to open such files.
    pub open_with: HashMap<String, String>,
    pub commands: Vec<CommandConfig>,
}

// ── Default constants ────────────────────────────────────────────────────────

pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_GRACE_SECS: u64 = 6;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
/// Bytes read from a text file for its preview (64 KiB).
pub const DEFAULT_PREVIEW_MAX_BYTES: u64 = 65_536;
pub const DEFAULT_SEPARATOR: &str = "    ";

// ── Config file locator ──────────────────────────────────────────────────────

/// Candidate config file paths in priority order, without `--config`.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("GRIDWALK_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".gridwalk.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("gridwalk").join("config.toml"));
    }

    paths
}

/// Read and parse a TOML config file. Missing files are skipped quietly,
/// unparseable ones with a warning.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("failed to parse config file {}: {}", path.display(), e);
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        let mut keys = self.keys;
        keys.extend(other.keys.clone());
        let mut open_with = self.open_with;
        open_with.extend(other.open_with.clone());

        AppConfig {
            general: GeneralConfig {
                show_hidden: other.general.show_hidden.or(self.general.show_hidden),
                dir_only: other.general.dir_only.or(self.general.dir_only),
                dirs_first: other.general.dirs_first.or(self.general.dirs_first),
                icons: other.general.icons.or(self.general.icons),
                with_border: other.general.with_border.or(self.general.with_border),
                editor: other.general.editor.clone().or(self.general.editor),
            },
            layout: LayoutConfig {
                max_columns: other.layout.max_columns.or(self.layout.max_columns),
                long_list_limit: other.layout.long_list_limit.or(self.layout.long_list_limit),
                long_list_columns: other
                    .layout
                    .long_list_columns
                    .or(self.layout.long_list_columns),
                column_separator: other
                    .layout
                    .column_separator
                    .clone()
                    .or(self.layout.column_separator),
                selection_mark: other
                    .layout
                    .selection_mark
                    .clone()
                    .or(self.layout.selection_mark),
            },
            search: SearchConfig {
                mode: other.search.mode.clone().or(self.search.mode),
                timeout_ms: other.search.timeout_ms.or(self.search.timeout_ms),
            },
            delete: DeleteConfig {
                grace_secs: other.delete.grace_secs.or(self.delete.grace_secs),
                command: other.delete.command.clone().or(self.delete.command),
            },
            preview: PreviewConfig {
                enabled: other.preview.enabled.or(self.preview.enabled),
                syntax_theme: other
                    .preview
                    .syntax_theme
                    .clone()
                    .or(self.preview.syntax_theme),
                max_bytes: other.preview.max_bytes.or(self.preview.max_bytes),
            },
            watcher: WatcherConfig {
                enabled: other.watcher.enabled.or(self.watcher.enabled),
                debounce_ms: other.watcher.debounce_ms.or(self.watcher.debounce_ms),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: other.theme.custom.clone().or(self.theme.custom),
            },
            keys,
            open_with,
            commands: if other.commands.is_empty() {
                self.commands
            } else {
                other.commands.clone()
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` comes from `--config`, `cli_overrides` from the other flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so that higher ones overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn show_hidden(&self) -> bool {
        self.general.show_hidden.unwrap_or(true)
    }

    pub fn dir_only(&self) -> bool {
        self.general.dir_only.unwrap_or(false)
    }

    pub fn dirs_first(&self) -> bool {
        self.general.dirs_first.unwrap_or(false)
    }

    pub fn icons(&self) -> bool {
        self.general.icons.unwrap_or(false)
    }

    pub fn with_border(&self) -> bool {
        self.general.with_border.unwrap_or(false)
    }

    /// Program used to open files.
    pub fn editor(&self) -> String {
        self.general
            .editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.is_empty()))
            .unwrap_or_else(|| "less".to_string())
    }

    pub fn layout_limits(&self) -> LayoutLimits {
        let defaults = LayoutLimits::default();
        LayoutLimits {
            max_columns: self
                .layout
                .max_columns
                .unwrap_or(defaults.max_columns)
                .max(1),
            long_list_limit: self.layout.long_list_limit.unwrap_or(defaults.long_list_limit),
            long_list_columns: self
                .layout
                .long_list_columns
                .unwrap_or(defaults.long_list_columns)
                .max(1),
            separator_width: self.column_separator().chars().count(),
        }
    }

    /// Separator between grid columns; a configured character `c` becomes `" c  "`.
    pub fn column_separator(&self) -> String {
        match self
            .layout
            .column_separator
            .as_deref()
            .and_then(|s| s.chars().next())
        {
            Some(c) => format!(" {}  ", c),
            None => DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn selection_mark(&self) -> char {
        self.layout
            .selection_mark
            .as_deref()
            .and_then(|s| s.chars().next())
            .unwrap_or('+')
    }

    pub fn search_mode(&self) -> SearchMode {
        SearchMode::from_name(self.search.mode.as_deref().unwrap_or("modal"))
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search.timeout_ms.unwrap_or(DEFAULT_SEARCH_TIMEOUT_MS))
    }

    pub fn delete_grace(&self) -> Duration {
        Duration::from_secs(self.delete.grace_secs.unwrap_or(DEFAULT_GRACE_SECS))
    }

    pub fn remove_command(&self) -> Option<String> {
        self.delete.command.clone().filter(|c| !c.trim().is_empty())
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview.enabled.unwrap_or(false)
    }

    pub fn syntax_theme_name(&self) -> &str {
        self.preview
            .syntax_theme
            .as_deref()
            .unwrap_or("base16-ocean.dark")
    }

    pub fn preview_max_bytes(&self) -> u64 {
        self.preview.max_bytes.unwrap_or(DEFAULT_PREVIEW_MAX_BYTES)
    }

    pub fn watcher_enabled(&self) -> bool {
        self.watcher.enabled.unwrap_or(true)
    }

    pub fn debounce_ms(&self) -> u64 {
        self.watcher.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    /// Program configured for the extension of `path`, if any.
    pub fn open_with(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.open_with.get(&ext).map(String::as_str)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert!(cfg.show_hidden());
        assert!(!cfg.dir_only());
        assert!(!cfg.dirs_first());
        assert!(!cfg.icons());
        assert!(!cfg.with_border());
        assert!(!cfg.preview_enabled());
        assert_eq!(cfg.layout_limits(), LayoutLimits::default());
        assert_eq!(cfg.column_separator(), "    ");
        assert_eq!(cfg.selection_mark(), '+');
        assert_eq!(cfg.search_mode(), SearchMode::Modal);
        assert_eq!(cfg.search_timeout(), Duration::from_secs(1));
        assert_eq!(cfg.delete_grace(), Duration::from_secs(6));
        assert_eq!(cfg.remove_command(), None);
        assert!(cfg.watcher_enabled());
        assert_eq!(cfg.debounce_ms(), 300);
        assert_eq!(cfg.syntax_theme_name(), "base16-ocean.dark");
        assert_eq!(cfg.theme.scheme, None);
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
show_hidden = false
dir_only = true
dirs_first = true
icons = true
with_border = true
editor = "nvim"

[layout]
max_columns = 6
long_list_limit = 50
long_list_columns = 3
column_separator = "|"
selection_mark = "*x"

[search]
mode = "timeout"
timeout_ms = 1500

[delete]
grace_secs = 10
command = "trash"

[preview]
enabled = true

[watcher]
enabled = false

[keys]
up = ["up", "k"]
quit = ["q"]

[open_with]
pdf = "zathura"

[[commands]]
description = "Compress"
cmd = "tar czf out.tgz"
key = "ctrl+z"
args = "selectedFiles"
completed_message = "Done"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert!(!cfg.show_hidden());
        assert!(cfg.dir_only());
        assert!(cfg.dirs_first());
        assert!(cfg.icons());
        assert!(cfg.with_border());
        assert_eq!(cfg.editor(), "nvim");
        let limits = cfg.layout_limits();
        assert_eq!(limits.max_columns, 6);
        assert_eq!(limits.long_list_limit, 50);
        assert_eq!(limits.long_list_columns, 3);
        assert_eq!(limits.separator_width, 4);
        assert_eq!(cfg.column_separator(), " |  ");
        assert_eq!(cfg.selection_mark(), '*');
        assert_eq!(cfg.search_mode(), SearchMode::Timeout);
        assert_eq!(cfg.search_timeout(), Duration::from_millis(1500));
        assert_eq!(cfg.delete_grace(), Duration::from_secs(10));
        assert_eq!(cfg.remove_command().as_deref(), Some("trash"));
        assert!(cfg.preview_enabled());
        assert!(!cfg.watcher_enabled());
        assert_eq!(cfg.keys["up"], vec!["up", "k"]);
        assert_eq!(cfg.open_with(Path::new("/x/Report.PDF")), Some("zathura"));
        assert_eq!(cfg.open_with(Path::new("/x/notes")), None);
        assert_eq!(cfg.commands.len(), 1);
        assert_eq!(cfg.commands[0].args, CommandArgs::SelectedFiles);
        assert_eq!(cfg.commands[0].completed_message.as_deref(), Some("Done"));
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert!(cfg.show_hidden());
        assert!(cfg.commands.is_empty());
    }

    #[test]
    fn test_command_args_default() {
        let toml = r#"
[[commands]]
description = "Open in browser"
cmd = "firefox"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.commands[0].args, CommandArgs::SelectedOrCurrentFile);
        assert!(cfg.commands[0].key.is_none());
    }

    #[test]
    fn test_invalid_command_args_fail() {
        let toml = r#"
[[commands]]
description = "x"
cmd = "y"
args = "everything"
"#;
        assert!(toml::from_str::<AppConfig>(toml).is_err());
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = AppConfig {
            general: GeneralConfig {
                show_hidden: Some(false),
                icons: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        base.keys.insert("up".into(), vec!["k".into()]);
        base.keys.insert("down".into(), vec!["j".into()]);

        let mut over = AppConfig {
            general: GeneralConfig {
                show_hidden: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        over.keys.insert("up".into(), vec!["w".into()]);

        let merged = base.merge(&over);
        assert!(merged.show_hidden());
        assert!(merged.icons());
        assert_eq!(merged.keys["up"], vec!["w"]);
        assert_eq!(merged.keys["down"], vec!["j"]);
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            delete: DeleteConfig {
                grace_secs: Some(2),
                command: Some("trash".into()),
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert_eq!(merged.delete_grace(), Duration::from_secs(2));
        assert_eq!(merged.remove_command().as_deref(), Some("trash"));
    }

    #[test]
    fn test_zero_columns_are_clamped() {
        let cfg: AppConfig = toml::from_str("[layout]\nmax_columns = 0\nlong_list_columns = 0\n").unwrap();
        let limits = cfg.layout_limits();
        assert_eq!(limits.max_columns, 1);
        assert_eq!(limits.long_list_columns, 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[general]
dirs_first = true

[layout]
max_columns = 4
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert!(cfg.dirs_first());
        assert_eq!(cfg.layout_limits().max_columns, 4);
        assert_eq!(cfg.layout_limits().long_list_limit, 100);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[general]
icons = true
dir_only = false
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            general: GeneralConfig {
                dir_only: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        assert!(cfg.dir_only());
        assert!(cfg.icons());
    }
}
