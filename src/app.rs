use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ratatui::text::Line;
use unicode_width::UnicodeWidthStr;

use crate::commands::{
    command_with_input, plan_custom_command, CommandContext, CustomCommandPlan, Effect,
    ExternalCommand, ExternalOutcome,
};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::fs::deletion::DeletionQueue;
use crate::fs::entry::FileEntry;
use crate::fs::git::GitStatus;
use crate::fs::info::FileInfo;
use crate::fs::lister::{list, ListOptions, OpenTreeSet};
use crate::grid::{scroll, GridLayout, LayoutLimits, Motion, PositionMemory};
use crate::keymap::KeyBindings;
use crate::preview_content::{load_preview, Highlighter, PreviewRequest};
use crate::search::{SearchMode, SearchState};
use crate::theme::{resolve_theme, ThemeColors};

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// How the browser was asked to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Print the current directory and run pending deletions.
    Graceful,
    /// Print nothing and abandon pending deletions.
    Force,
}

/// Text input for a custom command with `args = "input"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    pub command: usize,
    pub title: String,
    pub input: String,
    /// Byte offset of the edit cursor inside `input`.
    pub cursor_position: usize,
}

impl Prompt {
    pub fn insert(&mut self, c: char) {
        self.input.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
            self.input.remove(self.cursor_position);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor_position..].chars().next() {
            self.cursor_position += next.len_utf8();
        }
    }
}

/// Floating window drawn above the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    Help {
        scroll: usize,
    },
    CommandMenu {
        selected: usize,
    },
    Prompt(Prompt),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

struct PreviewCache {
    path: PathBuf,
    width: u16,
    height: u16,
    lines: Vec<Line<'static>>,
}

/// Browser state. Every user action is a method here; rendering only reads
/// it (and fills the preview cache).
pub struct App {
    pub config: AppConfig,
    pub keys: KeyBindings,
    pub theme: ThemeColors,

    /// Directory being browsed.
    pub path: PathBuf,
    /// Flat listing, tree-expanded directories inlined.
    pub files: Vec<FileEntry>,
    pub grid: GridLayout,
    /// Flat index of the cursor entry.
    pub cursor: usize,
    /// First visible grid row.
    pub offset: usize,
    /// Grid area in terminal cells.
    pub width: usize,
    pub height: usize,

    pub positions: PositionMemory,
    pub open_tree: OpenTreeSet,
    pub selected: HashSet<PathBuf>,
    pub options: ListOptions,
    pub limits: LayoutLimits,
    pub separator: String,
    pub mark: char,

    pub deletions: DeletionQueue,
    pub search: SearchState,
    pub git: GitStatus,
    /// Why the last listing failed; drawn in place of the grid.
    pub list_error: Option<String>,
    pub show_preview: bool,
    pub overlay: Overlay,
    pub status: Option<StatusMessage>,
    pub exit: Option<ExitKind>,

    /// Path to put the cursor on after the next relayout.
    remembered: Option<PathBuf>,
    highlighter: Option<Highlighter>,
    preview: Option<PreviewCache>,
}

impl App {
    /// Browser rooted at `path`. A listing failure is not fatal; it shows up
    /// in `list_error`.
    pub fn new(path: PathBuf, config: AppConfig) -> Self {
        let keys = KeyBindings::new(&config.keys, &config.commands);
        let theme = resolve_theme(&config.theme);
        let options = ListOptions {
            show_hidden: config.show_hidden(),
            dir_only: config.dir_only(),
            dirs_first: config.dirs_first(),
            icons: config.icons(),
        };
        let deletions = DeletionQueue::new(config.delete_grace(), config.remove_command());
        let search = SearchState::new(config.search_mode(), config.search_timeout());

        let mut app = Self {
            keys,
            theme,
            limits: config.layout_limits(),
            separator: config.column_separator(),
            mark: config.selection_mark(),
            show_preview: config.preview_enabled(),
            config,
            path,
            files: Vec::new(),
            grid: GridLayout::default(),
            cursor: 0,
            offset: 0,
            width: 80,
            height: 24,
            positions: PositionMemory::new(),
            open_tree: OpenTreeSet::new(),
            selected: HashSet::new(),
            options,
            deletions,
            search,
            git: GitStatus::default(),
            list_error: None,
            overlay: Overlay::None,
            status: None,
            exit: None,
            remembered: None,
            highlighter: None,
            preview: None,
        };
        app.relist();
        app
    }

    // ── Listing and layout ──────────────────────────────────────────────

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&FileEntry> {
        self.files.get(self.cursor)
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.current().map(FileEntry::path)
    }

    /// Selected entries in listing order.
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|e| e.is_selected)
            .map(FileEntry::path)
            .collect()
    }

    /// Resize the grid area. The cursor stays on the same entry.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.remembered = self.current_path();
        self.relayout();
    }

    /// Re-read the current directory in place, keeping the cursor on the
    /// same path when it still exists.
    pub fn relist(&mut self) -> bool {
        if self.remembered.is_none() {
            self.remembered = self.current_path();
        }
        match list(&self.path, &self.open_tree, &self.options, &self.deletions.paths()) {
            Ok(files) => {
                self.list_error = None;
                self.install_listing(files);
                self.git = GitStatus::load(&self.path);
                self.relayout();
                true
            }
            Err(e) => {
                log::warn!("{}", e);
                self.list_error = Some(e.to_string());
                self.remembered = None;
                false
            }
        }
    }

    fn install_listing(&mut self, mut files: Vec<FileEntry>) {
        let present: HashSet<PathBuf> = files.iter().map(FileEntry::path).collect();
        self.selected.retain(|p| present.contains(p));
        for entry in &mut files {
            entry.is_selected = self.selected.contains(&entry.path());
        }
        self.files = files;
        self.preview = None;
    }

    /// Recompute the grid for the current listing and viewport.
    fn relayout(&mut self) {
        let widths: Vec<usize> = self
            .files
            .iter()
            .map(|e| e.display_width() + e.padding)
            .collect();
        self.grid = GridLayout::compute(&widths, self.width, self.height, &self.limits);
        log::debug!(
            "layout {}x{} over {} cells",
            self.grid.columns,
            self.grid.rows,
            self.grid.total_width(self.separator.width())
        );
        if let Some(path) = self.remembered.take() {
            self.cursor = self
                .files
                .iter()
                .position(|e| e.path() == path)
                .unwrap_or(0);
        }
        self.cursor = self.cursor.min(self.files.len().saturating_sub(1));
        self.sync_offset();
    }

    /// Scroll so the cursor row is visible and remember the position.
    fn sync_offset(&mut self) {
        let (_, row) = self.grid.position(self.cursor);
        self.offset = scroll::update_offset(row, self.offset, self.height, self.grid.rows);
        self.positions.save(&self.path, self.cursor, self.offset);
    }

    /// Switch to `dir`. The cursor goes to the position saved for `dir`, or
    /// to `focus`, or to the first entry.
    fn enter_directory(&mut self, dir: PathBuf, focus: Option<PathBuf>) -> bool {
        let files = match list(&dir, &OpenTreeSet::new(), &self.options, &self.deletions.paths()) {
            Ok(files) => files,
            Err(e) => {
                log::warn!("{}", e);
                self.list_error = Some(e.to_string());
                return false;
            }
        };

        // Saved indices of deeper levels would be guesses once the tree
        // above them is gone.
        if dir != self.path && dir.starts_with(&self.path) && dir.parent() != Some(self.path.as_path()) {
            self.positions.clear();
        }
        self.open_tree.clear();
        self.selected.clear();
        self.search.stop();
        self.path = dir;
        self.list_error = None;
        self.install_listing(files);
        self.git = GitStatus::load(&self.path);

        match self.positions.get(&self.path) {
            Some(saved) => {
                self.cursor = saved.index;
                self.offset = saved.offset;
                self.remembered = None;
            }
            None => {
                self.cursor = 0;
                self.offset = 0;
                self.remembered = focus;
            }
        }
        self.relayout();
        true
    }

    // ── Navigation ──────────────────────────────────────────────────────

    pub fn move_cursor(&mut self, motion: Motion) {
        self.cursor = motion.apply(self.cursor, &self.grid);
        self.sync_offset();
    }

    /// Go to the parent directory with the cursor on the one we left.
    pub fn go_up(&mut self) {
        let Some(parent) = self.path.parent().map(Path::to_path_buf) else {
            return;
        };
        let from = self.path.clone();
        self.enter_directory(parent, Some(from));
    }

    /// Enter the directory under the cursor or open the file with its program.
    pub fn open_current(&mut self) -> Option<Effect> {
        let path = self.current_path()?;
        if path.is_dir() {
            self.enter_directory(path, None);
            return None;
        }
        let program = self
            .config
            .open_with(&path)
            .map(str::to_string)
            .unwrap_or_else(|| self.config.editor());
        match ExternalCommand::from_line(&program, &[path], &self.path) {
            Ok(run) => Some(Effect::Run(run)),
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }

    /// Enter the directory under the cursor; files are ignored.
    pub fn open_dir(&mut self) {
        if let Some(path) = self.current_path().filter(|p| p.is_dir()) {
            self.enter_directory(path, None);
        }
    }

    /// Expand the directory under the cursor inline.
    pub fn open_tree(&mut self) {
        let Some(entry) = self.current() else {
            return;
        };
        if !entry.is_dir {
            return;
        }
        let path = entry.path();
        self.open_tree.open(&path);
        self.remembered = Some(path);
        self.relist();
    }

    /// Collapse the directory under the cursor, or the expanded directory
    /// containing it. The cursor lands on the collapsed directory.
    pub fn close_tree(&mut self) {
        let Some(entry) = self.current() else {
            return;
        };
        let path = entry.path();
        let target = if self.open_tree.contains(&path) {
            path
        } else if entry.depth > 0 {
            entry.parent.clone()
        } else {
            return;
        };
        self.open_tree.close(&target);
        self.remembered = Some(target);
        self.relist();
    }

    /// Toggle multi-select on the cursor entry and move down.
    pub fn toggle_select(&mut self) {
        let Some(entry) = self.files.get_mut(self.cursor) else {
            return;
        };
        entry.is_selected = !entry.is_selected;
        let path = entry.path();
        if entry.is_selected {
            self.selected.insert(path);
        } else {
            self.selected.remove(&path);
        }
        self.move_cursor(Motion::Down);
    }

    pub fn toggle_hidden(&mut self) {
        self.options.show_hidden = !self.options.show_hidden;
        self.relist();
        let state = if self.options.show_hidden { "shown" } else { "hidden" };
        self.set_status(format!("Hidden files {}", state));
    }

    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
    }

    // ── Search ──────────────────────────────────────────────────────────

    /// Feed one typed character to the search and jump to the best match.
    pub fn search_input(&mut self, c: char, now: Instant) -> Option<Effect> {
        let generation = self.search.push(c, now);
        self.jump_to_search_hit();
        (self.search.mode == SearchMode::Timeout).then(|| Effect::ScheduleSearchClear {
            generation,
            after: self.search.timeout(),
        })
    }

    /// Delete the last query character; an empty query ends the search.
    pub fn search_backspace(&mut self) {
        if self.search.pop() && !self.search.query().is_empty() {
            self.jump_to_search_hit();
        } else {
            self.search.stop();
        }
    }

    /// Drop a timed-out query.
    pub fn expire_search(&mut self, generation: u64) {
        self.search.expire(generation);
    }

    fn jump_to_search_hit(&mut self) {
        let index = self
            .search
            .update(self.files.iter().map(|e| e.name.as_str()))
            .map(|hit| hit.index);
        if let Some(index) = index {
            self.cursor = index;
            self.sync_offset();
        }
    }

    // ── Deletion ────────────────────────────────────────────────────────

    /// Hide the cursor entry now and delete it once the grace period ends.
    pub fn delete_current(&mut self, now: Instant) {
        let Some(entry) = self.current() else {
            return;
        };
        let path = entry.path();
        let depth = entry.depth;
        // Follow the next entry outside the deleted subtree, else the previous one.
        self.remembered = self.files[self.cursor + 1..]
            .iter()
            .find(|e| e.depth <= depth)
            .or_else(|| self.cursor.checked_sub(1).and_then(|i| self.files.get(i)))
            .map(FileEntry::path);
        self.deletions.schedule(path.clone(), now);
        self.relist();
        self.set_status(format!("Deleted {} (undo to restore)", display_name(&path)));
    }

    /// Bring back the most recently deleted entry.
    pub fn undo_delete(&mut self) {
        match self.deletions.undo() {
            Some(path) => {
                self.remembered = Some(path.clone());
                self.relist();
                self.set_status(format!("Restored {}", display_name(&path)));
            }
            None => self.set_status("Nothing to undo"),
        }
    }

    /// Run due deletions and expire the status message.
    pub fn tick(&mut self, now: Instant) {
        let due = if self.deletions.is_empty() {
            Vec::new()
        } else {
            self.deletions.take_due(now)
        };
        if !due.is_empty() {
            let failures = self.deletions.remove_all(&due);
            if let Some((path, err)) = failures.first() {
                self.set_error(format!("Could not delete {}: {}", display_name(path), err));
            }
            self.relist();
        }
        if self
            .status
            .as_ref()
            .is_some_and(|s| now.saturating_duration_since(s.created) >= STATUS_TTL)
        {
            self.status = None;
        }
    }

    /// Perform every pending deletion now. Used on graceful exit.
    pub fn flush_deletions(&mut self) -> Vec<(PathBuf, AppError)> {
        let all = self.deletions.take_all();
        self.deletions.remove_all(&all)
    }

    /// Forget every pending deletion. Used on force quit.
    pub fn abandon_deletions(&mut self) -> Vec<PathBuf> {
        let all = self.deletions.take_all();
        for path in &all {
            log::info!("abandoned deletion of {}", path.display());
        }
        all
    }

    // ── Custom commands ─────────────────────────────────────────────────

    pub fn open_command_menu(&mut self) {
        if self.config.commands.is_empty() {
            self.set_status("No custom commands configured");
        } else {
            self.overlay = Overlay::CommandMenu { selected: 0 };
        }
    }

    /// Start custom command `index`, asking for input first when it needs it.
    pub fn run_command(&mut self, index: usize) -> Option<Effect> {
        let command = self.config.commands.get(index)?;
        let ctx = CommandContext {
            dir: self.path.clone(),
            current: self.current_path(),
            selected: self.selected_paths(),
        };
        match plan_custom_command(command, &ctx) {
            Ok(CustomCommandPlan::Run(run)) => {
                self.overlay = Overlay::None;
                Some(Effect::Run(run))
            }
            Ok(CustomCommandPlan::AskInput { prompt }) => {
                self.overlay = Overlay::Prompt(Prompt {
                    command: index,
                    title: prompt,
                    ..Prompt::default()
                });
                None
            }
            Ok(CustomCommandPlan::Skip) => {
                self.overlay = Overlay::None;
                self.set_status("Nothing to run the command on");
                None
            }
            Err(e) => {
                self.overlay = Overlay::None;
                self.set_error(e.to_string());
                None
            }
        }
    }

    /// Run the prompted command with what was typed.
    pub fn submit_prompt(&mut self) -> Option<Effect> {
        let Overlay::Prompt(prompt) = std::mem::take(&mut self.overlay) else {
            return None;
        };
        let command = self.config.commands.get(prompt.command)?;
        match command_with_input(command, &prompt.input, &self.path) {
            Ok(run) => Some(Effect::Run(run)),
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }

    /// A foreground program returned; report it and pick up its changes.
    pub fn external_finished(&mut self, outcome: ExternalOutcome) {
        log::debug!("{} returned", outcome.program);
        match outcome.error {
            Some(err) => self.set_error(err),
            None => {
                if let Some(msg) = outcome.completed_message {
                    self.set_status(msg);
                }
            }
        }
        self.relist();
    }

    /// The watched directory changed on disk.
    pub fn handle_fs_change(&mut self, dir: &Path) {
        if dir == self.path {
            self.relist();
        }
    }

    // ── Status ──────────────────────────────────────────────────────────

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
            created: Instant::now(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
            created: Instant::now(),
        });
    }

    /// Mode, size and mtime of the cursor entry.
    pub fn file_info(&self) -> Option<FileInfo> {
        let path = self.current_path()?;
        FileInfo::load(&path).ok()
    }

    pub fn quit(&mut self) {
        self.exit = Some(ExitKind::Graceful);
    }

    pub fn force_quit(&mut self) {
        self.exit = Some(ExitKind::Force);
    }

    // ── Preview ─────────────────────────────────────────────────────────

    /// Preview of the cursor entry for a pane of the given size, cached
    /// until the cursor, the listing or the size changes.
    pub fn preview_lines(&mut self, width: u16, height: u16) -> &[Line<'static>] {
        let Some(path) = self.current_path() else {
            return &[];
        };
        let fresh = self
            .preview
            .as_ref()
            .is_some_and(|c| c.path == path && c.width == width && c.height == height);
        if !fresh {
            let theme_name = self.config.syntax_theme_name().to_string();
            let highlighter = self
                .highlighter
                .get_or_insert_with(|| Highlighter::new(&theme_name));
            let req = PreviewRequest {
                path: &path,
                width,
                height,
                show_hidden: self.options.show_hidden,
                max_bytes: self.config.preview_max_bytes(),
            };
            let lines = load_preview(&req, highlighter);
            self.preview = Some(PreviewCache {
                path,
                width,
                height,
                lines,
            });
        }
        self.preview.as_ref().map(|c| c.lines.as_slice()).unwrap_or(&[])
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
