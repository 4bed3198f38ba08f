//! Key bindings resolved once at startup from defaults and the `[keys]`
//! config table.

use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::CommandConfig;

/// Everything a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ForceQuit,
    Quit,
    Open,
    Back,
    UpDir,
    OpenDir,
    OpenTree,
    CloseTree,
    Select,
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,
    Leftmost,
    Rightmost,
    PageUp,
    PageDown,
    Home,
    End,
    Search,
    Preview,
    Delete,
    Undo,
    ToggleHidden,
    Help,
    CommandMenu,
}

impl Action {
    pub const ALL: [Action; 28] = [
        Action::ForceQuit,
        Action::Quit,
        Action::Open,
        Action::Back,
        Action::UpDir,
        Action::OpenDir,
        Action::OpenTree,
        Action::CloseTree,
        Action::Select,
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Top,
        Action::Bottom,
        Action::Leftmost,
        Action::Rightmost,
        Action::PageUp,
        Action::PageDown,
        Action::Home,
        Action::End,
        Action::Search,
        Action::Preview,
        Action::Delete,
        Action::Undo,
        Action::ToggleHidden,
        Action::Help,
        Action::CommandMenu,
    ];

    /// Name used in the `[keys]` config table.
    pub fn name(self) -> &'static str {
        match self {
            Action::ForceQuit => "force_quit",
            Action::Quit => "quit",
            Action::Open => "open",
            Action::Back => "back",
            Action::UpDir => "up_dir",
            Action::OpenDir => "open_dir",
            Action::OpenTree => "open_tree",
            Action::CloseTree => "close_tree",
            Action::Select => "select",
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::Top => "top",
            Action::Bottom => "bottom",
            Action::Leftmost => "leftmost",
            Action::Rightmost => "rightmost",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Home => "home",
            Action::End => "end",
            Action::Search => "search",
            Action::Preview => "preview",
            Action::Delete => "delete",
            Action::Undo => "undo",
            Action::ToggleHidden => "toggle_hidden",
            Action::Help => "help",
            Action::CommandMenu => "command_menu",
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.name() == name)
    }

    fn default_keys(self) -> &'static [&'static str] {
        match self {
            Action::ForceQuit => &["ctrl+c"],
            Action::Quit => &["esc", "q"],
            Action::Open => &["enter"],
            Action::Back => &["backspace"],
            Action::UpDir => &["ctrl+left"],
            Action::OpenDir => &["ctrl+right"],
            Action::OpenTree => &["t"],
            Action::CloseTree => &["T"],
            Action::Select => &["insert"],
            Action::Up => &["up", "k"],
            Action::Down => &["down", "j"],
            Action::Left => &["left", "h"],
            Action::Right => &["right", "l"],
            Action::Top => &["shift+up", "K"],
            Action::Bottom => &["shift+down", "J"],
            Action::Leftmost => &["shift+left", "H"],
            Action::Rightmost => &["shift+right", "L"],
            Action::PageUp => &["pgup"],
            Action::PageDown => &["pgdown"],
            Action::Home => &["home", "g"],
            Action::End => &["end", "G"],
            Action::Search => &["/"],
            Action::Preview => &["space"],
            Action::Delete => &["d", "delete"],
            Action::Undo => &["u"],
            Action::ToggleHidden => &["."],
            Action::Help => &["?"],
            Action::CommandMenu => &["f2"],
        }
    }
}

/// A single key chord such as `ctrl+left` or `G`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    /// Parse `[ctrl+|alt+|shift+]*<key>`.
    pub fn parse(s: &str) -> Option<KeySpec> {
        let mut modifiers = KeyModifiers::NONE;
        let mut rest = s;
        loop {
            let lower = rest.to_ascii_lowercase();
            if lower.starts_with("ctrl+") && rest.len() > 5 {
                modifiers |= KeyModifiers::CONTROL;
                rest = &rest[5..];
            } else if lower.starts_with("alt+") && rest.len() > 4 {
                modifiers |= KeyModifiers::ALT;
                rest = &rest[4..];
            } else if lower.starts_with("shift+") && rest.len() > 6 {
                modifiers |= KeyModifiers::SHIFT;
                rest = &rest[6..];
            } else {
                break;
            }
        }

        let code = match rest.to_ascii_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" => KeyCode::Enter,
            "esc" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "delete" => KeyCode::Delete,
            "insert" => KeyCode::Insert,
            "tab" => KeyCode::Tab,
            "space" => KeyCode::Char(' '),
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pgup" => KeyCode::PageUp,
            "pgdown" => KeyCode::PageDown,
            f if f.len() > 1 && f.starts_with('f') => {
                let n: u8 = f[1..].parse().ok()?;
                if !(1..=12).contains(&n) {
                    return None;
                }
                KeyCode::F(n)
            }
            _ => {
                let mut chars = rest.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };
        Some(KeySpec { code, modifiers }.normalized())
    }

    pub fn from_event(key: &KeyEvent) -> KeySpec {
        KeySpec {
            code: key.code,
            modifiers: key.modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT),
        }
        .normalized()
    }

    /// Shift is implied by the character itself for printable keys.
    fn normalized(mut self) -> Self {
        if let KeyCode::Char(_) = self.code {
            self.modifiers.remove(KeyModifiers::SHIFT);
        }
        self
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            write!(f, "ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            write!(f, "alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            write!(f, "shift+")?;
        }
        match self.code {
            KeyCode::Up => write!(f, "↑"),
            KeyCode::Down => write!(f, "↓"),
            KeyCode::Left => write!(f, "←"),
            KeyCode::Right => write!(f, "→"),
            KeyCode::Enter => write!(f, "enter"),
            KeyCode::Esc => write!(f, "esc"),
            KeyCode::Backspace => write!(f, "backspace"),
            KeyCode::Delete => write!(f, "delete"),
            KeyCode::Insert => write!(f, "insert"),
            KeyCode::Tab => write!(f, "tab"),
            KeyCode::Home => write!(f, "home"),
            KeyCode::End => write!(f, "end"),
            KeyCode::PageUp => write!(f, "pgup"),
            KeyCode::PageDown => write!(f, "pgdown"),
            KeyCode::F(n) => write!(f, "f{}", n),
            KeyCode::Char(' ') => write!(f, "space"),
            KeyCode::Char(c) => write!(f, "{}", c),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Immutable key -> action table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    actions: HashMap<KeySpec, Action>,
    by_action: HashMap<Action, Vec<KeySpec>>,
    /// Keys of custom commands, as index into the command list.
    commands: HashMap<KeySpec, usize>,
}

impl KeyBindings {
    /// Build from the defaults, replacing the keys of every action named in `overrides`.
    pub fn new(overrides: &HashMap<String, Vec<String>>, commands: &[CommandConfig]) -> Self {
        for name in overrides.keys() {
            if Action::from_name(name).is_none() {
                log::warn!("unknown action in [keys]: {}", name);
            }
        }

        let mut actions = HashMap::new();
        let mut by_action: HashMap<Action, Vec<KeySpec>> = HashMap::new();
        for action in Action::ALL {
            let specs: Vec<KeySpec> = match overrides.get(action.name()) {
                Some(keys) => keys.iter().filter_map(|k| parse_logged(k)).collect(),
                None => action
                    .default_keys()
                    .iter()
                    .filter_map(|k| KeySpec::parse(k))
                    .collect(),
            };
            for spec in &specs {
                actions.insert(*spec, action);
            }
            by_action.insert(action, specs);
        }

        let mut command_keys = HashMap::new();
        for (i, command) in commands.iter().enumerate() {
            if let Some(spec) = command.key.as_deref().and_then(parse_logged) {
                command_keys.insert(spec, i);
            }
        }

        Self {
            actions,
            by_action,
            commands: command_keys,
        }
    }

    pub fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        self.actions.get(&KeySpec::from_event(key)).copied()
    }

    pub fn command_for(&self, key: &KeyEvent) -> Option<usize> {
        self.commands.get(&KeySpec::from_event(key)).copied()
    }

    /// Human readable keys of an action, e.g. `↑/k`.
    pub fn label(&self, action: Action) -> String {
        self.by_action
            .get(&action)
            .map(|specs| {
                specs
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new(&HashMap::new(), &[])
    }
}

fn parse_logged(key: &str) -> Option<KeySpec> {
    let spec = KeySpec::parse(key);
    if spec.is_none() {
        log::warn!("unrecognized key: {}", key);
    }
    spec
}
