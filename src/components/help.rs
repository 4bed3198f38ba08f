use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::config::CommandConfig;
use crate::keymap::{Action, KeyBindings};
use crate::theme::ThemeColors;

/// A group of actions shown under one heading.
struct Section {
    name: &'static str,
    entries: &'static [(Action, &'static str)],
}

const MOVEMENT: &[(Action, &str)] = &[
    (Action::Up, "Move up"),
    (Action::Down, "Move down"),
    (Action::Left, "Previous column"),
    (Action::Right, "Next column"),
    (Action::Top, "Top of column"),
    (Action::Bottom, "Bottom of column"),
    (Action::Leftmost, "First column"),
    (Action::Rightmost, "Last column"),
    (Action::PageUp, "Page up"),
    (Action::PageDown, "Page down"),
    (Action::Home, "First entry"),
    (Action::End, "Last entry"),
];

const DIRECTORIES: &[(Action, &str)] = &[
    (Action::Open, "Open file or enter directory"),
    (Action::Back, "Parent directory"),
    (Action::UpDir, "Parent directory"),
    (Action::OpenDir, "Enter directory"),
    (Action::OpenTree, "Expand directory in place"),
    (Action::CloseTree, "Collapse directory"),
    (Action::ToggleHidden, "Toggle hidden files"),
];

const FILES: &[(Action, &str)] = &[
    (Action::Select, "Toggle selection"),
    (Action::Search, "Search"),
    (Action::Preview, "Toggle preview"),
    (Action::Delete, "Delete (delayed)"),
    (Action::Undo, "Undo delete"),
    (Action::CommandMenu, "Command menu"),
];

const GENERAL: &[(Action, &str)] = &[
    (Action::Help, "Toggle this help"),
    (Action::Quit, "Quit and print directory"),
    (Action::ForceQuit, "Quit without deleting"),
];

const SECTIONS: &[Section] = &[
    Section {
        name: "Movement",
        entries: MOVEMENT,
    },
    Section {
        name: "Directories",
        entries: DIRECTORIES,
    },
    Section {
        name: "Files",
        entries: FILES,
    },
    Section {
        name: "General",
        entries: GENERAL,
    },
];

const KEY_WIDTH: usize = 20;

/// Scrollable key reference drawn over the grid.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
    keys: &'a KeyBindings,
    commands: &'a [CommandConfig],
    scroll: usize,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(
        theme: &'a ThemeColors,
        keys: &'a KeyBindings,
        commands: &'a [CommandConfig],
        scroll: usize,
    ) -> Self {
        Self {
            theme,
            keys,
            commands,
            scroll,
        }
    }

    fn heading(&self, name: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("── {} ", name),
                Style::default()
                    .fg(self.theme.info_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("─".repeat(30), Style::default().fg(self.theme.dim_fg)),
        ])
    }

    fn entry(&self, key: String, description: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("  {:<width$}", key, width = KEY_WIDTH),
                Style::default()
                    .fg(self.theme.warning_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(description.to_string(), Style::default().fg(self.theme.grid_fg)),
        ])
    }

    pub fn build_content_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for section in SECTIONS {
            lines.push(self.heading(section.name));
            for (action, description) in section.entries {
                let label = self.keys.label(*action);
                if label.is_empty() {
                    continue;
                }
                lines.push(self.entry(label, description));
            }
            lines.push(Line::from(""));
        }

        if !self.commands.is_empty() {
            lines.push(self.heading("Commands"));
            for cmd in self.commands {
                let key = cmd.key.clone().unwrap_or_else(|| "-".to_string());
                lines.push(self.entry(key, &cmd.description));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            format!(" Press {} to close ", self.keys.label(Action::Help)),
            Style::default().fg(self.theme.dim_fg),
        )));
        lines
    }

    /// Number of content lines, used to bound scrolling.
    pub fn total_lines(&self) -> usize {
        self.build_content_lines().len()
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (area.width as f32 * 0.7).min(72.0) as u16;
        let height = (area.height as f32 * 0.8).min(40.0) as u16;
        let rect = super::dialog::centered_rect(width, height, area);
        if rect.width < 3 || rect.height < 3 {
            return;
        }

        Clear.render(rect, buf);
        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border_fg))
            .style(Style::default().bg(self.theme.dialog_bg));
        let inner = block.inner(rect);
        block.render(rect, buf);

        let lines = self.build_content_lines();
        let visible = inner.height as usize;
        for (i, line) in lines.iter().skip(self.scroll).take(visible).enumerate() {
            buf.set_line(inner.x + 1, inner.y + i as u16, line, inner.width.saturating_sub(2));
        }

        if lines.len() > visible {
            let indicator = Span::styled(
                format!(" {}/{} ", (self.scroll + 1).min(lines.len()), lines.len()),
                Style::default().fg(self.theme.dim_fg),
            );
            let w = indicator.width() as u16;
            let x = rect.x + rect.width.saturating_sub(w + 1);
            buf.set_span(x, rect.y + rect.height - 1, &indicator, w);
        }
    }
}
