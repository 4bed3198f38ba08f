use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::Prompt;
use crate::config::CommandConfig;
use crate::theme::ThemeColors;

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

fn dialog_block<'a>(title: &str, theme: &ThemeColors) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dialog_border_fg))
        .style(Style::default().bg(theme.dialog_bg))
        .padding(Padding::horizontal(1))
}

fn render_hint(hint: &str, theme: &ThemeColors, inner: Rect, buf: &mut Buffer) {
    if inner.height > 1 {
        let line = Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(theme.dim_fg).add_modifier(Modifier::DIM),
        ));
        buf.set_line(inner.x, inner.y + inner.height - 1, &line, inner.width);
    }
}

/// Single-line text input for commands that take an argument.
pub struct PromptWidget<'a> {
    prompt: &'a Prompt,
    theme: &'a ThemeColors,
}

impl<'a> PromptWidget<'a> {
    pub fn new(prompt: &'a Prompt, theme: &'a ThemeColors) -> Self {
        Self { prompt, theme }
    }
}

impl<'a> Widget for PromptWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rect = centered_rect(50.min(area.width.saturating_sub(4)), 5, area);
        Clear.render(rect, buf);
        let block = dialog_block(&self.prompt.title, self.theme);
        let inner = block.inner(rect);
        block.render(rect, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let input = &self.prompt.input;
        let pos = self.prompt.cursor_position.min(input.len());
        let before = &input[..pos];
        let (cursor, after) = match input[pos..].chars().next() {
            Some(c) => input[pos..].split_at(c.len_utf8()),
            None => (" ", ""),
        };

        // Keep the cursor visible by dropping leading characters.
        let room = (inner.width as usize).saturating_sub(cursor.width().max(1));
        let mut before_shown = before;
        while before_shown.width() > room {
            let mut chars = before_shown.chars();
            chars.next();
            before_shown = chars.as_str();
        }

        let text = Style::default().fg(self.theme.grid_fg);
        let line = Line::from(vec![
            Span::styled(before_shown, text),
            Span::styled(
                cursor,
                Style::default()
                    .bg(self.theme.cursor_bg)
                    .fg(self.theme.cursor_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(after, text),
        ]);
        buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);
        render_hint("[Enter] Run  [Esc] Cancel", self.theme, inner, buf);
    }
}

/// List of configured commands with the highlighted one under the cursor.
pub struct CommandMenuWidget<'a> {
    commands: &'a [CommandConfig],
    selected: usize,
    theme: &'a ThemeColors,
}

impl<'a> CommandMenuWidget<'a> {
    pub fn new(commands: &'a [CommandConfig], selected: usize, theme: &'a ThemeColors) -> Self {
        Self {
            commands,
            selected,
            theme,
        }
    }
}

impl<'a> Widget for CommandMenuWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key_width = self
            .commands
            .iter()
            .filter_map(|c| c.key.as_deref())
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0);
        let row_width = self
            .commands
            .iter()
            .map(|c| c.description.width() + key_width + 3)
            .max()
            .unwrap_or(0) as u16;
        let width = (row_width + 4).max(30).min(area.width.saturating_sub(4));
        let height = (self.commands.len() as u16 + 3).min(area.height.saturating_sub(2));
        let rect = centered_rect(width, height, area);

        Clear.render(rect, buf);
        let block = dialog_block("Commands", self.theme);
        let inner = block.inner(rect);
        block.render(rect, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let rows = inner.height.saturating_sub(1) as usize;
        let first = self.selected.saturating_sub(rows.saturating_sub(1));
        for (i, cmd) in self.commands.iter().enumerate().skip(first).take(rows) {
            let y = inner.y + (i - first) as u16;
            let style = if i == self.selected {
                Style::default()
                    .bg(self.theme.cursor_bg)
                    .fg(self.theme.cursor_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.grid_fg)
            };
            buf.set_style(Rect::new(inner.x, y, inner.width, 1), style);
            let key = cmd.key.as_deref().unwrap_or("");
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<width$}  ", key, width = key_width),
                    style.fg(self.theme.warning_fg),
                ),
                Span::styled(cmd.description.clone(), style),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
        }

        render_hint("[Enter] Run  [Esc] Close", self.theme, inner, buf);
    }
}
