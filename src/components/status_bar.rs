use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::components::location_bar::truncate_left;
use crate::fs::info::FileInfo;
use crate::theme::ThemeColors;

/// Bottom bar: cursor entry details, or a transient status message.
pub struct StatusBarWidget<'a> {
    file_info: Option<&'a FileInfo>,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
    pending_deletions: usize,
    help_hint: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(file_info: Option<&'a FileInfo>, theme: &'a ThemeColors) -> Self {
        Self {
            file_info,
            theme,
            status_message: None,
            is_error: false,
            pending_deletions: 0,
            help_hint: None,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    pub fn pending_deletions(mut self, count: usize) -> Self {
        self.pending_deletions = count;
        self
    }

    pub fn help_hint(mut self, hint: &'a str) -> Self {
        self.help_hint = Some(hint);
        self
    }
}

/// `drwxr-xr-x 4.0KB Mar 4 05:06 -> target`
pub fn describe(info: &FileInfo) -> String {
    let mut s = format!("{} {} {}", info.mode, info.size, info.modified);
    if let Some(target) = &info.link_target {
        s.push_str(" -> ");
        s.push_str(target);
    }
    s
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;
        let bar = Style::default().bg(self.theme.status_bg).fg(self.theme.status_fg);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), bar);

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                bar.fg(self.theme.error_fg).add_modifier(Modifier::BOLD)
            } else {
                bar.fg(self.theme.success_fg)
            };
            let line = Line::from(Span::styled(format!(" {}", msg), style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let mut right: Vec<Span> = Vec::new();
        if self.pending_deletions > 0 {
            right.push(Span::styled(
                format!(" {} pending delete ", self.pending_deletions),
                bar.fg(self.theme.warning_fg).add_modifier(Modifier::BOLD),
            ));
        }
        if let Some(hint) = self.help_hint {
            right.push(Span::styled(
                format!(" {} ", hint),
                bar.fg(self.theme.dim_fg),
            ));
        }
        let right_width: usize = right.iter().map(|s| s.content.width()).sum();

        let info = self.file_info.map(describe).unwrap_or_default();
        let budget = width.saturating_sub(right_width + 1);
        let info = truncate_left(&info, budget);
        let gap = width.saturating_sub(info.width() + 1 + right_width);

        let mut spans = vec![
            Span::styled(" ", bar),
            Span::styled(info, bar.fg(self.theme.info_fg)),
            Span::styled(" ".repeat(gap), bar),
        ];
        spans.extend(right);
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
