use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::ThemeColors;

/// Top bar with the current directory and, while searching, the query.
pub struct LocationBarWidget<'a> {
    path: &'a Path,
    home: Option<&'a Path>,
    query: Option<&'a str>,
    theme: &'a ThemeColors,
}

impl<'a> LocationBarWidget<'a> {
    pub fn new(path: &'a Path, theme: &'a ThemeColors) -> Self {
        Self {
            path,
            home: None,
            query: None,
            theme,
        }
    }

    pub fn home(mut self, home: Option<&'a Path>) -> Self {
        self.home = home;
        self
    }

    pub fn query(mut self, query: &'a str) -> Self {
        self.query = Some(query);
        self
    }
}

/// `path` with a leading home directory shown as `~`.
pub fn display_path(path: &Path, home: Option<&Path>) -> String {
    if let Some(rest) = home.and_then(|h| path.strip_prefix(h).ok()) {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Keep the end of `s` so that it fits in `max` cells, marking the cut with `…`.
pub fn truncate_left(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut kept = Vec::new();
    let mut used = 1;
    for c in s.chars().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        kept.push(c);
    }
    std::iter::once('…').chain(kept.into_iter().rev()).collect()
}

impl<'a> Widget for LocationBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let bar_style = Style::default()
            .bg(self.theme.bar_bg)
            .fg(self.theme.bar_fg)
            .add_modifier(Modifier::BOLD);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), Style::default().bg(self.theme.bar_bg));

        let search = self.query.map(|q| format!(" /{} ", q));
        let search_width = search.as_deref().map(UnicodeWidthStr::width).unwrap_or(0);
        let budget = (area.width as usize).saturating_sub(search_width + 1);
        let location = format!(" {}", truncate_left(&display_path(self.path, self.home), budget));

        let mut spans = vec![Span::styled(location, bar_style)];
        if let Some(search) = search {
            spans.push(Span::styled(
                search,
                Style::default().bg(self.theme.search_bg).fg(self.theme.bar_fg),
            ));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
