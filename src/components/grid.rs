use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::fs::entry::FileEntry;
use crate::fs::git::GitStatus;
use crate::grid::GridLayout;
use crate::theme::ThemeColors;

/// Multi-column file grid. Entries run top to bottom, then left to right.
pub struct GridWidget<'a> {
    files: &'a [FileEntry],
    grid: &'a GridLayout,
    cursor: usize,
    offset: usize,
    separator: &'a str,
    mark: char,
    theme: &'a ThemeColors,
    git: Option<&'a GitStatus>,
    /// Matched character positions in the cursor entry's name.
    matched: &'a [usize],
    block: Option<Block<'a>>,
}

impl<'a> GridWidget<'a> {
    pub fn new(files: &'a [FileEntry], grid: &'a GridLayout, theme: &'a ThemeColors) -> Self {
        Self {
            files,
            grid,
            cursor: 0,
            offset: 0,
            separator: "    ",
            mark: '+',
            theme,
            git: None,
            matched: &[],
            block: None,
        }
    }

    pub fn cursor(mut self, cursor: usize, offset: usize) -> Self {
        self.cursor = cursor;
        self.offset = offset;
        self
    }

    pub fn separator(mut self, separator: &'a str, mark: char) -> Self {
        self.separator = separator;
        self.mark = mark;
        self
    }

    pub fn git(mut self, git: &'a GitStatus) -> Self {
        self.git = (!git.is_empty()).then_some(git);
        self
    }

    pub fn matched(mut self, positions: &'a [usize]) -> Self {
        self.matched = positions;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    fn name_style(&self, entry: &FileEntry) -> Style {
        let theme = self.theme;
        let mut style = if entry.is_dir {
            Style::default().fg(theme.dir_fg).add_modifier(Modifier::BOLD)
        } else if entry.is_symlink {
            Style::default().fg(theme.symlink_fg)
        } else if entry.is_executable {
            Style::default().fg(theme.exec_fg)
        } else {
            Style::default().fg(theme.grid_fg)
        };
        if let Some(mark) = self.git.and_then(|g| g.mark_for(&entry.path())) {
            style = style.fg(theme.git_fg(mark));
        }
        if entry.is_selected {
            style = style.fg(theme.selected_fg);
        }
        style
    }

    /// Spans of one cell padded to `width`.
    fn cell(&self, index: usize, width: usize) -> Vec<Span<'a>> {
        let entry = &self.files[index];
        let is_cursor = index == self.cursor;
        let base = self.name_style(entry);
        let name_style = if is_cursor {
            base.bg(self.theme.cursor_bg).fg(self.theme.cursor_fg)
        } else {
            base
        };

        let prefix = entry.prefix(self.mark);
        let prefix_style = if entry.is_selected {
            Style::default().fg(self.theme.selected_fg)
        } else {
            Style::default().fg(self.theme.dim_fg)
        };
        let mut spans = vec![Span::styled(prefix, prefix_style)];

        if is_cursor && !self.matched.is_empty() {
            let match_style = name_style.fg(self.theme.match_fg).add_modifier(Modifier::UNDERLINED);
            for (i, c) in entry.name.chars().enumerate() {
                let style = if self.matched.contains(&i) { match_style } else { name_style };
                spans.push(Span::styled(c.to_string(), style));
            }
        } else {
            spans.push(Span::styled(entry.name.clone(), name_style));
        }

        let suffix = entry.suffix();
        if !suffix.is_empty() {
            spans.push(Span::styled(suffix, name_style));
        }
        let used: usize = spans.iter().map(|s| s.content.width()).sum();
        if width > used {
            spans.push(Span::raw(" ".repeat(width - used)));
        }
        spans
    }
}

impl<'a> Widget for GridWidget<'a> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.files.is_empty() {
            let line = Line::from(Span::styled("No files", Style::default().fg(self.theme.dim_fg)));
            buf.set_line(inner.x, inner.y, &line, inner.width);
            return;
        }

        let last_row = (self.offset + inner.height as usize).min(self.grid.rows);
        for (y, row) in (self.offset..last_row).enumerate() {
            let mut spans: Vec<Span<'a>> = Vec::new();
            for column in 0..self.grid.columns {
                let Some(index) = self.grid.index_at(column, row) else {
                    break;
                };
                if column > 0 {
                    spans.push(Span::styled(self.separator, Style::default().fg(self.theme.border_fg)));
                }
                let width = self.grid.column_widths.get(column).copied().unwrap_or(0);
                spans.extend(self.cell(index, width));
            }
            buf.set_line(inner.x, inner.y + y as u16, &Line::from(spans), inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LayoutLimits;
    use crate::theme;
    use std::path::PathBuf;

    fn entry(name: &str, is_dir: bool) -> FileEntry {
        FileEntry {
            parent: PathBuf::from("/w"),
            name: name.to_string(),
            depth: 0,
            is_dir,
            is_symlink: false,
            is_executable: false,
            is_selected: false,
            icon: None,
            padding: 0,
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    fn layout(files: &[FileEntry], width: usize, height: usize) -> GridLayout {
        let widths: Vec<usize> = files.iter().map(|e| e.display_width() + e.padding).collect();
        GridLayout::compute(&widths, width, height, &LayoutLimits::default())
    }

    fn sample() -> Vec<FileEntry> {
        let mut files: Vec<FileEntry> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|n| entry(n, false))
            .collect();
        crate::fs::entry::assign_padding(&mut files);
        files
    }

    #[test]
    fn renders_column_major() {
        let files = sample();
        let grid = layout(&files, 80, 9);
        assert_eq!((grid.columns, grid.rows), (2, 4));

        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        GridWidget::new(&files, &grid, &tc).render(area, &mut buf);

        assert!(row_text(&buf, 0).starts_with("  a    " ));
        assert_eq!(row_text(&buf, 0).trim_end(), "  a      e");
        assert_eq!(row_text(&buf, 2).trim_end(), "  c      g");
        assert_eq!(row_text(&buf, 3).trim_end(), "  d");
    }

    #[test]
    fn cursor_cell_is_highlighted() {
        let files = sample();
        let grid = layout(&files, 80, 9);
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        GridWidget::new(&files, &grid, &tc)
            .cursor(5, 0)
            .render(area, &mut buf);

        // Index 5 is column 1, row 1; its name starts after "  a" + separator + "  ".
        let cell = buf.cell((9, 1)).unwrap();
        assert_eq!(cell.symbol(), "f");
        assert_eq!(cell.bg, tc.cursor_bg);
        assert_ne!(buf.cell((9, 0)).unwrap().bg, tc.cursor_bg);
    }

    #[test]
    fn offset_skips_rows() {
        let files = sample();
        let grid = layout(&files, 80, 9);
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        GridWidget::new(&files, &grid, &tc)
            .cursor(3, 2)
            .render(area, &mut buf);
        assert_eq!(row_text(&buf, 0).trim_end(), "  c      g");
        assert_eq!(row_text(&buf, 1).trim_end(), "  d");
    }

    #[test]
    fn suffixes_and_selection_mark() {
        let mut files = vec![entry("src", true), entry("run.sh", false)];
        files[1].is_executable = true;
        files[1].is_selected = true;
        crate::fs::entry::assign_padding(&mut files);
        let grid = layout(&files, 80, 30);
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        GridWidget::new(&files, &grid, &tc)
            .separator(" | ", '*')
            .cursor(1, 0)
            .render(area, &mut buf);
        assert_eq!(row_text(&buf, 0).trim_end(), "  src/");
        assert_eq!(row_text(&buf, 1).trim_end(), "* run.sh*");
        assert_eq!(buf.cell((2, 0)).unwrap().fg, tc.dir_fg);
        assert_eq!(buf.cell((0, 1)).unwrap().fg, tc.selected_fg);
        assert_eq!(buf.cell((2, 1)).unwrap().fg, tc.cursor_fg);
    }

    #[test]
    fn search_matches_are_marked_on_cursor() {
        let files = vec![entry("search.rs", false)];
        let grid = layout(&files, 80, 9);
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        let positions = [0, 3];
        GridWidget::new(&files, &grid, &tc)
            .matched(&positions)
            .render(area, &mut buf);
        assert_eq!(buf.cell((2, 0)).unwrap().fg, tc.match_fg);
        assert_eq!(buf.cell((5, 0)).unwrap().fg, tc.match_fg);
        assert_eq!(buf.cell((3, 0)).unwrap().fg, tc.cursor_fg);
    }

    #[test]
    fn empty_listing_shows_placeholder() {
        let grid = GridLayout::default();
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        GridWidget::new(&[], &grid, &tc).render(area, &mut buf);
        assert_eq!(row_text(&buf, 0).trim_end(), "No files");
    }

    #[test]
    fn zero_area_does_not_panic() {
        let files = sample();
        let grid = layout(&files, 80, 9);
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        GridWidget::new(&files, &grid, &tc).render(area, &mut buf);
    }
}
