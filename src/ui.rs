use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Overlay};
use crate::components::dialog::{CommandMenuWidget, PromptWidget};
use crate::components::grid::GridWidget;
use crate::components::help::HelpOverlay;
use crate::components::location_bar::LocationBarWidget;
use crate::components::preview::PreviewWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::keymap::Action;

/// Draw one frame. The grid viewport is updated from the frame size first,
/// so a resize relayouts before anything is drawn.
pub fn render(app: &mut App, frame: &mut Frame) {
    let [top, main, bottom] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let (grid_area, preview_area) = if app.show_preview {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(main);
        (left, Some(right))
    } else {
        (main, None)
    };

    let border = Style::default().fg(app.theme.border_fg);
    let grid_block = app
        .config
        .with_border()
        .then(|| Block::default().borders(Borders::ALL).border_style(border));
    let grid_inner = grid_block
        .as_ref()
        .map(|b| b.inner(grid_area))
        .unwrap_or(grid_area);
    app.set_viewport(grid_inner.width as usize, grid_inner.height as usize);

    render_location(app, frame, top);
    render_grid(app, frame, grid_area, grid_block);

    if let Some(area) = preview_area {
        let block = if app.config.with_border() {
            Block::default().borders(Borders::ALL)
        } else {
            Block::default().borders(Borders::LEFT)
        }
        .border_style(border);
        let inner = block.inner(area);
        let lines = app.preview_lines(inner.width, inner.height).to_vec();
        frame.render_widget(PreviewWidget::new(&lines, &app.theme).block(block), area);
    }

    render_status(app, frame, bottom);
    render_overlay(app, frame);
}

fn render_location(app: &App, frame: &mut Frame, area: Rect) {
    let home = dirs::home_dir();
    let mut bar = LocationBarWidget::new(&app.path, &app.theme).home(home.as_deref());
    if app.search.is_active() {
        bar = bar.query(app.search.query());
    }
    frame.render_widget(bar, area);
}

fn render_grid(app: &App, frame: &mut Frame, area: Rect, block: Option<Block<'_>>) {
    if let Some(err) = &app.list_error {
        let text = Paragraph::new(Line::from(Span::styled(
            format!("⚠ {}", err),
            Style::default()
                .fg(app.theme.warning_fg)
                .add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: true })
        .block(block.unwrap_or_default());
        frame.render_widget(text, area);
        return;
    }

    let matched = app
        .search
        .hit()
        .filter(|hit| hit.index == app.cursor)
        .map(|hit| hit.positions.as_slice())
        .unwrap_or(&[]);
    let mut grid = GridWidget::new(&app.files, &app.grid, &app.theme)
        .cursor(app.cursor, app.offset)
        .separator(&app.separator, app.mark)
        .git(&app.git)
        .matched(matched);
    if let Some(block) = block {
        grid = grid.block(block);
    }
    frame.render_widget(grid, area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let info = app.file_info();
    let hint = format!("{}:help", app.keys.label(Action::Help));
    let mut bar = StatusBarWidget::new(info.as_ref(), &app.theme)
        .pending_deletions(app.deletions.len())
        .help_hint(&hint);
    if let Some(status) = &app.status {
        bar = bar.status_message(&status.text, status.is_error);
    }
    frame.render_widget(bar, area);
}

fn render_overlay(app: &App, frame: &mut Frame) {
    let area = frame.area();
    match &app.overlay {
        Overlay::None => {}
        Overlay::Help { scroll } => frame.render_widget(
            HelpOverlay::new(&app.theme, &app.keys, &app.config.commands, *scroll),
            area,
        ),
        Overlay::CommandMenu { selected } => frame.render_widget(
            CommandMenuWidget::new(&app.config.commands, *selected, &app.theme),
            area,
        ),
        Overlay::Prompt(prompt) => frame.render_widget(PromptWidget::new(prompt, &app.theme), area),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs;
    use tempfile::TempDir;

    fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect()
            })
            .collect()
    }

    fn setup() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        for name in ["alpha.txt", "beta.txt", "gamma.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let app = App::new(dir.path().to_path_buf(), AppConfig::default());
        (dir, app)
    }

    #[test]
    fn frame_sets_viewport_from_terminal_size() {
        let (_dir, mut app) = setup();
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();
        assert_eq!((app.width, app.height), (60, 8));

        let rows = screen(&terminal);
        assert!(rows[1].contains("alpha.txt"));
        assert!(rows[9].contains("help"));
    }

    #[test]
    fn preview_halves_the_grid() {
        let (_dir, mut app) = setup();
        app.toggle_preview();
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();
        assert_eq!(app.width, 30);
        assert!(screen(&terminal)[1].contains("alpha.txt"));
    }

    #[test]
    fn list_error_replaces_grid() {
        let (_dir, mut app) = setup();
        app.list_error = Some("cannot list /nowhere: gone".into());
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();
        let rows = screen(&terminal);
        assert!(rows[1].contains("cannot list /nowhere"));
        assert!(!rows.iter().any(|r| r.contains("beta.txt")));
    }

    #[test]
    fn help_overlay_is_drawn() {
        let (_dir, mut app) = setup();
        app.overlay = Overlay::Help { scroll: 0 };
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();
        assert!(screen(&terminal).iter().any(|r| r.contains("Help")));
    }
}
