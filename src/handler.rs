use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Overlay};
use crate::commands::Effect;
use crate::components::help::HelpOverlay;
use crate::grid::Motion;
use crate::keymap::Action;
use crate::search::SearchMode;

/// Handle a key event. Returns work the event loop has to carry out.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Effect> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    // An inline listing error stays up until the next key.
    app.list_error = None;

    let action = app.keys.action_for(&key);
    if action == Some(Action::ForceQuit) {
        app.force_quit();
        return None;
    }

    match app.overlay {
        Overlay::None => {}
        Overlay::Help { .. } => {
            handle_help_key(app, key, action);
            return None;
        }
        Overlay::CommandMenu { .. } => return handle_menu_key(app, key, action),
        Overlay::Prompt(_) => return handle_prompt_key(app, key),
    }

    if let Some(handled) = handle_search_key(app, key, action) {
        return handled;
    }

    if let Some(index) = app.keys.command_for(&key) {
        return app.run_command(index);
    }

    let action = action?;
    if let Some(motion) = motion_for(action) {
        app.move_cursor(motion);
        return None;
    }
    match action {
        Action::Quit => app.quit(),
        Action::Open => return app.open_current(),
        Action::Back | Action::UpDir => app.go_up(),
        Action::OpenDir => app.open_dir(),
        Action::OpenTree => app.open_tree(),
        Action::CloseTree => app.close_tree(),
        Action::Select => app.toggle_select(),
        Action::Search => app.search.start(),
        Action::Preview => app.toggle_preview(),
        Action::Delete => app.delete_current(Instant::now()),
        Action::Undo => app.undo_delete(),
        Action::ToggleHidden => app.toggle_hidden(),
        Action::Help => app.overlay = Overlay::Help { scroll: 0 },
        Action::CommandMenu => app.open_command_menu(),
        _ => {}
    }
    None
}

fn motion_for(action: Action) -> Option<Motion> {
    Some(match action {
        Action::Up => Motion::Up,
        Action::Down => Motion::Down,
        Action::Left => Motion::Left,
        Action::Right => Motion::Right,
        Action::Top => Motion::Top,
        Action::Bottom => Motion::Bottom,
        Action::Leftmost => Motion::Leftmost,
        Action::Rightmost => Motion::Rightmost,
        Action::PageUp => Motion::PageUp,
        Action::PageDown => Motion::PageDown,
        Action::Home => Motion::Home,
        Action::End => Motion::End,
        _ => return None,
    })
}

/// Printable character without ctrl/alt.
fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => Some(c),
        _ => None,
    }
}

/// Search input. `None` means the key was not consumed by the search.
///
/// Modal search owns every printable key until Esc or Enter. In timeout mode
/// an unbound printable key starts a query, and while a query is live every
/// printable key extends it.
fn handle_search_key(app: &mut App, key: KeyEvent, action: Option<Action>) -> Option<Option<Effect>> {
    let active = app.search.is_active();
    match key.code {
        KeyCode::Esc if active => {
            app.search.stop();
            return Some(None);
        }
        KeyCode::Backspace if active => {
            app.search_backspace();
            return Some(None);
        }
        KeyCode::Enter if active => {
            app.search.stop();
            return Some(app.open_current());
        }
        _ => {}
    }

    let c = typed_char(&key)?;
    let unbound = action.is_none() && app.keys.command_for(&key).is_none();
    let consume = match app.search.mode {
        SearchMode::Modal => active,
        SearchMode::Timeout => active || unbound,
    };
    consume.then(|| app.search_input(c, Instant::now()))
}

fn handle_help_key(app: &mut App, key: KeyEvent, action: Option<Action>) {
    let Overlay::Help { scroll } = app.overlay else {
        return;
    };
    let max_scroll = HelpOverlay::new(&app.theme, &app.keys, &app.config.commands, 0)
        .total_lines()
        .saturating_sub(1);
    let scroll = match (key.code, action) {
        (KeyCode::Esc, _) | (_, Some(Action::Help)) | (_, Some(Action::Quit)) => {
            app.overlay = Overlay::None;
            return;
        }
        (_, Some(Action::Up)) => scroll.saturating_sub(1),
        (_, Some(Action::Down)) => scroll + 1,
        (_, Some(Action::PageUp)) => scroll.saturating_sub(10),
        (_, Some(Action::PageDown)) => scroll + 10,
        (_, Some(Action::Home)) => 0,
        (_, Some(Action::End)) => max_scroll,
        _ => scroll,
    };
    app.overlay = Overlay::Help {
        scroll: scroll.min(max_scroll),
    };
}

fn handle_menu_key(app: &mut App, key: KeyEvent, action: Option<Action>) -> Option<Effect> {
    let Overlay::CommandMenu { selected } = app.overlay else {
        return None;
    };
    let count = app.config.commands.len();
    if let Some(index) = app.keys.command_for(&key) {
        return app.run_command(index);
    }
    match (key.code, action) {
        (KeyCode::Esc, _) | (_, Some(Action::Quit)) | (_, Some(Action::CommandMenu)) => {
            app.overlay = Overlay::None;
        }
        (KeyCode::Enter, _) => return app.run_command(selected),
        (_, Some(Action::Up)) => {
            app.overlay = Overlay::CommandMenu {
                selected: selected.checked_sub(1).unwrap_or(count.saturating_sub(1)),
            };
        }
        (_, Some(Action::Down)) => {
            app.overlay = Overlay::CommandMenu {
                selected: if selected + 1 >= count { 0 } else { selected + 1 },
            };
        }
        _ => {}
    }
    None
}

fn handle_prompt_key(app: &mut App, key: KeyEvent) -> Option<Effect> {
    match key.code {
        KeyCode::Enter => return app.submit_prompt(),
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            return None;
        }
        _ => {}
    }
    let Overlay::Prompt(prompt) = &mut app.overlay else {
        return None;
    };
    match key.code {
        KeyCode::Backspace => prompt.backspace(),
        KeyCode::Left => prompt.move_left(),
        KeyCode::Right => prompt.move_right(),
        KeyCode::Home => prompt.cursor_position = 0,
        KeyCode::End => prompt.cursor_position = prompt.input.len(),
        _ => {
            if let Some(c) = typed_char(&key) {
                prompt.insert(c);
            }
        }
    }
    None
}
