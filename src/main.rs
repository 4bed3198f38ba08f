mod app;
mod commands;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod grid;
mod handler;
mod keymap;
mod preview_content;
mod search;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use env_logger::{Env, Target};
use tokio::sync::mpsc;

use crate::app::{App, ExitKind};
use crate::commands::Effect;
use crate::config::{AppConfig, GeneralConfig, PreviewConfig, SearchConfig, WatcherConfig};
use crate::event::{Event, EventHandler};
use crate::fs::watcher::DirWatcher;
use crate::tui::{install_panic_hook, Tui};

const TICK_RATE: Duration = Duration::from_millis(250);
const FORCE_QUIT_CODE: i32 = 2;

/// A multi-column terminal file browser.
///
/// Prints the directory it was in on exit, so `cd "$(gridwalk)"` follows it.
#[derive(Parser, Debug)]
#[command(name = "gridwalk", version, about)]
struct Cli {
    /// Directory to start in
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Show file type icons (needs a Nerd Font)
    #[arg(long)]
    icons: bool,

    /// List directories only
    #[arg(long)]
    dir_only: bool,

    /// List directories before files
    #[arg(long)]
    dirs_first: bool,

    /// Hide dotfiles
    #[arg(long)]
    hide_hidden: bool,

    /// Open with the preview panel shown
    #[arg(long)]
    preview: bool,

    /// Draw borders around the grid and preview
    #[arg(long)]
    with_border: bool,

    /// Jump while typing instead of searching with `/`
    #[arg(long)]
    fuzzy: bool,

    /// Do not refresh when the directory changes on disk
    #[arg(long)]
    no_watcher: bool,

    /// Path to a config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Flags that were given, as a config layer on top of the files.
    fn overrides(&self) -> AppConfig {
        let flag = |set: bool| set.then_some(true);
        AppConfig {
            general: GeneralConfig {
                show_hidden: self.hide_hidden.then_some(false),
                dir_only: flag(self.dir_only),
                dirs_first: flag(self.dirs_first),
                icons: flag(self.icons),
                with_border: flag(self.with_border),
                editor: None,
            },
            search: SearchConfig {
                mode: self.fuzzy.then(|| "timeout".to_string()),
                timeout_ms: None,
            },
            preview: PreviewConfig {
                enabled: flag(self.preview),
                ..PreviewConfig::default()
            },
            watcher: WatcherConfig {
                enabled: self.no_watcher.then_some(false),
                debounce_ms: None,
            },
            ..AppConfig::default()
        }
    }
}

/// Log to `<cache dir>/gridwalk/gridwalk.log`; the terminal belongs to the UI.
fn init_logging() {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("gridwalk")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("gridwalk.log"))
    {
        Ok(file) => file,
        Err(_) => return,
    };
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(Target::Pipe(Box::new(file)))
        .init();
}

fn start_watcher(
    config: &AppConfig,
    dir: &Path,
    tx: &mpsc::UnboundedSender<Event>,
) -> Option<DirWatcher> {
    if !config.watcher_enabled() {
        return None;
    }
    match DirWatcher::new(dir, Duration::from_millis(config.debounce_ms()), tx.clone()) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            log::warn!("cannot watch {}: {}", dir.display(), e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let path = cli.path.canonicalize().map_err(|e| {
        error::AppError::InvalidPath(format!("{}: {}", cli.path.display(), e))
    })?;
    if !path.is_dir() {
        return Err(error::AppError::InvalidPath(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    log::info!("starting in {}", path.display());

    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut app = App::new(path, config);
    let mut events = EventHandler::new(TICK_RATE);
    let tx = events.sender();
    let mut watcher = start_watcher(&app.config, &app.path, &tx);
    let mut watched = app.path.clone();

    let exit = loop {
        tui.draw(|frame| ui::render(&mut app, frame))?;

        let effect = match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Tick => {
                app.tick(Instant::now());
                None
            }
            Event::Resize => None,
            Event::FsChange(dir) => {
                app.handle_fs_change(&dir);
                None
            }
            Event::SearchExpired(generation) => {
                app.expire_search(generation);
                None
            }
            Event::ExternalDone(outcome) => {
                app.external_finished(outcome);
                None
            }
        };

        match effect {
            Some(Effect::Run(command)) => {
                events.pause();
                if let Some(w) = &watcher {
                    w.pause();
                }
                tui.suspend()?;
                let outcome = command.execute();
                tui.resume()?;
                if let Some(w) = &watcher {
                    w.resume();
                }
                events.resume();
                let _ = tx.send(Event::ExternalDone(outcome));
            }
            Some(Effect::ScheduleSearchClear { generation, after }) => {
                event::schedule_search_clear(tx.clone(), generation, after);
            }
            None => {}
        }

        if watched != app.path {
            drop(watcher.take());
            watcher = start_watcher(&app.config, &app.path, &tx);
            watched = app.path.clone();
        }

        if let Some(kind) = app.exit {
            break kind;
        }
    };

    drop(watcher);
    tui.restore()?;

    match exit {
        ExitKind::Graceful => {
            for (path, err) in app.flush_deletions() {
                eprintln!("gridwalk: could not delete {}: {}", path.display(), err);
            }
            println!("{}", app.path.display());
            Ok(())
        }
        ExitKind::Force => {
            for path in app.abandon_deletions() {
                eprintln!("gridwalk: not deleted: {}", path.display());
            }
            std::process::exit(FORCE_QUIT_CODE);
        }
    }
}
