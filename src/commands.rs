//! External programs (editor, `open_with` handlers, custom commands).
//!
//! State transitions never spawn processes themselves. They return an
//! [`Effect`] and the event loop hands the terminal over, runs the program,
//! and feeds an [`ExternalOutcome`] back as an event.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::config::{CommandArgs, CommandConfig};
use crate::error::{AppError, Result};

/// Work for the event loop that a state transition cannot do itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run a program in the foreground.
    Run(ExternalCommand),
    /// Clear the type-to-jump query after `after` unless more input arrives.
    ScheduleSearchClear { generation: u64, after: Duration },
}

/// A fully resolved program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Shown in the status bar when the program succeeds.
    pub completed_message: Option<String>,
}

/// Result of running an [`ExternalCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalOutcome {
    pub program: String,
    pub completed_message: Option<String>,
    pub error: Option<String>,
}

impl ExternalCommand {
    /// Split a command line with shell quoting rules and append `extra` arguments.
    pub fn from_line(line: &str, extra: &[PathBuf], cwd: &Path) -> Result<Self> {
        let (program, mut args) = parse_command_line(line)?;
        args.extend(extra.iter().map(|p| p.to_string_lossy().to_string()));
        Ok(Self {
            program,
            args,
            cwd: cwd.to_path_buf(),
            completed_message: None,
        })
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.completed_message = message;
        self
    }

    /// Run to completion with the terminal attached.
    ///
    /// stdout goes to stderr so that the path printed on exit stays the only
    /// thing on our stdout.
    pub fn run(&self) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::from(std::io::stderr()))
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| AppError::Command(format!("{}: {}", self.program, e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(AppError::Command(format!("{} exited with {}", self.program, status)))
        }
    }

    /// Run and package the result for the event loop.
    pub fn execute(&self) -> ExternalOutcome {
        let error = match self.run() {
            Ok(()) => None,
            Err(e) => {
                log::warn!("{}", e);
                Some(e.to_string())
            }
        };
        ExternalOutcome {
            program: self.program.clone(),
            completed_message: self.completed_message.clone(),
            error,
        }
    }
}

/// Split `line` into a program and its arguments, honouring quotes and escapes.
pub fn parse_command_line(line: &str) -> Result<(String, Vec<String>)> {
    let parts = shell_words::split(line).map_err(|e| AppError::Command(format!("{}: {}", line, e)))?;
    let Some((program, args)) = parts.split_first() else {
        return Err(AppError::Command("empty command".into()));
    };
    Ok((program.clone(), args.to_vec()))
}

/// What the browser knows when a custom command is triggered.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Directory being browsed.
    pub dir: PathBuf,
    /// Entry under the cursor.
    pub current: Option<PathBuf>,
    /// Multi-selected entries in listing order.
    pub selected: Vec<PathBuf>,
}

/// How a custom command should proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomCommandPlan {
    Run(ExternalCommand),
    /// Ask the user for text first, then run with it as the argument.
    AskInput { prompt: String },
    /// Nothing to run it on.
    Skip,
}

pub fn plan_custom_command(command: &CommandConfig, ctx: &CommandContext) -> Result<CustomCommandPlan> {
    let targets: Vec<PathBuf> = match command.args {
        CommandArgs::CurrentDir => {
            let dir = ctx
                .current
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_else(|| ctx.dir.clone());
            vec![dir]
        }
        CommandArgs::CurrentFile => ctx.current.iter().cloned().collect(),
        CommandArgs::SelectedFiles => ctx.selected.clone(),
        CommandArgs::SelectedOrCurrentFile => {
            if ctx.selected.is_empty() {
                ctx.current.iter().cloned().collect()
            } else {
                ctx.selected.clone()
            }
        }
        CommandArgs::Input => {
            let prompt = command
                .prompt
                .clone()
                .unwrap_or_else(|| format!("{}:", command.description));
            return Ok(CustomCommandPlan::AskInput { prompt });
        }
    };
    if targets.is_empty() {
        return Ok(CustomCommandPlan::Skip);
    }
    let run = ExternalCommand::from_line(&command.cmd, &targets, &ctx.dir)?
        .with_message(command.completed_message.clone());
    Ok(CustomCommandPlan::Run(run))
}

/// Finish an `input` command once the user has typed the text.
pub fn command_with_input(command: &CommandConfig, input: &str, dir: &Path) -> Result<ExternalCommand> {
    let mut run = ExternalCommand::from_line(&command.cmd, &[], dir)?
        .with_message(command.completed_message.clone());
    run.args.push(input.to_string());
    Ok(run)
}
