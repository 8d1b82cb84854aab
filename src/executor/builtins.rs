use std::collections::HashMap;
use std::env;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::lexer::{Lexer, Token};

use super::executor::{ExecError, ExecOutcome};

/// Result of offering a statement to the builtin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinStatus {
    /// The statement is not a builtin; run it as a pipeline.
    NotBuiltin,
    /// The builtin ran (successfully or not).
    Handled,
    /// The interpreter must stop now.
    Exit,
}

pub trait BuiltinCommand {
    fn name(&self) -> &'static str;

    /// Whether this builtin applies to `argc` arguments (not counting the name).
    fn accepts(&self, _argc: usize) -> bool {
        true
    }

    fn run(&self, args: &[Token], out: &mut dyn Write) -> Result<ExecOutcome, ExecError>;
}

pub struct BuiltinManager {
    commands: HashMap<&'static str, Box<dyn BuiltinCommand>>,
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
        };
        mgr.register(Box::new(ExitCommand));
        mgr.register(Box::new(PwdCommand));
        mgr.register(Box::new(CdCommand));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name(), cmd);
    }

    /// Finds the builtin for an argument vector by name and argument count.
    pub fn resolve(&self, argv: &[Token]) -> Option<&dyn BuiltinCommand> {
        let (name, args) = argv.split_first()?;
        self.commands
            .get(name.as_str())
            .map(|cmd| cmd.as_ref())
            .filter(|cmd| cmd.accepts(args.len()))
    }

    /// Runs `statement` in-process if its first word names a builtin.
    ///
    /// An `Err` still means the statement was handled: the caller reports
    /// it and moves on without spawning anything.
    pub fn try_builtin(
        &self,
        statement: &str,
        out: &mut dyn Write,
    ) -> Result<BuiltinStatus, ExecError> {
        let argv = Lexer::tokenize(statement);
        let Some(cmd) = self.resolve(&argv) else {
            return Ok(BuiltinStatus::NotBuiltin);
        };
        debug!(builtin = cmd.name(), "running builtin");
        match cmd.run(&argv[1..], out)? {
            ExecOutcome::Exit => Ok(BuiltinStatus::Exit),
            ExecOutcome::Continue => Ok(BuiltinStatus::Handled),
        }
    }
}

impl Default for BuiltinManager {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ExitCommand;

impl BuiltinCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }
    fn run(&self, _args: &[Token], _out: &mut dyn Write) -> Result<ExecOutcome, ExecError> {
        Ok(ExecOutcome::Exit)
    }
}

pub struct PwdCommand;

impl BuiltinCommand for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }
    fn run(&self, _args: &[Token], out: &mut dyn Write) -> Result<ExecOutcome, ExecError> {
        let cwd = env::current_dir().map_err(|e| ExecError::Builtin {
            name: "pwd",
            reason: e.to_string(),
        })?;
        writeln!(out, "{}", cwd.display())?;
        out.flush()?;
        Ok(ExecOutcome::Continue)
    }
}

/// `cd DIR`; exactly one argument, `~` meaning `$HOME`.
pub struct CdCommand;

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }
    fn accepts(&self, argc: usize) -> bool {
        argc == 1
    }
    fn run(&self, args: &[Token], _out: &mut dyn Write) -> Result<ExecOutcome, ExecError> {
        let [dir] = args else {
            return Err(ExecError::Builtin {
                name: "cd",
                reason: "expected exactly one argument".to_string(),
            });
        };
        let home = env::var_os("HOME");
        let target = cd_target(dir.as_str(), home.as_deref())?;
        env::set_current_dir(&target).map_err(|e| ExecError::Builtin {
            name: "cd",
            reason: format!("{}: {}", target.display(), e),
        })?;
        debug!(cwd = %target.display(), "changed directory");
        Ok(ExecOutcome::Continue)
    }
}

fn cd_target(arg: &str, home: Option<&OsStr>) -> Result<PathBuf, ExecError> {
    if arg != "~" {
        return Ok(PathBuf::from(arg));
    }
    match home {
        Some(home) if !home.is_empty() => Ok(Path::new(home).to_path_buf()),
        _ => Err(ExecError::Builtin {
            name: "cd",
            reason: "HOME is not set".to_string(),
        }),
    }
}
