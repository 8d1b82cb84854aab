use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::lexer::Token;

/// One pipeline stage: argv[0] names the executable, the rest are its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    argv: Vec<Token>,
}

impl Command {
    /// Returns `None` for an empty argument vector.
    pub fn new(argv: Vec<Token>) -> Option<Self> {
        if argv.is_empty() {
            None
        } else {
            Some(Command { argv })
        }
    }

    pub fn name(&self) -> &str {
        self.argv[0].as_str()
    }

    pub fn args(&self) -> &[Token] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[Token] {
        &self.argv
    }

    pub fn len(&self) -> usize {
        self.argv.len()
    }

    /// Strips a trailing `> path` pair and returns the path.
    ///
    /// Only applies when at least one word precedes the `>`, so a bare
    /// `> file` stays an ordinary (and unrunnable) command.
    pub fn take_redirection(&mut self) -> Option<RedirectionTarget> {
        let n = self.argv.len();
        if n > 2 && self.argv[n - 2] == ">" {
            let path = self.argv.pop()?;
            self.argv.pop();
            return Some(RedirectionTarget(PathBuf::from(path.into_string())));
        }
        None
    }
}

/// File that replaces the final stage's standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectionTarget(PathBuf);

impl RedirectionTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RedirectionTarget(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A `|`-connected sequence of commands. Only the last stage may redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Command>,
    redirect: Option<RedirectionTarget>,
}

impl Pipeline {
    /// Builds a pipeline, pulling a trailing `> path` off the last stage.
    /// Returns `None` when there are no stages.
    pub fn new(mut stages: Vec<Command>) -> Option<Self> {
        let redirect = stages.last_mut()?.take_redirection();
        Some(Pipeline { stages, redirect })
    }

    pub fn stages(&self) -> &[Command] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn redirect(&self) -> Option<&RedirectionTarget> {
        self.redirect.as_ref()
    }
}

/// Repeat count attached to a statement by a leading `loop N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopDirective {
    pub repeat_count: NonZeroUsize,
}

impl LoopDirective {
    pub fn once() -> Self {
        LoopDirective { repeat_count: NonZeroUsize::MIN }
    }

    pub fn times(&self) -> usize {
        self.repeat_count.get()
    }
}

impl Default for LoopDirective {
    fn default() -> Self {
        Self::once()
    }
}

/// A `;`-delimited unit of work with its loop directive already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement<'a> {
    pub directive: LoopDirective,
    pub body: &'a str,
}

impl<'a> Statement<'a> {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
