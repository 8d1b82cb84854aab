use std::io::{self, Write};

use tracing::{debug, trace};

use crate::ast::Pipeline;
use crate::config::Limits;
use crate::error::{self, ShellError};
use crate::parser::{parse_pipeline, parse_statement, split_statements};

use super::builtins::{BuiltinManager, BuiltinStatus};
use super::executor::{ExecOutcome, Executor, PipelineRunner};
use super::pipeline::ForkRunner;

/// Runs input lines statement by statement: loop expansion, builtins, then
/// pipelines through a [`PipelineRunner`].
pub struct DefaultExecutor<R = ForkRunner, W = io::Stdout> {
    runner: R,
    builtins: BuiltinManager,
    limits: Limits,
    out: W,
}

impl DefaultExecutor {
    pub fn new(limits: Limits) -> Self {
        Self::with_runner(ForkRunner::default(), io::stdout(), limits)
    }
}

impl<R: PipelineRunner, W: Write> DefaultExecutor<R, W> {
    pub fn with_runner(runner: R, out: W, limits: Limits) -> Self {
        DefaultExecutor {
            runner,
            builtins: BuiltinManager::new(),
            limits,
            out,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Runs one `;`-separated statement, including all of its loop repeats.
    pub fn exec_statement(&mut self, text: &str) -> ExecOutcome {
        let statement = match parse_statement(text) {
            Ok(s) => s,
            Err(e) => {
                error::report_error(&ShellError::from(e));
                return ExecOutcome::Continue;
            }
        };
        if statement.is_empty() {
            trace!("empty statement");
            return ExecOutcome::Continue;
        }

        let times = statement.directive.times();
        debug!(statement = statement.body, times, "executing statement");

        // parsed on first use and reused for the remaining repeats
        let mut pipeline: Option<Pipeline> = None;
        for _ in 0..times {
            match self.builtins.try_builtin(statement.body, &mut self.out) {
                Ok(BuiltinStatus::Exit) => return ExecOutcome::Exit,
                Ok(BuiltinStatus::Handled) => continue,
                Ok(BuiltinStatus::NotBuiltin) => {}
                Err(e) => {
                    error::report_error(&ShellError::from(e));
                    continue;
                }
            }

            let p = match pipeline.take() {
                Some(p) => p,
                None => match parse_pipeline(statement.body, &self.limits) {
                    Ok(Some(p)) => p,
                    Ok(None) => return ExecOutcome::Continue,
                    Err(e) => {
                        error::report_error(&ShellError::from(e));
                        return ExecOutcome::Continue;
                    }
                },
            };
            if let Err(e) = self.runner.run(&p) {
                error::report_error(&ShellError::from(e));
            }
            pipeline = Some(p);
        }
        ExecOutcome::Continue
    }
}

impl<R: PipelineRunner, W: Write> Executor for DefaultExecutor<R, W> {
    fn exec(&mut self, line: &str) -> ExecOutcome {
        let statements = match split_statements(line, &self.limits) {
            Ok(s) => s,
            Err(e) => {
                error::report_error(&ShellError::from(e));
                return ExecOutcome::Continue;
            }
        };
        for text in statements {
            if self.exec_statement(text) == ExecOutcome::Exit {
                debug!("exit requested");
                return ExecOutcome::Exit;
            }
        }
        ExecOutcome::Continue
    }
}
