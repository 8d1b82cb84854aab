use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::{self, ShellError};
use crate::executor::{ExecOutcome, Executor};
use crate::prompt::ShellPrompt;

/// Reads lines and hands them to the executor until `exit` or end of input.
///
/// Returns `Ok(())` for `exit`. Read failures that are not fatal are reported
/// and the prompt is shown again; fatal ones (end of input included) are
/// returned for the caller to report before terminating.
pub fn run<E, R, W>(executor: &mut E, prompt: &mut ShellPrompt<R, W>) -> Result<(), ShellError>
where
    E: Executor,
    R: BufRead,
    W: Write,
{
    loop {
        let line = match prompt.show_prompt().and_then(|_| prompt.read_line()) {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("end of input");
                return Err(ShellError::EndOfInput);
            }
            Err(e) => {
                let err = ShellError::from(e);
                if err.kind().is_fatal() {
                    return Err(err);
                }
                error::report_error(&err);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        if executor.exec(&line) == ExecOutcome::Exit {
            return Ok(());
        }
    }
}
