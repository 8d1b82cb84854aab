use std::io;

use thiserror::Error;
use tracing::debug;

use crate::config::ConfigError;
use crate::executor::ExecError;
use crate::parser::ParseError;

/// The one diagnostic shown to the user, whatever went wrong.
pub const ERROR_MESSAGE: &[u8] = b"An error has occurred\n";

/// Broad failure classes. They only steer logging and exit policy; the
/// user-facing text is the same for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ResourceExhaustion,
    MalformedLoop,
    DescriptorSetup,
    Spawn,
    Builtin,
    Config,
    LimitExceeded,
    Usage,
    /// A read from the line source was interrupted; the line is retried.
    Input,
    EndOfInput,
}

impl FailureKind {
    /// Whether the interpreter must stop after this failure.
    pub fn is_fatal(self) -> bool {
        matches!(self, FailureKind::ResourceExhaustion | FailureKind::EndOfInput)
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected command-line arguments")]
    Usage,

    #[error("end of input")]
    EndOfInput,
}

impl ShellError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ShellError::Parse(e) => e.kind(),
            ShellError::Exec(e) => e.kind(),
            ShellError::Config(_) => FailureKind::Config,
            ShellError::Io(e) if e.kind() == io::ErrorKind::OutOfMemory => {
                FailureKind::ResourceExhaustion
            }
            ShellError::Io(e) if e.kind() == io::ErrorKind::Interrupted => FailureKind::Input,
            // only the line source surfaces bare IO errors
            ShellError::Io(_) => FailureKind::EndOfInput,
            ShellError::Usage => FailureKind::Usage,
            ShellError::EndOfInput => FailureKind::EndOfInput,
        }
    }
}

/// Writes the fixed diagnostic to standard error in a single write.
pub fn report(kind: FailureKind) {
    debug!(?kind, "reporting failure");
    write_message();
}

/// Logs the detailed error, then emits the fixed diagnostic.
pub fn report_error(err: &ShellError) {
    debug!(error = %err, "command failed");
    report(err.kind());
}

/// Diagnostic writer usable between `fork` and `exec`: no allocation,
/// no locking, no logging.
pub(crate) fn write_message() {
    let _ = nix::unistd::write(io::stderr(), ERROR_MESSAGE);
}
