use std::io;

use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use thiserror::Error;

use crate::ast::Pipeline;
use crate::error::FailureKind;

/// What the interpreter should do after a line or statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    Continue,
    Exit,
}

/// How one reaped pipeline stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Exited { pid: Pid, code: i32 },
    Signaled { pid: Pid, signal: i32 },
}

impl StageStatus {
    pub(crate) fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(pid, code) => Some(StageStatus::Exited { pid, code }),
            WaitStatus::Signaled(pid, signal, _) => Some(StageStatus::Signaled {
                pid,
                signal: signal as i32,
            }),
            _ => None,
        }
    }

    pub fn pid(&self) -> Pid {
        match self {
            StageStatus::Exited { pid, .. } | StageStatus::Signaled { pid, .. } => *pid,
        }
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            StageStatus::Exited { code, .. } => Some(*code),
            StageStatus::Signaled { .. } => None,
        }
    }
}

pub type RunResult = Result<Vec<StageStatus>, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("pipe creation failed: {0}")]
    Pipe(#[source] nix::Error),

    #[error("fork failed for stage {stage}: {source}")]
    Fork {
        stage: usize,
        #[source]
        source: nix::Error,
    },

    #[error("wait failed for {pid}: {source}")]
    Wait {
        pid: Pid,
        #[source]
        source: nix::Error,
    },

    #[error("{name}: {reason}")]
    Builtin { name: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ExecError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExecError::Pipe(_) => FailureKind::DescriptorSetup,
            ExecError::Fork { .. } | ExecError::Wait { .. } => FailureKind::Spawn,
            ExecError::Builtin { .. } | ExecError::Io(_) => FailureKind::Builtin,
        }
    }
}

/// Runs whole input lines.
pub trait Executor {
    fn exec(&mut self, line: &str) -> ExecOutcome;
}

/// Runs one parsed pipeline to completion.
///
/// Implementations must not return before every process they started for
/// `pipeline` has been reaped.
pub trait PipelineRunner {
    fn run(&mut self, pipeline: &Pipeline) -> RunResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_status_from_wait() {
        let pid = Pid::from_raw(42);
        let exited = StageStatus::from_wait(WaitStatus::Exited(pid, 3)).unwrap();
        assert_eq!(exited.code(), Some(3));
        assert_eq!(exited.pid(), pid);

        let signaled = StageStatus::from_wait(WaitStatus::Signaled(
            pid,
            nix::sys::signal::Signal::SIGPIPE,
            false,
        ))
        .unwrap();
        assert_eq!(signaled.code(), None);

        assert!(StageStatus::from_wait(WaitStatus::StillAlive).is_none());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ExecError::Pipe(nix::Error::EMFILE).kind(), FailureKind::DescriptorSetup);
        assert_eq!(
            ExecError::Fork { stage: 0, source: nix::Error::EAGAIN }.kind(),
            FailureKind::Spawn
        );
        assert_eq!(
            ExecError::Builtin { name: "cd", reason: "no such directory".into() }.kind(),
            FailureKind::Builtin
        );
    }
}
