use std::ffi::{c_char, CStr, CString};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::ptr;

use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{self, dup2, fork, ForkResult, Pid};
use tracing::{debug, trace, warn};

use crate::ast::{Command, Pipeline};
use crate::error;

use super::executor::{ExecError, PipelineRunner, RunResult, StageStatus};
use super::path_resolver::PathResolver;

/// Exit status of a child whose descriptors could not be wired up.
pub const EXIT_SETUP_FAILED: i32 = 1;
/// Exit status of a child whose redirection file could not be opened.
pub const EXIT_REDIRECT_FAILED: i32 = 2;
/// Exit status of a child whose program could not be executed.
pub const EXIT_EXEC_FAILED: i32 = 126;
/// Exit status of a child whose program could not be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Everything a child needs after `fork`, built beforehand so the child
/// never allocates.
struct PreparedStage {
    program: Option<CString>,
    argv: Vec<CString>,
    argv_ptrs: Vec<*const c_char>,
}

impl PreparedStage {
    fn new(command: &Command, resolver: &PathResolver) -> Self {
        let argv: Vec<CString> = command
            .argv()
            .iter()
            .filter_map(|tok| CString::new(tok.as_str()).ok())
            .collect();
        let program = if argv.len() == command.len() {
            resolver
                .resolve(command.name())
                .and_then(|path| CString::new(path.as_os_str().as_bytes()).ok())
        } else {
            // an argument held a NUL byte; the stage cannot be executed
            None
        };
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();
        PreparedStage { program, argv, argv_ptrs }
    }
}

/// Runs pipelines by forking one child per stage and wiring their standard
/// streams together with pipes.
pub struct ForkRunner {
    resolver: PathResolver,
}

impl ForkRunner {
    pub fn new(resolver: PathResolver) -> Self {
        ForkRunner { resolver }
    }
}

impl Default for ForkRunner {
    fn default() -> Self {
        Self::new(PathResolver::from_env())
    }
}

impl PipelineRunner for ForkRunner {
    fn run(&mut self, pipeline: &Pipeline) -> RunResult {
        let stages: Vec<PreparedStage> = pipeline
            .stages()
            .iter()
            .map(|cmd| PreparedStage::new(cmd, &self.resolver))
            .collect();
        // an unrepresentable path is left as Some(None) and fails in the last child
        let redirect: Option<Option<CString>> = pipeline
            .redirect()
            .map(|target| CString::new(target.path().as_os_str().as_bytes()).ok());
        let n = stages.len();

        // all pipes exist before the first fork so every child can reach
        // both its upstream and downstream ends
        let mut pipes = Vec::with_capacity(n.saturating_sub(1));
        for _ in 1..n {
            pipes.push(new_pipe().map_err(ExecError::Pipe)?);
        }

        let mut children = Vec::with_capacity(n);
        let mut spawn_error = None;
        for (i, stage) in stages.iter().enumerate() {
            let redirect = if i == n - 1 {
                redirect.as_ref().map(Option::as_deref)
            } else {
                None
            };
            // SAFETY: the child branch only makes async-signal-safe calls on
            // data prepared above.
            match unsafe { fork() } {
                Ok(ForkResult::Child) => run_child(i, &pipes, stage, redirect),
                Ok(ForkResult::Parent { child }) => {
                    trace!(stage = i, pid = %child, program = ?stage.program, "spawned stage");
                    children.push(child);
                }
                Err(source) => {
                    warn!(stage = i, %source, "fork failed");
                    spawn_error = Some(ExecError::Fork { stage: i, source });
                    break;
                }
            }
        }

        // the parent keeps no pipe ends, otherwise readers never see EOF
        drop(pipes);

        let statuses = reap(&children)?;
        debug!(stages = n, reaped = statuses.len(), "pipeline finished");
        match spawn_error {
            Some(err) => Err(err),
            None => Ok(statuses),
        }
    }
}

#[cfg(target_os = "linux")]
fn new_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    unistd::pipe2(OFlag::O_CLOEXEC)
}

#[cfg(not(target_os = "linux"))]
fn new_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    unistd::pipe()
}

/// Waits for exactly the given children, in spawn order.
fn reap(children: &[Pid]) -> Result<Vec<StageStatus>, ExecError> {
    let mut statuses = Vec::with_capacity(children.len());
    let mut first_error = None;
    for &pid in children {
        loop {
            match waitpid(pid, None) {
                Ok(status) => {
                    trace!(%pid, ?status, "reaped stage");
                    match StageStatus::from_wait(status) {
                        Some(s) => {
                            statuses.push(s);
                            break;
                        }
                        // stopped or continued; keep waiting for termination
                        None => continue,
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(source) => {
                    first_error.get_or_insert(ExecError::Wait { pid, source });
                    break;
                }
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(statuses),
    }
}

/// Child side of stage `index`: rewire stdin/stdout, drop every pipe end,
/// apply the redirection, then become the target program.
fn run_child(
    index: usize,
    pipes: &[(OwnedFd, OwnedFd)],
    stage: &PreparedStage,
    redirect: Option<Option<&CStr>>,
) -> ! {
    // Rust ignores SIGPIPE in the shell; programs expect the default
    // SAFETY: resetting a disposition to SIG_DFL installs no handler.
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };

    if index > 0 {
        let (read_end, _) = &pipes[index - 1];
        if dup2(read_end.as_raw_fd(), libc::STDIN_FILENO).is_err() {
            child_fail(EXIT_SETUP_FAILED);
        }
    }
    if index < pipes.len() {
        let (_, write_end) = &pipes[index];
        if dup2(write_end.as_raw_fd(), libc::STDOUT_FILENO).is_err() {
            child_fail(EXIT_SETUP_FAILED);
        }
    }
    for (read_end, write_end) in pipes {
        close_raw(read_end.as_raw_fd());
        close_raw(write_end.as_raw_fd());
    }

    match redirect {
        None => {}
        Some(None) => child_fail(EXIT_REDIRECT_FAILED),
        Some(Some(path)) => {
            let flags = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
            let mode = Mode::from_bits_truncate(0o644);
            match open(path, flags, mode) {
                Ok(fd) => {
                    if dup2(fd, libc::STDOUT_FILENO).is_err() {
                        child_fail(EXIT_SETUP_FAILED);
                    }
                    close_raw(fd);
                }
                Err(_) => child_fail(EXIT_REDIRECT_FAILED),
            }
        }
    }

    let Some(program) = &stage.program else {
        child_fail(EXIT_NOT_FOUND);
    };
    debug_assert_eq!(stage.argv.len() + 1, stage.argv_ptrs.len());
    // SAFETY: program and argv_ptrs point into CStrings owned by `stage`,
    // and argv_ptrs is NULL-terminated.
    unsafe {
        libc::execv(program.as_ptr(), stage.argv_ptrs.as_ptr());
    }
    child_fail(EXIT_EXEC_FAILED)
}

fn close_raw(fd: RawFd) {
    let _ = unistd::close(fd);
}

fn child_fail(code: i32) -> ! {
    error::write_message();
    // SAFETY: _exit ends the child without running destructors or atexit
    // handlers that belong to the parent's state.
    unsafe { libc::_exit(code) }
}
