mod builtins;
mod default_executor;
mod executor;
mod path_resolver;
mod pipeline;


pub use builtins::{BuiltinCommand, BuiltinManager, BuiltinStatus};
pub use default_executor::DefaultExecutor;
pub use executor::{ExecError, ExecOutcome, Executor, PipelineRunner, RunResult, StageStatus};
pub use path_resolver::PathResolver;
pub use pipeline::{
    ForkRunner, EXIT_EXEC_FAILED, EXIT_NOT_FOUND, EXIT_REDIRECT_FAILED, EXIT_SETUP_FAILED,
};
