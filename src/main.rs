use std::process;

use smash::config::ConfigLoader;
use smash::error::{self, FailureKind, ShellError};
use smash::executor::DefaultExecutor;
use smash::prompt::ShellPrompt;
use smash::repl;
use tracing::info;

fn main() {
    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            error::report_error(&ShellError::from(e));
            ConfigLoader::default_config()
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();
    info!(limits = %config.limits, "starting smash");

    if std::env::args_os().len() > 1 {
        error::report(FailureKind::Usage);
    }

    let mut executor = DefaultExecutor::new(config.limits);
    let mut prompt = ShellPrompt::stdio(config.prompt);

    if let Err(e) = repl::run(&mut executor, &mut prompt) {
        error::report_error(&e);
    }
    process::exit(0);
}
