mod cli;
mod errors;
mod orchestrator;
mod report;

use clap::Parser;
use log::error;

use cli::Cli;
use errors::AppError;

/// Parses arguments, runs the pipeline, emits every requested report, and
/// returns the process exit code: `0` full success, `2` bad configuration,
/// `3` partial success (some files errored but a result was still produced),
/// `1` anything else that stopped the run early.
pub fn run_app() -> i32 {
    let cli = Cli::parse();

    if let Err(msg) = cli.validate() {
        error!("{msg}");
        return AppError::Configuration(msg).exit_code();
    }

    match run_inner(&cli) {
        Ok(had_errors) => {
            if had_errors {
                3
            } else {
                0
            }
        }
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    }
}

fn run_inner(cli: &Cli) -> Result<bool, AppError> {
    let outcome = orchestrator::run(cli)?;
    let had_errors = !outcome.errored_files.is_empty();
    report::emit(cli, &outcome)?;
    Ok(had_errors)
}
