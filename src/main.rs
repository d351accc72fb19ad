//! anm - Command-line tool for importing .anm sprite animation patterns

use std::process::ExitCode;

use anmkit::cli;

fn main() -> ExitCode {
    cli::run()
}
