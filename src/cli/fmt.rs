//! Fmt command implementation

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::fmt::format_anm;

/// Run the fmt command
pub fn run_fmt(files: &[PathBuf], check: bool, stdout: bool) -> ExitCode {
    let mut needs_formatting = false;
    let mut had_error = false;

    for file in files {
        let bytes = match fs::read(file) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Error: Cannot read '{}': {}", file.display(), e);
                had_error = true;
                continue;
            }
        };

        let formatted = match format_anm(&bytes) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error: {}: {}", file.display(), e);
                had_error = true;
                continue;
            }
        };

        if check {
            if formatted != bytes {
                eprintln!("{}: needs formatting", file.display());
                needs_formatting = true;
            }
        } else if stdout {
            if let Err(e) = std::io::stdout().write_all(&formatted) {
                eprintln!("Error: Cannot write to stdout: {}", e);
                had_error = true;
            }
        } else if formatted != bytes {
            if let Err(e) = fs::write(file, &formatted) {
                eprintln!("Error: Cannot write '{}': {}", file.display(), e);
                had_error = true;
                continue;
            }
            eprintln!("{}: formatted", file.display());
        }
    }

    if had_error || needs_formatting {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
