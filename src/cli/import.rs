//! Import command implementations (import, reimport)

use std::path::Path;
use std::process::ExitCode;

use super::{config_failure, load_project, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::{BuildStatus, ImportError, ImportPipeline, ImportReport};
use crate::config::CliOverrides;

/// Run the import command
pub fn run_import(source: &Path, overrides: &CliOverrides) -> ExitCode {
    let (config, root) = match load_project(overrides) {
        Ok(project) => project,
        Err(e) => return config_failure(&e),
    };

    let strict = config.validate.strict;
    let pipeline = ImportPipeline::new(root, config.import, config.validate);
    finish(pipeline.import(source), strict)
}

/// Run the reimport command
pub fn run_reimport(asset: &Path) -> ExitCode {
    let (config, root) = match load_project(&CliOverrides::default()) {
        Ok(project) => project,
        Err(e) => return config_failure(&e),
    };

    let strict = config.validate.strict;
    let pipeline = ImportPipeline::new(root, config.import, config.validate);
    finish(pipeline.reimport(asset), strict)
}

fn finish(result: Result<ImportReport, ImportError>, strict: bool) -> ExitCode {
    match result {
        Ok(report) => {
            println!(
                "Imported {} -> {}",
                report.source.display(),
                report.destination.display()
            );
            println!("  sprites:   {}", report.reconcile.sprites.summary());
            println!("  timelines: {}", report.reconcile.timelines.summary());
            println!("  selector:  {}", report.reconcile.selectors.summary());

            for failure in &report.failures {
                eprintln!("{}", failure);
            }
            for warning in &report.warnings {
                eprintln!("Warning: {}", warning);
            }

            match BuildStatus::for_report(&report, strict) {
                BuildStatus::Failed(reason) => {
                    eprintln!("Error: {}", reason);
                    ExitCode::from(EXIT_ERROR)
                }
                _ => ExitCode::from(EXIT_SUCCESS),
            }
        }
        Err(
            e @ (ImportError::NotASource(_)
            | ImportError::NotAnAsset(_)
            | ImportError::InvalidSettings { .. }),
        ) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
