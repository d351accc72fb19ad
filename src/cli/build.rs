//! Build command implementation

use std::process::ExitCode;

use super::{config_failure, load_project, EXIT_ERROR, EXIT_SUCCESS};
use crate::build::{BuildContext, BuildPipeline, BuildStatus};
use crate::config::CliOverrides;

/// Run the build command
pub fn run_build(overrides: &CliOverrides, dry_run: bool, fail_fast: bool) -> ExitCode {
    let (config, project_root) = match load_project(overrides) {
        Ok(project) => project,
        Err(e) => return config_failure(&e),
    };

    let mut context = BuildContext::new(config, project_root);
    if let Some(jobs) = overrides.jobs {
        context = context.with_jobs(jobs);
    }

    let src_dir = context.src_dir();
    if !src_dir.is_dir() {
        eprintln!("Error: Source directory not found: {}", src_dir.display());
        eprintln!("Create the directory or specify a different path with --src");
        return ExitCode::from(EXIT_ERROR);
    }

    let pipeline = BuildPipeline::new(context).with_dry_run(dry_run).with_fail_fast(fail_fast);

    if dry_run {
        println!("Dry run - would import:");
        println!("  Source: {}", src_dir.display());
    }

    match pipeline.build() {
        Ok(result) => {
            for target in &result.targets {
                match (&target.status, &target.changes) {
                    (BuildStatus::Skipped, _) => println!("    - {}", target.target_id),
                    (BuildStatus::Failed(_), _) => {}
                    (status, Some(changes)) => {
                        println!("  {} ({}): {}", target.target_id, status, changes)
                    }
                    (status, None) => println!("  {} ({})", target.target_id, status),
                }
            }

            if result.is_success() {
                println!("{}", result.summary());
                ExitCode::from(EXIT_SUCCESS)
            } else {
                eprintln!("{}", result.summary());
                ExitCode::from(EXIT_ERROR)
            }
        }
        Err(e) => {
            eprintln!("Build error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
