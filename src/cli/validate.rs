//! Fmt and check command implementations

use std::path::PathBuf;
use std::process::ExitCode;

use super::{expand_inputs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::fmt::format_animations;
use crate::parser::parse_animations;

/// Execute the fmt command
pub fn run_fmt(files: &[PathBuf], check: bool, stdout_mode: bool) -> ExitCode {
    let files = expand_inputs(files);
    if files.is_empty() {
        eprintln!("Error: No files to format");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut needs_formatting = false;

    for file in &files {
        let content = match std::fs::read_to_string(file) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: Cannot read '{}': {}", file.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

        let formatted = match format_animations(&content) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error: Cannot format '{}': {}", file.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

        if check {
            if content != formatted {
                eprintln!("{}: needs formatting", file.display());
                needs_formatting = true;
            }
        } else if stdout_mode {
            print!("{}", formatted);
        } else if content != formatted {
            if let Err(e) = std::fs::write(file, &formatted) {
                eprintln!("Error: Cannot write '{}': {}", file.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
            eprintln!("{}: formatted", file.display());
        } else {
            eprintln!("{}: already formatted", file.display());
        }
    }

    if check && needs_formatting {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Execute the check command
pub fn run_check(files: &[PathBuf], strict: bool, json: bool) -> ExitCode {
    let files = expand_inputs(files);
    if files.is_empty() {
        eprintln!("Error: No files to check");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut errors = 0usize;
    let mut warnings = 0usize;
    let mut reports = Vec::new();

    for file in &files {
        let parsed = std::fs::read_to_string(file)
            .map_err(|e| e.to_string())
            .and_then(|content| parse_animations(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(result) => {
                let frames: usize = result.animations.iter().map(|a| a.frames.len()).sum();
                warnings += result.warnings.len();
                if json {
                    reports.push(serde_json::json!({
                        "file": file.display().to_string(),
                        "valid": true,
                        "animations": result.animations.len(),
                        "frames": frames,
                        "warnings": result.warnings,
                    }));
                } else {
                    for warning in &result.warnings {
                        eprintln!("{}:{}: warning: {}", file.display(), warning.line, warning.message);
                    }
                    println!(
                        "{}: {} animations, {} frames",
                        file.display(),
                        result.animations.len(),
                        frames
                    );
                }
            }
            Err(message) => {
                errors += 1;
                if json {
                    reports.push(serde_json::json!({
                        "file": file.display().to_string(),
                        "valid": false,
                        "error": message,
                    }));
                } else {
                    eprintln!("{}: error: {}", file.display(), message);
                }
            }
        }
    }

    let failed = errors > 0 || (strict && warnings > 0);

    if json {
        let output = serde_json::json!({
            "valid": !failed,
            "errors": errors,
            "warnings": warnings,
            "files": reports,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else if failed {
        eprintln!("{} error(s), {} warning(s)", errors, warnings);
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
