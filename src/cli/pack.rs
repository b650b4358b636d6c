//! Pack command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{parse_max_size, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::{load_config, merge_cli_overrides, CliOverrides};
use crate::output::{animation_path_for, default_atlas_path, save_animation_text, save_png};
use crate::pipeline::run_files;

/// Arguments of `bsheet pack`.
pub struct PackArgs<'a> {
    pub animation: &'a Path,
    pub image: &'a Path,
    pub output: Option<&'a Path>,
    pub animation_out: Option<&'a Path>,
    pub config: Option<&'a Path>,
    pub padding: Option<u32>,
    pub max_size: Option<&'a str>,
    pub no_dedup: bool,
    pub strict: bool,
}

/// Execute the pack command
pub fn run_pack(args: PackArgs<'_>) -> ExitCode {
    let max_size = match args.max_size.map(parse_max_size).transpose() {
        Ok(size) => size,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let search_from = args.animation.parent().unwrap_or(Path::new(""));
    let mut config = match load_config(args.config, search_from) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let overrides = CliOverrides {
        padding: args.padding,
        max_size,
        dedup: args.no_dedup.then_some(false),
        strict: args.strict.then_some(true),
    };
    merge_cli_overrides(&mut config, &overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        for error in errors {
            eprintln!("Error: {}", error);
        }
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let output = match run_files(args.animation, args.image, &config.pipeline_options()) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    for warning in &output.warnings {
        eprintln!("Warning: {}", warning);
    }

    let atlas_path = args.output.map(Path::to_path_buf).unwrap_or_else(|| default_atlas_path(args.image));
    let text_path =
        args.animation_out.map(Path::to_path_buf).unwrap_or_else(|| animation_path_for(&atlas_path));

    if let Err(e) = save_png(&output.image, &atlas_path) {
        eprintln!("Error: Failed to save '{}': {}", atlas_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }
    if let Err(e) = save_animation_text(&output.text, &text_path) {
        eprintln!("Error: Failed to save '{}': {}", text_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    let frames: usize = output.animations.iter().map(|a| a.frames.len()).sum();
    match output.stats {
        Some(stats) => println!(
            "Saved: {} ({}x{}, {} animations, {} frames, {} unique)",
            atlas_path.display(),
            output.image.width(),
            output.image.height(),
            output.animations.len(),
            frames,
            stats.bins
        ),
        None => println!(
            "Saved: {} ({}x{}, {} animations, {} frames)",
            atlas_path.display(),
            output.image.width(),
            output.image.height(),
            output.animations.len(),
            frames
        ),
    }
    println!("Saved: {}", text_path.display());

    ExitCode::from(EXIT_SUCCESS)
}
