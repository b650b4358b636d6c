//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod pack;
mod validate;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;
use tracing::Level;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Check if a path has the `.animation` extension.
pub fn is_animation_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("animation"))
}

/// Find all animation files in a directory (recursively).
pub fn find_animation_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(paths) = glob(&format!("{}/**/*.animation", dir.display())) {
        files.extend(paths.filter_map(Result::ok));
    }
    files.sort();
    files
}

/// Expand directory arguments into the animation files they contain.
pub(crate) fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(find_animation_files(input));
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Parse a `WxH` size argument.
pub(crate) fn parse_max_size(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid max-size format '{}'. Use WxH (e.g., 512x512)", s));
    }
    let w = parts[0].parse::<u32>().map_err(|_| format!("Invalid width in '{}'", s))?;
    let h = parts[1].parse::<u32>().map_err(|_| format!("Invalid height in '{}'", s))?;
    if w == 0 || h == 0 {
        return Err("Width and height must be greater than 0".to_string());
    }
    Ok((w, h))
}

/// Boomsheets - composite, deduplicate and repack sprite sheets
#[derive(Parser)]
#[command(name = "bsheet")]
#[command(about = "Boomsheets - composite, deduplicate and repack .animation sprite sheets")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Composite overlays, deduplicate frames and write a packed sheet
    Pack {
        /// Animation file describing the frames in IMAGE
        animation: PathBuf,

        /// Source sprite sheet image
        image: PathBuf,

        /// Output PNG. If omitted: {image}_packed.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output animation file. If omitted: next to the PNG with an .animation extension
        #[arg(long)]
        animation_out: Option<PathBuf>,

        /// Configuration file (default: boomsheets.toml discovered from the animation's directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pixels of padding around every packed frame
        #[arg(long)]
        padding: Option<u32>,

        /// Maximum sheet size (e.g., 1024x1024)
        #[arg(long)]
        max_size: Option<String>,

        /// Skip frame deduplication
        #[arg(long)]
        no_dedup: bool,

        /// Treat duplicate animation states as errors
        #[arg(long)]
        strict: bool,
    },

    /// Format animation files in canonical form
    Fmt {
        /// Files or directories to format
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Check formatting without writing (exit 1 if changes needed)
        #[arg(long)]
        check: bool,

        /// Write to stdout instead of in-place
        #[arg(long)]
        stdout: bool,
    },

    /// Parse animation files and report errors and warnings
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Pack {
            animation,
            image,
            output,
            animation_out,
            config,
            padding,
            max_size,
            no_dedup,
            strict,
        } => pack::run_pack(pack::PackArgs {
            animation: &animation,
            image: &image,
            output: output.as_deref(),
            animation_out: animation_out.as_deref(),
            config: config.as_deref(),
            padding,
            max_size: max_size.as_deref(),
            no_dedup,
            strict,
        }),
        Commands::Fmt { files, check, stdout } => validate::run_fmt(&files, check, stdout),
        Commands::Check { files, strict, json } => validate::run_check(&files, strict, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_is_animation_file() {
        assert!(is_animation_file(Path::new("hero.animation")));
        assert!(is_animation_file(Path::new("/abs/path/hero.animation")));
        assert!(!is_animation_file(Path::new("hero.png")));
        assert!(!is_animation_file(Path::new("animation")));
    }

    #[test]
    fn test_find_animation_files() {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path();

        fs::write(dir_path.join("a.animation"), "").unwrap();
        fs::write(dir_path.join("a.png"), "ignored").unwrap();
        let sub_dir = dir_path.join("sub");
        fs::create_dir(&sub_dir).unwrap();
        fs::write(sub_dir.join("b.animation"), "").unwrap();

        let files = find_animation_files(dir_path);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_animation_file(f)));

        let expanded = expand_inputs(&[dir_path.to_path_buf(), PathBuf::from("x.animation")]);
        assert_eq!(expanded.len(), 3);
        assert_eq!(expanded[2], PathBuf::from("x.animation"));
    }

    #[test]
    fn test_parse_max_size() {
        assert_eq!(parse_max_size("512x256"), Ok((512, 256)));
        assert!(parse_max_size("512").is_err());
        assert!(parse_max_size("0x10").is_err());
        assert!(parse_max_size("ax10").is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["bsheet", "check", "a.animation", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Check { strict: false, .. }));
    }
}
