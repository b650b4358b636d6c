//! Configuration loading and discovery for `boomsheets.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::BoomsheetsConfig;
use crate::pipeline::PipelineOptions;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the configuration file looked up during discovery.
pub const CONFIG_FILE: &str = "boomsheets.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse boomsheets.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override padding
    pub padding: Option<u32>,
    /// Override packer bound
    pub max_size: Option<(u32, u32)>,
    /// Override deduplication
    pub dedup: Option<bool>,
    /// Enable strict mode
    pub strict: Option<bool>,
}

/// Find boomsheets.toml by walking up from `start`, then in the XDG config directory.
///
/// # Returns
/// - `Some(path)` if a boomsheets.toml file is found
/// - `None` if no config file is found
pub fn find_config(start: &Path) -> Option<PathBuf> {
    find_config_from(search_root(start)).or_else(find_xdg_config)
}

/// Absolute directory to start discovery from. A relative `start` (including
/// the empty parent of a bare file name) is taken from the working directory,
/// so the walk up reaches its ancestors.
fn search_root(start: &Path) -> PathBuf {
    if start.is_absolute() {
        return start.to_path_buf();
    }
    env::current_dir().map(|cwd| cwd.join(start)).unwrap_or_else(|_| start.to_path_buf())
}

/// Find boomsheets.toml in XDG config directory.
///
/// Checks XDG_CONFIG_HOME/boomsheets/boomsheets.toml or ~/.config/boomsheets/boomsheets.toml
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("boomsheets").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find boomsheets.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit `path` must exist. Otherwise discovery starts at `search_from`;
/// when nothing is found the built-in defaults are returned.
///
/// # Example
/// ```ignore
/// let config = load_config(None, Path::new("sprites/hero"))?;
/// let config = load_config(Some(Path::new("boomsheets.toml")), Path::new("."))?;
/// ```
pub fn load_config(path: Option<&Path>, search_from: &Path) -> Result<BoomsheetsConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(search_from),
    };

    match config_path {
        Some(p) => {
            debug!(path = %p.display(), "loading config");
            load_config_file(&p)
        }
        None => Ok(BoomsheetsConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<BoomsheetsConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: BoomsheetsConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut BoomsheetsConfig, overrides: &CliOverrides) {
    if let Some(padding) = overrides.padding {
        config.sheet.padding = padding;
    }

    if let Some((width, height)) = overrides.max_size {
        config.sheet.max_size = [width, height];
    }

    if let Some(dedup) = overrides.dedup {
        config.sheet.dedup = dedup;
    }

    if let Some(strict) = overrides.strict {
        config.sheet.strict = strict;
    }
}

impl BoomsheetsConfig {
    /// Pipeline options described by this configuration.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            padding: self.sheet.padding,
            max_size: self.max_size(),
            dedup: self.sheet.dedup,
            strict: self.sheet.strict,
            migrations: self.migration_table(),
        }
    }
}
