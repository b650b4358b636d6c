//! Configuration schema types for `boomsheets.toml`
//!
//! Defines the structure and validation rules for sheet processing configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::migrate::{MigrationRule, MigrationTable};

/// Largest padding accepted from configuration.
pub const MAX_PADDING: u32 = 64;

/// Sheet layout and pipeline switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Pixels reserved around every packed rectangle
    #[serde(default = "default_padding")]
    pub padding: u32,
    /// Packer bound as [width, height]
    #[serde(default = "default_max_size")]
    pub max_size: [u32; 2],
    /// Run the deduplicator after compositing
    #[serde(default = "default_true")]
    pub dedup: bool,
    /// Duplicate animation states become errors
    #[serde(default)]
    pub strict: bool,
}

fn default_padding() -> u32 {
    1
}

fn default_max_size() -> [u32; 2] {
    [4096, 4096]
}

fn default_true() -> bool {
    true
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            max_size: default_max_size(),
            dedup: true,
            strict: false,
        }
    }
}

/// Root configuration structure for `boomsheets.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoomsheetsConfig {
    #[serde(default)]
    pub sheet: SheetConfig,
    /// Migration rules keyed by animation state, layered over the built-in table
    #[serde(default)]
    pub migrations: HashMap<String, MigrationRule>,
}

/// A single configuration validation problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "migrations.CHARACTER_SWING.composites[0].family")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boomsheets.toml: '{}' {}", self.field, self.message)
    }
}

impl BoomsheetsConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.sheet.padding > MAX_PADDING {
            errors.push(ConfigValidationError {
                field: "sheet.padding".to_string(),
                message: format!("must be at most {}", MAX_PADDING),
            });
        }

        if self.sheet.max_size[0] == 0 || self.sheet.max_size[1] == 0 {
            errors.push(ConfigValidationError {
                field: "sheet.max_size".to_string(),
                message: "dimensions must be positive".to_string(),
            });
        }

        // Sorted so error output is stable
        let mut states: Vec<&String> = self.migrations.keys().collect();
        states.sort();

        for state in states {
            let MigrationRule::Compose { composites } = &self.migrations[state] else {
                continue;
            };
            if composites.is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("migrations.{}.composites", state),
                    message: "must contain at least one composite".to_string(),
                });
            }
            for (i, composite) in composites.iter().enumerate() {
                let fields = [
                    ("family", &composite.family),
                    ("anchor", &composite.anchor),
                    ("output", &composite.output),
                ];
                for (name, value) in fields {
                    if value.trim().is_empty() {
                        errors.push(ConfigValidationError {
                            field: format!("migrations.{}.composites[{}].{}", state, i, name),
                            message: "must be a non-empty string".to_string(),
                        });
                    }
                }
            }
        }

        errors
    }

    /// The built-in migration table with this file's entries layered on top.
    pub fn migration_table(&self) -> MigrationTable {
        let mut table = MigrationTable::default();
        for (state, rule) in &self.migrations {
            table.insert(state, rule.clone());
        }
        table
    }

    /// Packer bound as a `(width, height)` pair.
    pub fn max_size(&self) -> (u32, u32) {
        (self.sheet.max_size[0], self.sheet.max_size[1])
    }
}
