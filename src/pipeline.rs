//! End-to-end sheet processing
//!
//! Ties the stages together: parse the animation text, composite the
//! overlays into a fresh sheet, optionally deduplicate that sheet, and
//! serialize the resulting animations.

use std::path::Path;

use image::RgbaImage;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::dedup::{dedup_sheet, DedupStats};
use crate::fmt::serialize_animations;
use crate::migrate::{MigrationTable, MigrationWarning};
use crate::models::{Animation, Warning};
use crate::packer::{PackError, ShelfPacker};
use crate::parser::{parse_animations, ParseError};
use crate::pixels::PixelSource;
use crate::update::update_sheet;

/// Error type for pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("pack error: {0}")]
    Pack(#[from] PackError),
    /// A duplicate state name in strict mode.
    #[error("{0}")]
    DuplicateState(Warning),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A non-fatal problem found while processing a sheet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineWarning {
    /// Reported by the parser, with its line number.
    #[error("{0}")]
    Parse(Warning),
    #[error("{0}")]
    Migration(MigrationWarning),
}

impl PipelineWarning {
    /// Source line, for warnings that have one.
    pub fn line(&self) -> Option<usize> {
        match self {
            PipelineWarning::Parse(warning) => Some(warning.line),
            PipelineWarning::Migration(_) => None,
        }
    }
}

/// Knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub padding: u32,
    pub max_size: (u32, u32),
    pub dedup: bool,
    /// Treat duplicate state names as errors.
    pub strict: bool,
    pub migrations: MigrationTable,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            padding: 1,
            max_size: (4096, 4096),
            dedup: true,
            strict: false,
            migrations: MigrationTable::default(),
        }
    }
}

/// A processed sheet.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub image: RgbaImage,
    pub animations: Vec<Animation>,
    /// Serialized form of `animations`.
    pub text: String,
    pub warnings: Vec<PipelineWarning>,
    /// Present when deduplication ran.
    pub stats: Option<DedupStats>,
}

/// Run every stage over animation `text` whose frames live in `source`.
#[instrument(skip_all, fields(padding = options.padding, dedup = options.dedup))]
pub fn run_pipeline<S: PixelSource>(
    text: &str,
    source: &S,
    options: &PipelineOptions,
) -> Result<PipelineOutput, PipelineError> {
    let parsed = parse_animations(text)?;
    if options.strict {
        if let Some(duplicate) = parsed.warnings.first().cloned() {
            return Err(PipelineError::DuplicateState(duplicate));
        }
    }

    let mut warnings = Vec::new();
    for warning in &parsed.warnings {
        warn!("{warning}");
        warnings.push(PipelineWarning::Parse(warning.clone()));
    }

    let packer = ShelfPacker::new(options.max_size);
    let updated =
        update_sheet(source, parsed.animations, &options.migrations, &packer, options.padding)?;
    warnings.extend(updated.warnings.into_iter().map(PipelineWarning::Migration));

    let (image, animations, stats) = if options.dedup {
        let deduped = dedup_sheet(&updated.image, updated.animations, &packer, options.padding)?;
        (deduped.image, deduped.animations, Some(deduped.stats))
    } else {
        (updated.image, updated.animations, None)
    };

    let text = serialize_animations(&animations);
    Ok(PipelineOutput { image, animations, text, warnings, stats })
}

/// Read an animation file and its sheet image from disk and run the pipeline.
pub fn run_files(
    animation_path: &Path,
    image_path: &Path,
    options: &PipelineOptions,
) -> Result<PipelineOutput, PipelineError> {
    let text = std::fs::read_to_string(animation_path)?;
    let source = image::open(image_path)?.to_rgba8();
    info!(
        animation = %animation_path.display(),
        image = %image_path.display(),
        width = source.width(),
        height = source.height(),
        "loaded sheet"
    );
    run_pipeline(&text, &source, options)
}
