//! Shared helpers for integration tests

#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// The 16x8 sheet described by `swing.animation`.
///
/// Two identical red 4x4 bodies at (0,0) and (4,0), a green 2x2 hilt at
/// (8,0), and on row 4 the strip red-green-blue at x=0 with its mirror
/// image at x=4.
pub fn swing_sheet() -> RgbaImage {
    RgbaImage::from_fn(16, 8, |x, y| match (x, y) {
        (0..=7, 0..=3) => RED,
        (8..=9, 0..=1) => GREEN,
        (0, 4) | (6, 4) => RED,
        (1, 4) | (5, 4) => GREEN,
        (2, 4) | (4, 4) => BLUE,
        _ => CLEAR,
    })
}
