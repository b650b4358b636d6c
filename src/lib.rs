//! Boomsheets - library for processing `.animation` sprite sheets
//!
//! This library provides functionality to:
//! - Parse and serialize the line-oriented `.animation` format
//! - Composite overlay animations (e.g. hilts onto swings) via migration rules
//! - Resolve the origin and extent of composited frames
//! - Deduplicate identical and horizontally mirrored frames
//! - Pack the result into a new atlas image

pub mod cli;
pub mod config;
pub mod dedup;
pub mod fmt;
pub mod geometry;
pub mod migrate;
pub mod models;
pub mod output;
pub mod packer;
pub mod parser;
pub mod pipeline;
pub mod pixels;
pub mod renderer;
pub mod update;
