//! End-to-end tests of the library pipeline against the swing fixture

mod common;

use boomsheets::config::BoomsheetsConfig;
use boomsheets::migrate::{MigrationTable, MigrationWarning};
use boomsheets::output::save_png;
use boomsheets::parser::parse_animations;
use boomsheets::pipeline::{run_files, run_pipeline, PipelineOptions, PipelineWarning};
use common::{fixture, swing_sheet, BLUE, CLEAR, GREEN, RED};
use tempfile::TempDir;

fn swing_text() -> String {
    std::fs::read_to_string(fixture("swing.animation")).expect("fixture should exist")
}

#[test]
fn test_swing_sheet_composited_and_deduplicated() {
    let output = run_pipeline(&swing_text(), &swing_sheet(), &PipelineOptions::default())
        .expect("pipeline should succeed");

    let states: Vec<&str> = output.animations.iter().map(|a| a.state()).collect();
    assert_eq!(states, vec!["IDLE", "CHARACTER_SWING_HILT"]);

    // HAND is absent, so CHARACTER_SWING_HAND is skipped with a warning
    assert_eq!(output.warnings.len(), 1);
    assert!(matches!(
        &output.warnings[0],
        PipelineWarning::Migration(MigrationWarning::DependencyMissing { family, .. }) if family == "HAND"
    ));

    let stats = output.stats.expect("dedup should have run");
    assert_eq!(stats.frames, 4);
    assert_eq!(stats.bins, 3);
    assert_eq!(stats.mirrored_matches, 1);
    assert_eq!(stats.exact_matches, 0);
}

#[test]
fn test_mirrored_idle_frames_share_pixels() {
    let output = run_pipeline(&swing_text(), &swing_sheet(), &PipelineOptions::default()).unwrap();

    let idle = &output.animations[0].frames;
    assert_eq!((idle[0].x, idle[0].y), (idle[1].x, idle[1].y));
    assert!(!idle[0].flipx);
    assert!(idle[1].flipx);
    assert_eq!(idle[0].originx, 1);
    assert_eq!(idle[1].originx, 2);

    let (x, y) = (idle[0].x as u32, idle[0].y as u32);
    assert_eq!(*output.image.get_pixel(x, y), RED);
    assert_eq!(*output.image.get_pixel(x + 1, y), GREEN);
    assert_eq!(*output.image.get_pixel(x + 2, y), BLUE);
}

#[test]
fn test_hilt_drawn_at_anchor() {
    let output = run_pipeline(&swing_text(), &swing_sheet(), &PipelineOptions::default()).unwrap();

    let swing = &output.animations[1].frames;
    assert!(swing[0].points.is_empty());
    assert_eq!((swing[0].w, swing[0].h), (4, 4));

    let frame = &swing[1];
    assert_eq!((frame.w, frame.h, frame.originx, frame.originy), (5, 4, 2, 4));
    assert_eq!(frame.points.len(), 1);
    assert_eq!(frame.points[0].label, "ENDPOINT");
    assert_eq!(frame.points[0].coords(), Some((3, 0)));

    let (x, y) = (frame.x as u32, frame.y as u32);
    assert_eq!(*output.image.get_pixel(x, y + 3), RED);
    assert_eq!(*output.image.get_pixel(x + 4, y), GREEN);
    assert_eq!(*output.image.get_pixel(x + 3, y + 1), GREEN);
    assert_eq!(*output.image.get_pixel(x + 4, y + 2), CLEAR);
}

#[test]
fn test_output_text_round_trips() {
    let output = run_pipeline(&swing_text(), &swing_sheet(), &PipelineOptions::default()).unwrap();

    let reparsed = parse_animations(&output.text).expect("serialized output should parse");
    assert_eq!(reparsed.animations, output.animations);
    assert!(reparsed.warnings.is_empty());
}

#[test]
fn test_identity_table_keeps_every_state() {
    let options = PipelineOptions {
        migrations: MigrationTable::empty(),
        dedup: false,
        ..Default::default()
    };
    let output = run_pipeline(&swing_text(), &swing_sheet(), &options).unwrap();

    let states: Vec<&str> = output.animations.iter().map(|a| a.state()).collect();
    assert_eq!(states, vec!["IDLE", "CHARACTER_SWING", "HILT"]);
    assert!(output.warnings.is_empty());
    assert!(output.stats.is_none());
}

#[test]
fn test_config_driven_migration() {
    let config: BoomsheetsConfig = toml::from_str(
        r#"
[sheet]
padding = 0

[migrations.CHARACTER_SWING]
kind = "compose"
[[migrations.CHARACTER_SWING.composites]]
family = "HILT"
anchor = "HILT"
output = "SWORD"
"#,
    )
    .unwrap();

    let output = run_pipeline(&swing_text(), &swing_sheet(), &config.pipeline_options()).unwrap();
    let states: Vec<&str> = output.animations.iter().map(|a| a.state()).collect();
    assert_eq!(states, vec!["IDLE", "SWORD"]);
    assert!(output.warnings.is_empty());
    assert!(output.animations[1].frames[1].points.is_empty());
}

#[test]
fn test_run_files() {
    let temp = TempDir::new().expect("should create temp dir");
    let image_path = temp.path().join("swing.png");
    save_png(&swing_sheet(), &image_path).expect("should save sheet");

    let output = run_files(&fixture("swing.animation"), &image_path, &PipelineOptions::default())
        .expect("pipeline should succeed");
    assert_eq!(output.animations.len(), 2);
}

#[test]
fn test_run_files_missing_image() {
    let temp = TempDir::new().expect("should create temp dir");
    let result = run_files(
        &fixture("swing.animation"),
        &temp.path().join("missing.png"),
        &PipelineOptions::default(),
    );
    assert!(result.is_err());
}
