//! Compositing stage: migrate, resolve, pack and render a new sheet
//!
//! Produces a sheet where every output frame occupies its own padded
//! rectangle with all overlays (and source flips) baked in.

use image::RgbaImage;
use tracing::{debug, instrument};

use crate::geometry::{resolve_groups, OverlayGroup};
use crate::migrate::{migrate, MigrationTable, MigrationWarning};
use crate::models::Animation;
use crate::packer::{PackError, PackItem, Packer};
use crate::pixels::PixelSource;
use crate::renderer::{render_placements, Placement};

/// Output of [`update_sheet`].
#[derive(Debug, Clone)]
pub struct UpdatedSheet {
    pub image: RgbaImage,
    pub animations: Vec<Animation>,
    pub warnings: Vec<MigrationWarning>,
}

/// A padded rectangle for one output frame, addressed by state and frame index.
#[derive(Debug, Clone, Copy)]
struct SheetBin {
    state: usize,
    frame: usize,
    width: u32,
    height: u32,
}

impl PackItem for SheetBin {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Composite `animations` read from `source` into a freshly packed sheet.
///
/// Output frames with no area are not packed and stay at `(0, 0)`.
#[instrument(skip_all, fields(animations = animations.len(), padding = padding))]
pub fn update_sheet<S: PixelSource, P: Packer>(
    source: &S,
    animations: Vec<Animation>,
    table: &MigrationTable,
    packer: &P,
    padding: u32,
) -> Result<UpdatedSheet, PackError> {
    let migration = migrate(&animations, table);
    drop(animations);

    let mut states: Vec<(String, Vec<OverlayGroup>)> = migration
        .states
        .into_iter()
        .map(|migrated| (migrated.state, resolve_groups(migrated.groups)))
        .collect();

    let mut bins = Vec::new();
    for (state, (_, groups)) in states.iter().enumerate() {
        for (frame, group) in groups.iter().enumerate() {
            let out = &group.out_frame;
            if out.is_empty() {
                continue;
            }
            bins.push(SheetBin {
                state,
                frame,
                width: out.width() + padding * 2,
                height: out.height() + padding * 2,
            });
        }
    }

    let packed = packer.pack(bins)?;
    debug!(width = packed.width, height = packed.height, bins = packed.items.len(), "packed composited frames");

    let pad = padding as i32;
    let mut placements = Vec::new();
    for item in &packed.items {
        let group = &mut states[item.item.state].1[item.item.frame];
        group.out_frame.x = item.x as i32 + pad;
        group.out_frame.y = item.y as i32 + pad;

        for overlay in &group.overlays {
            let (left, top) = group.member_position(overlay);
            let frame = &overlay.frame;
            placements.push(Placement {
                src_x: frame.x,
                src_y: frame.y,
                width: frame.width(),
                height: frame.height(),
                dest_x: group.out_frame.x + left,
                dest_y: group.out_frame.y + top,
                flip_x: frame.flipx,
                flip_y: frame.flipy,
            });
        }
    }

    let image = render_placements(source, packed.width, packed.height, &placements);

    let animations = states
        .into_iter()
        .map(|(state, groups)| {
            Animation::with_frames(state, groups.into_iter().map(|g| g.out_frame).collect())
        })
        .collect();

    Ok(UpdatedSheet { image, animations, warnings: migration.warnings })
}
