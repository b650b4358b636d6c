//! Rendering placed regions into a destination atlas
//!
//! The compositor and deduplicator compute every [`Placement`]; this module
//! only copies pixels. Regions are read through a [`PixelSource`], optionally
//! mirrored about either axis, and drawn "source over" the destination so
//! overlays stack the way a canvas would draw them.

use image::{Rgba, RgbaImage};
use tracing::trace;

use crate::pixels::{region_index, PixelSource, BYTES_PER_PIXEL};

/// Transparent color for the atlas background
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Copy of one source rectangle to one destination position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub src_x: i32,
    pub src_y: i32,
    pub width: u32,
    pub height: u32,
    pub dest_x: i32,
    pub dest_y: i32,
    /// Mirror the region about its vertical axis.
    pub flip_x: bool,
    /// Mirror the region about its horizontal axis.
    pub flip_y: bool,
}

/// Create a transparent `width`×`height` atlas and draw every placement in order.
pub fn render_placements<S: PixelSource>(
    source: &S,
    width: u32,
    height: u32,
    placements: &[Placement],
) -> RgbaImage {
    let mut atlas = RgbaImage::from_pixel(width, height, TRANSPARENT);
    for placement in placements {
        draw_placement(&mut atlas, source, placement);
    }
    atlas
}

/// Draw one placement onto `dest`. Pixels landing outside `dest` are dropped.
pub fn draw_placement<S: PixelSource>(dest: &mut RgbaImage, source: &S, placement: &Placement) {
    let Placement { width, height, .. } = *placement;
    if width == 0 || height == 0 {
        return;
    }

    trace!(?placement, "draw");
    let region = source.get_region(placement.src_x, placement.src_y, width, height);
    let (dest_w, dest_h) = dest.dimensions();

    for y in 0..height {
        let dy = i64::from(placement.dest_y) + i64::from(y);
        if dy < 0 || dy >= i64::from(dest_h) {
            continue;
        }
        let sy = if placement.flip_y { height - 1 - y } else { y };

        for x in 0..width {
            let dx = i64::from(placement.dest_x) + i64::from(x);
            if dx < 0 || dx >= i64::from(dest_w) {
                continue;
            }
            let sx = if placement.flip_x { width - 1 - x } else { x };

            let i = region_index(width, sx, sy);
            let mut src = [0u8; BYTES_PER_PIXEL];
            src.copy_from_slice(&region[i..i + BYTES_PER_PIXEL]);

            let dst = dest.get_pixel(dx as u32, dy as u32);
            let blended = blend_over(&Rgba(src), dst);
            dest.put_pixel(dx as u32, dy as u32, blended);
        }
    }
}

/// Porter-Duff "source over" on straight (non-premultiplied) RGBA.
///
/// Opaque sources and transparent destinations pass the source through
/// unchanged, so copies into an empty atlas are byte-exact.
pub fn blend_over(src: &Rgba<u8>, dst: &Rgba<u8>) -> Rgba<u8> {
    if src[3] == 255 || dst[3] == 0 {
        return *src;
    }
    if src[3] == 0 {
        return *dst;
    }

    let src_alpha = src[3] as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;

    // out_alpha = src_alpha + dst_alpha * (1 - src_alpha)
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    let composite = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let result = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        composite(src[0], dst[0]),
        composite(src[1], dst[1]),
        composite(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
