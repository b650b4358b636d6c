//! Origin and extent resolution for overlay groups
//!
//! An [`OverlayGroup`] is a primary frame plus secondary frames offset
//! relative to the primary's origin. Resolving a group computes a single
//! output frame large enough to hold every member with all origins aligned.
//! Origins are resolved before extents because extents depend on them.

use crate::models::Frame;

/// A member of an overlay group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub frame: Frame,
    /// Offset of this member's origin from the primary's origin.
    pub offsetx: i32,
    pub offsety: i32,
}

/// A primary frame, its overlays, and the output frame they produce.
///
/// `overlays[0]` is always the primary at offset `(0, 0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayGroup {
    pub overlays: Vec<Overlay>,
    pub out_frame: Frame,
}

impl OverlayGroup {
    /// A group containing only `frame`. The output frame starts unplaced and
    /// unflipped with the primary's size, origin, duration and points.
    pub fn new(frame: Frame) -> Self {
        let out_frame = Frame {
            x: 0,
            y: 0,
            w: frame.w,
            h: frame.h,
            originx: frame.originx,
            originy: frame.originy,
            flipx: false,
            flipy: false,
            duration: frame.duration.clone(),
            points: frame.points.clone(),
        };

        Self { overlays: vec![Overlay { frame, offsetx: 0, offsety: 0 }], out_frame }
    }

    pub fn primary(&self) -> &Frame {
        &self.overlays[0].frame
    }

    /// Add a secondary frame whose origin sits at `(offsetx, offsety)` from
    /// the primary's origin.
    pub fn push(&mut self, frame: Frame, offsetx: i32, offsety: i32) {
        self.overlays.push(Overlay { frame, offsetx, offsety });
    }

    /// Resolve the output frame's origin, points and size in place.
    pub fn resolve(&mut self) {
        let out = &mut self.out_frame;
        let (prev_originx, prev_originy) = (out.originx, out.originy);

        // Origin pass
        for overlay in &self.overlays {
            out.originx = out.originx.max(overlay.frame.originx - overlay.offsetx);
            out.originy = out.originy.max(overlay.frame.originy - overlay.offsety);
        }

        // Content moves right/down by however much the origin grew
        let shift_x = out.originx - prev_originx;
        let shift_y = out.originy - prev_originy;
        for point in &mut out.points {
            point.x = point.x.map(|x| x + shift_x);
            point.y = point.y.map(|y| y + shift_y);
        }

        // Extent pass
        for overlay in &self.overlays {
            let frame = &overlay.frame;
            out.w = out.w.max(out.originx - frame.originx + frame.w + overlay.offsetx);
            out.h = out.h.max(out.originy - frame.originy + frame.h + overlay.offsety);
        }
    }

    /// Top-left of `overlay` inside the output frame.
    pub fn member_position(&self, overlay: &Overlay) -> (i32, i32) {
        (
            self.out_frame.originx - overlay.frame.originx + overlay.offsetx,
            self.out_frame.originy - overlay.frame.originy + overlay.offsety,
        )
    }
}

/// Resolve every group, returning them for packing.
pub fn resolve_groups(mut groups: Vec<OverlayGroup>) -> Vec<OverlayGroup> {
    for group in &mut groups {
        group.resolve();
    }
    groups
}
