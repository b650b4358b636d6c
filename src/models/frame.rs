//! Frame and anchor point types.

/// A named anchor inside a frame's local, unflipped coordinate space.
///
/// Coordinates are `None` when the attribute was absent or unparseable. A
/// missing coordinate is invalid, not zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Point {
    pub label: String,
    pub x: Option<i32>,
    pub y: Option<i32>,
}

impl Point {
    /// Create a point with both coordinates present.
    pub fn new(label: impl Into<String>, x: i32, y: i32) -> Self {
        Self { label: label.into(), x: Some(x), y: Some(y) }
    }

    /// Case-insensitive label comparison.
    pub fn has_label(&self, label: &str) -> bool {
        self.label.to_uppercase() == label.to_uppercase()
    }

    /// Both coordinates, if both are valid.
    pub fn coords(&self) -> Option<(i32, i32)> {
        Some((self.x?, self.y?))
    }
}

/// A single animation frame.
///
/// `(x, y, w, h)` is the source rectangle before packing and the placement
/// rectangle afterwards. `duration` is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub originx: i32,
    pub originy: i32,
    pub flipx: bool,
    pub flipy: bool,
    pub duration: String,
    pub points: Vec<Point>,
}

impl Frame {
    /// Width clamped to zero.
    pub fn width(&self) -> u32 {
        u32::try_from(self.w).unwrap_or(0)
    }

    /// Height clamped to zero.
    pub fn height(&self) -> u32 {
        u32::try_from(self.h).unwrap_or(0)
    }

    /// True for frames with no pixels (`blank` frames, or negative sizes).
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// First point with a matching label (case-insensitive).
    pub fn find_point(&self, label: &str) -> Option<&Point> {
        self.points.iter().find(|p| p.has_label(label))
    }
}
