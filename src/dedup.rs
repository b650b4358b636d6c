//! Content-addressed frame deduplication
//!
//! Frames whose pixels are identical (or identical after a horizontal
//! mirror) share one packed rectangle. Bins are keyed by a SHA-256 digest of
//! the raw RGBA bytes plus the frame size, and every candidate is re-checked
//! byte for byte before it is accepted. Only horizontal mirroring is tried.

use image::RgbaImage;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::models::Animation;
use crate::packer::{PackError, PackItem, Packer};
use crate::pixels::{mirror_horizontal, PixelSource};
use crate::renderer::{render_placements, Placement};

/// Counters describing one deduplication run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DedupStats {
    /// Frames with pixels that were hashed.
    pub frames: usize,
    /// Zero-area frames left unpacked.
    pub empty_frames: usize,
    /// Distinct bins packed.
    pub bins: usize,
    /// Frames merged into an existing bin as-is.
    pub exact_matches: usize,
    /// Frames merged into an existing bin through a horizontal mirror.
    pub mirrored_matches: usize,
    /// Same digest and size but different bytes.
    pub collisions: usize,
}

/// Output of [`dedup_sheet`].
#[derive(Debug, Clone)]
pub struct DedupResult {
    pub image: RgbaImage,
    pub animations: Vec<Animation>,
    pub stats: DedupStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BinKey {
    digest: [u8; 32],
    w: u32,
    h: u32,
}

impl BinKey {
    fn new(pixels: &[u8], w: u32, h: u32) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(pixels));
        Self { digest, w, h }
    }
}

#[derive(Debug, Clone, Copy)]
struct FrameRef {
    animation: usize,
    frame: usize,
}

/// Frames sharing one placement. The first member is the representative
/// whose source rectangle is copied into the atlas.
#[derive(Debug)]
struct DedupBin {
    members: Vec<FrameRef>,
    pixels: Vec<u8>,
    src_x: i32,
    src_y: i32,
    w: u32,
    h: u32,
    padding: u32,
}

impl PackItem for &DedupBin {
    fn width(&self) -> u32 {
        self.w + self.padding * 2
    }

    fn height(&self) -> u32 {
        self.h + self.padding * 2
    }
}

#[derive(Default)]
struct BinIndex {
    bins: Vec<DedupBin>,
    by_key: HashMap<BinKey, Vec<usize>>,
    collisions: usize,
}

impl BinIndex {
    /// Index of a bin holding exactly these pixels at this size.
    fn find(&mut self, key: &BinKey, pixels: &[u8]) -> Option<usize> {
        let candidates = self.by_key.get(key)?;
        for &index in candidates {
            let bin = &self.bins[index];
            if bin.w != key.w || bin.h != key.h {
                continue;
            }
            if bin.pixels != pixels {
                self.collisions += 1;
                continue;
            }
            return Some(index);
        }
        None
    }

    fn insert(&mut self, key: BinKey, bin: DedupBin) {
        self.by_key.entry(key).or_default().push(self.bins.len());
        self.bins.push(bin);
    }
}

/// Merge pixel-identical frames of `animations` (read from `source`) and pack
/// one rectangle per distinct frame into a new atlas.
///
/// Frames matched through a mirror get `flipx` toggled and `originx`
/// reflected to `w - originx`. Zero-area frames are left untouched.
#[instrument(skip_all, fields(animations = animations.len(), padding = padding))]
pub fn dedup_sheet<S: PixelSource, P: Packer>(
    source: &S,
    mut animations: Vec<Animation>,
    packer: &P,
    padding: u32,
) -> Result<DedupResult, PackError> {
    let mut index = BinIndex::default();
    let mut stats = DedupStats::default();

    for (a, animation) in animations.iter_mut().enumerate() {
        for (f, frame) in animation.frames.iter_mut().enumerate() {
            let member = FrameRef { animation: a, frame: f };
            if frame.is_empty() {
                stats.empty_frames += 1;
                continue;
            }
            stats.frames += 1;

            let (w, h) = (frame.width(), frame.height());
            let pixels = source.get_region(frame.x, frame.y, w, h);
            let key = BinKey::new(&pixels, w, h);

            if let Some(bin) = index.find(&key, &pixels) {
                stats.exact_matches += 1;
                index.bins[bin].members.push(member);
                continue;
            }

            let mirrored = mirror_horizontal(&pixels, w, h);
            let mirrored_key = BinKey::new(&mirrored, w, h);

            if let Some(bin) = index.find(&mirrored_key, &mirrored) {
                stats.mirrored_matches += 1;
                frame.flipx = !frame.flipx;
                frame.originx = frame.w - frame.originx;
                index.bins[bin].members.push(member);
                continue;
            }

            index.insert(
                key,
                DedupBin {
                    members: vec![member],
                    pixels,
                    src_x: frame.x,
                    src_y: frame.y,
                    w,
                    h,
                    padding,
                },
            );
        }
    }

    stats.bins = index.bins.len();
    stats.collisions = index.collisions;

    let bins: Vec<&DedupBin> = index.bins.iter().collect();
    let packed = packer.pack(bins)?;
    debug!(width = packed.width, height = packed.height, "packed deduplicated frames");

    let pad = padding as i32;
    let mut placements = Vec::with_capacity(packed.items.len());
    for item in &packed.items {
        let bin = item.item;
        let dest_x = item.x as i32 + pad;
        let dest_y = item.y as i32 + pad;

        placements.push(Placement {
            src_x: bin.src_x,
            src_y: bin.src_y,
            width: bin.w,
            height: bin.h,
            dest_x,
            dest_y,
            ..Default::default()
        });

        for member in &bin.members {
            let frame = &mut animations[member.animation].frames[member.frame];
            frame.x = dest_x;
            frame.y = dest_y;
        }
    }

    let image = render_placements(source, packed.width, packed.height, &placements);

    info!(
        frames = stats.frames,
        bins = stats.bins,
        mirrored = stats.mirrored_matches,
        collisions = stats.collisions,
        "deduplicated frames"
    );

    Ok(DedupResult { image, animations, stats })
}
