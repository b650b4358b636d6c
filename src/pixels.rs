//! Read access to source pixels
//!
//! The pipeline never decodes images itself; it reads rectangular regions
//! from anything implementing [`PixelSource`]. Regions are row-major RGBA,
//! four bytes per pixel, and pixels outside the source read as transparent.

use image::RgbaImage;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A read-only 2-D RGBA pixel buffer.
pub trait PixelSource {
    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Copy the `w`×`h` region whose top-left is `(x, y)`.
    ///
    /// The returned buffer always holds `w * h * 4` bytes.
    fn get_region(&self, x: i32, y: i32, w: u32, h: u32) -> Vec<u8>;
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbaImage::dimensions(self)
    }

    fn get_region(&self, x: i32, y: i32, w: u32, h: u32) -> Vec<u8> {
        let mut data = vec![0u8; w as usize * h as usize * BYTES_PER_PIXEL];
        let (width, height) = RgbaImage::dimensions(self);

        for row in 0..h {
            let sy = i64::from(y) + i64::from(row);
            if sy < 0 || sy >= i64::from(height) {
                continue;
            }
            for col in 0..w {
                let sx = i64::from(x) + i64::from(col);
                if sx < 0 || sx >= i64::from(width) {
                    continue;
                }
                let pixel = self.get_pixel(sx as u32, sy as u32);
                let i = region_index(w, col, row);
                data[i..i + BYTES_PER_PIXEL].copy_from_slice(&pixel.0);
            }
        }

        data
    }
}

/// Byte offset of pixel `(x, y)` in a row-major region `w` pixels wide.
pub fn region_index(w: u32, x: u32, y: u32) -> usize {
    (y as usize * w as usize + x as usize) * BYTES_PER_PIXEL
}

/// Mirror a region horizontally: column `x` swaps with column `w - 1 - x`.
pub fn mirror_horizontal(data: &[u8], w: u32, h: u32) -> Vec<u8> {
    let mut mirrored = vec![0u8; data.len()];

    for y in 0..h {
        for x in 0..w {
            let i = region_index(w, x, y);
            let flipped = region_index(w, w - x - 1, y);
            mirrored[i..i + BYTES_PER_PIXEL].copy_from_slice(&data[flipped..flipped + BYTES_PER_PIXEL]);
        }
    }

    mirrored
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, (x + y) as u8, 255]))
    }

    #[test]
    fn test_get_region_inside() {
        let image = gradient(4, 4);
        let region = image.get_region(1, 2, 2, 1);
        assert_eq!(region, vec![1, 2, 3, 255, 2, 2, 4, 255]);
    }

    #[test]
    fn test_get_region_out_of_bounds_is_transparent() {
        let image = gradient(2, 2);
        let region = image.get_region(-1, 1, 3, 2);
        assert_eq!(region.len(), 3 * 2 * 4);
        // (-1, 1) is outside
        assert_eq!(&region[0..4], &[0, 0, 0, 0]);
        // (0, 1) is inside
        assert_eq!(&region[4..8], &[0, 1, 1, 255]);
        // row 2 is entirely outside
        assert!(region[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_empty_region() {
        let image = gradient(2, 2);
        assert!(image.get_region(0, 0, 0, 5).is_empty());
    }

    #[test]
    fn test_mirror_horizontal() {
        let image = gradient(3, 2);
        let region = image.get_region(0, 0, 3, 2);
        let mirrored = mirror_horizontal(&region, 3, 2);

        assert_eq!(&mirrored[0..4], &region[8..12]);
        assert_eq!(&mirrored[4..8], &region[4..8]);
        assert_eq!(&mirrored[12..16], &region[20..24]);
        assert_eq!(mirror_horizontal(&mirrored, 3, 2), region);
    }
}
