//! Rectangle packing
//!
//! The pipeline only relies on the [`Packer`] contract: every item gets a
//! non-overlapping top-left position inside the reported bounds. The bundled
//! [`ShelfPacker`] sorts items by height (tallest first) and fills horizontal
//! shelves up to a target width derived from the total item area.

use thiserror::Error;

/// Anything with a size that can be packed.
pub trait PackItem {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// An item echoed back with its assigned position.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedItem<T> {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub item: T,
}

/// Result of packing: total bounds plus every placed item.
#[derive(Debug, Clone, PartialEq)]
pub struct PackResult<T> {
    pub width: u32,
    pub height: u32,
    pub items: Vec<PackedItem<T>>,
}

/// Packing failure. Always fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("{width}x{height} rectangle cannot fit in a {max_width}x{max_height} atlas")]
    TooLarge { width: u32, height: u32, max_width: u32, max_height: u32 },
    #[error("{count} rectangles do not fit in a {max_width}x{max_height} atlas")]
    OutOfSpace { count: usize, max_width: u32, max_height: u32 },
}

/// Assigns positions to sized items.
pub trait Packer {
    fn pack<T: PackItem>(&self, items: Vec<T>) -> Result<PackResult<T>, PackError>;
}

/// Shelf packer bounded by a maximum atlas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShelfPacker {
    pub max_size: (u32, u32),
}

impl Default for ShelfPacker {
    fn default() -> Self {
        Self { max_size: (4096, 4096) }
    }
}

/// A shelf in the shelf packing algorithm
#[derive(Debug)]
struct Shelf {
    y: u32,
    height: u32,
    width_used: u32,
}

impl ShelfPacker {
    pub fn new(max_size: (u32, u32)) -> Self {
        Self { max_size }
    }

    /// Width to fill before opening a new shelf: roughly square, never
    /// narrower than the widest item, never wider than the maximum.
    fn target_width<T: PackItem>(&self, items: &[T]) -> u32 {
        let widest = items.iter().map(PackItem::width).max().unwrap_or(0);
        let area: u64 = items.iter().map(|i| u64::from(i.width()) * u64::from(i.height())).sum();
        let side = (area as f64).sqrt().ceil() as u32;
        side.max(widest).min(self.max_size.0)
    }
}

impl Packer for ShelfPacker {
    fn pack<T: PackItem>(&self, items: Vec<T>) -> Result<PackResult<T>, PackError> {
        let (max_width, max_height) = self.max_size;

        if let Some(item) = items.iter().find(|i| i.width() > max_width || i.height() > max_height) {
            return Err(PackError::TooLarge {
                width: item.width(),
                height: item.height(),
                max_width,
                max_height,
            });
        }

        if items.is_empty() {
            return Ok(PackResult { width: 1, height: 1, items: Vec::new() });
        }

        let target_width = self.target_width(&items);

        // Sort by height descending (better packing); stable, so ties keep input order
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| items[b].height().cmp(&items[a].height()));

        let mut shelves: Vec<Shelf> = Vec::new();
        let mut positions: Vec<(u32, u32)> = vec![(0, 0); items.len()];

        for &index in &order {
            let item = &items[index];
            match try_place_in_shelves(&mut shelves, item.width(), item.height(), target_width, max_height) {
                Some(pos) => positions[index] = pos,
                None => {
                    return Err(PackError::OutOfSpace { count: items.len(), max_width, max_height });
                }
            }
        }

        let width = shelves.iter().map(|s| s.width_used).max().unwrap_or(0).max(1);
        let height = shelves.last().map(|s| s.y + s.height).unwrap_or(0).max(1);

        let items = items
            .into_iter()
            .zip(positions)
            .map(|(item, (x, y))| PackedItem {
                x,
                y,
                width: item.width(),
                height: item.height(),
                item,
            })
            .collect();

        Ok(PackResult { width, height, items })
    }
}

/// Try to place a rectangle in the given shelves
fn try_place_in_shelves(
    shelves: &mut Vec<Shelf>,
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> Option<(u32, u32)> {
    // Try to fit in existing shelf
    for shelf in shelves.iter_mut() {
        if height <= shelf.height && shelf.width_used + width <= max_width {
            let x = shelf.width_used;
            shelf.width_used += width;
            return Some((x, shelf.y));
        }
    }

    // Try to create new shelf
    let new_shelf_y = shelves.last().map(|s| s.y + s.height).unwrap_or(0);
    if new_shelf_y + height <= max_height && width <= max_width {
        shelves.push(Shelf { y: new_shelf_y, height, width_used: width });
        return Some((0, new_shelf_y));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Rect(u32, u32);

    impl PackItem for Rect {
        fn width(&self) -> u32 {
            self.0
        }
        fn height(&self) -> u32 {
            self.1
        }
    }

    fn assert_no_overlap<T>(result: &PackResult<T>) {
        for (i, a) in result.items.iter().enumerate() {
            assert!(a.x + a.width <= result.width, "item exceeds width");
            assert!(a.y + a.height <= result.height, "item exceeds height");
            for b in &result.items[i + 1..] {
                let overlap = a.x < b.x + b.width
                    && a.x + a.width > b.x
                    && a.y < b.y + b.height
                    && a.y + a.height > b.y;
                assert!(!overlap, "Rectangles overlap");
            }
        }
    }

    #[test]
    fn test_empty() {
        let result = ShelfPacker::default().pack(Vec::<Rect>::new()).unwrap();
        assert!(result.items.is_empty());
        assert_eq!((result.width, result.height), (1, 1));
    }

    #[test]
    fn test_single_item() {
        let result = ShelfPacker::default().pack(vec![Rect(18, 10)]).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!((result.items[0].x, result.items[0].y), (0, 0));
        assert_eq!((result.width, result.height), (18, 10));
    }

    #[test]
    fn test_items_echoed_in_input_order() {
        let items = vec![Rect(4, 2), Rect(4, 8), Rect(4, 4)];
        let result = ShelfPacker::default().pack(items.clone()).unwrap();
        let echoed: Vec<Rect> = result.items.iter().map(|p| p.item.clone()).collect();
        assert_eq!(echoed, items);
        assert_no_overlap(&result);
    }

    #[test]
    fn test_many_items_no_overlap() {
        let items: Vec<Rect> = (1..40).map(|i| Rect(i % 7 + 3, i % 5 + 2)).collect();
        let result = ShelfPacker::default().pack(items).unwrap();
        assert_eq!(result.items.len(), 39);
        assert_no_overlap(&result);
        // Roughly square: no single endless strip
        assert!(result.width < 100);
    }

    #[test]
    fn test_too_large() {
        let err = ShelfPacker::new((16, 16)).pack(vec![Rect(17, 2)]).unwrap_err();
        assert_eq!(err, PackError::TooLarge { width: 17, height: 2, max_width: 16, max_height: 16 });
    }

    #[test]
    fn test_out_of_space() {
        let items = vec![Rect(16, 16), Rect(16, 16)];
        let err = ShelfPacker::new((16, 16)).pack(items).unwrap_err();
        assert!(matches!(err, PackError::OutOfSpace { count: 2, .. }));
    }

    #[test]
    fn test_fills_max_size_exactly() {
        let items = vec![Rect(8, 8), Rect(8, 8), Rect(8, 8), Rect(8, 8)];
        let result = ShelfPacker::new((16, 16)).pack(items).unwrap();
        assert_eq!((result.width, result.height), (16, 16));
        assert_no_overlap(&result);
    }
}
