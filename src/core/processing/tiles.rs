//! Strip tiling of the raster extent: full-width windows of at most
//! `strip_height` rows, top to bottom.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileWindow {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl TileWindow {
    pub fn pixels(&self) -> usize {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    strip_height: usize,
}

impl TileGrid {
    /// `strip_height` is clamped to at least one row
    pub fn new(width: usize, height: usize, strip_height: usize) -> Self {
        Self {
            width,
            height,
            strip_height: strip_height.max(1),
        }
    }

    pub fn len(&self) -> usize {
        if self.width == 0 {
            return 0;
        }
        self.height.div_ceil(self.strip_height)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = TileWindow> + '_ {
        (0..self.len()).map(move |i| {
            let y = i * self.strip_height;
            TileWindow {
                x: 0,
                y,
                width: self.width,
                height: self.strip_height.min(self.height - y),
            }
        })
    }
}
