//! Channel ranges of the N (SAR, optical) outputs inside the functor output.
//!
//! Channel ranges are 1-based and inclusive, like GDAL band numbers. Views are
//! taken on band-sequential blocks of shape `(bands, rows, cols)` and never copy.
use std::ops::Range;

use ndarray::{ArrayView3, s};
use serde::Serialize;

use crate::core::functor::FunctorConfig;

/// Inclusive 1-based channel range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelRange {
    pub first: usize,
    pub last: usize,
}

impl ChannelRange {
    pub fn len(&self) -> usize {
        self.last + 1 - self.first
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    /// Half-open 0-based band range
    pub fn bands(&self) -> Range<usize> {
        self.first - 1..self.last
    }
}

impl std::fmt::Display for ChannelRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}

/// Channels of one output slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotChannels {
    /// 0-based slot index
    pub slot: usize,
    pub sar: ChannelRange,
    pub optical: ChannelRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSlicer {
    sar_bands: usize,
    optical_bands: usize,
    outputs: usize,
}

impl OutputSlicer {
    pub fn new(sar_bands: usize, optical_bands: usize, outputs: usize) -> Self {
        Self {
            sar_bands,
            optical_bands,
            outputs,
        }
    }

    pub fn from_config(config: &FunctorConfig) -> Self {
        Self::new(config.sar_bands(), config.optical_bands(), config.outputs())
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn slot(&self, slot: usize) -> SlotChannels {
        let start = slot * (self.sar_bands + self.optical_bands) + 1;
        SlotChannels {
            slot,
            sar: ChannelRange {
                first: start,
                last: start + self.sar_bands - 1,
            },
            optical: ChannelRange {
                first: start + self.sar_bands,
                last: start + self.sar_bands + self.optical_bands - 1,
            },
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = SlotChannels> + '_ {
        (0..self.outputs).map(|i| self.slot(i))
    }

    /// SAR bands of `slot` within a functor output block
    pub fn sar_view<'a>(&self, block: &ArrayView3<'a, f32>, slot: usize) -> ArrayView3<'a, f32> {
        let range = self.slot(slot).sar.bands();
        block.clone().slice_move(s![range, .., ..])
    }

    /// Optical bands of `slot` within a functor output block
    pub fn optical_view<'a>(
        &self,
        block: &ArrayView3<'a, f32>,
        slot: usize,
    ) -> ArrayView3<'a, f32> {
        let range = self.slot(slot).optical.bands();
        block.clone().slice_move(s![range, .., ..])
    }

    /// (SAR, optical) views of every slot, in slot order
    pub fn views<'a>(
        &self,
        block: ArrayView3<'a, f32>,
    ) -> Vec<(ArrayView3<'a, f32>, ArrayView3<'a, f32>)> {
        (0..self.outputs)
            .map(|i| (self.sar_view(&block, i), self.optical_view(&block, i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn channel_ranges_are_one_based_and_contiguous() {
        let slicer = OutputSlicer::new(2, 4, 3);
        let slots: Vec<SlotChannels> = slicer.slots().collect();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].sar, ChannelRange { first: 1, last: 2 });
        assert_eq!(slots[0].optical, ChannelRange { first: 3, last: 6 });
        assert_eq!(slots[1].sar, ChannelRange { first: 7, last: 8 });
        assert_eq!(slots[1].optical, ChannelRange { first: 9, last: 12 });
        assert_eq!(slots[2].optical, ChannelRange { first: 15, last: 18 });
        assert_eq!(slots[2].optical.len(), 4);
        assert_eq!(slots[1].sar.bands(), 6..8);
    }

    #[test]
    fn views_share_the_block_data() {
        let slicer = OutputSlicer::new(1, 2, 2);
        let block = Array3::from_shape_fn((6, 2, 3), |(b, r, c)| (b * 100 + r * 10 + c) as f32);
        let views = slicer.views(block.view());
        assert_eq!(views.len(), 2);

        let (sar1, opt1) = &views[1];
        assert_eq!(sar1.dim(), (1, 2, 3));
        assert_eq!(opt1.dim(), (2, 2, 3));
        assert_eq!(sar1[[0, 1, 2]], 312.0);
        assert_eq!(opt1[[0, 0, 0]], 400.0);
        assert_eq!(opt1[[1, 1, 1]], 511.0);
        assert_eq!(sar1.as_ptr(), block.slice(s![3, .., ..]).as_ptr());
    }
}
