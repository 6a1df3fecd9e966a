//! Per-pixel selection of the first N valid (SAR, optical) pairs.
//!
//! The input pixels are the band-wise concatenations of the SAR and optical
//! stacks. The output pixel holds N slots of `sar_bands + optical_bands` values,
//! filled in candidate priority order with pairs where neither side is entirely
//! no-data. Slots that cannot be filled keep the no-data pattern.
//!
//! Slot filling is independent per pixel: slot 0 of two pixels may come from
//! different source pairs.
use ndarray::{ArrayView1, ArrayViewMut1, s};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::IndexPair;

/// Frozen configuration of the selection functor, built once before streaming
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctorConfig {
    pairs: Vec<IndexPair>,
    sar_bands: usize,
    optical_bands: usize,
    sar_nodata: f32,
    optical_nodata: f32,
    outputs: usize,
}

impl FunctorConfig {
    /// `pairs` must be expressed in stack positions (see [`crate::core::dedup`]).
    pub fn new(
        pairs: Vec<IndexPair>,
        sar_bands: usize,
        optical_bands: usize,
        sar_nodata: f32,
        optical_nodata: f32,
        outputs: usize,
    ) -> Result<Self> {
        if outputs == 0 {
            return Err(Error::InvalidArgument {
                arg: "outputs",
                value: outputs.to_string(),
            });
        }
        if sar_bands == 0 {
            return Err(Error::InvalidArgument {
                arg: "sar_bands",
                value: sar_bands.to_string(),
            });
        }
        if optical_bands == 0 {
            return Err(Error::InvalidArgument {
                arg: "optical_bands",
                value: optical_bands.to_string(),
            });
        }
        Ok(Self {
            pairs,
            sar_bands,
            optical_bands,
            sar_nodata,
            optical_nodata,
            outputs,
        })
    }

    pub fn pairs(&self) -> &[IndexPair] {
        &self.pairs
    }

    pub fn sar_bands(&self) -> usize {
        self.sar_bands
    }

    pub fn optical_bands(&self) -> usize {
        self.optical_bands
    }

    pub fn sar_nodata(&self) -> f32 {
        self.sar_nodata
    }

    pub fn optical_nodata(&self) -> f32 {
        self.optical_nodata
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Bands of one output slot
    pub fn slot_width(&self) -> usize {
        self.sar_bands + self.optical_bands
    }

    /// Bands of the output pixel, whatever the pixel content
    pub fn output_size(&self) -> usize {
        self.outputs * self.slot_width()
    }

    /// Minimum band count of the stacked SAR pixel
    pub fn required_sar_size(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| (p.sar + 1) * self.sar_bands)
            .max()
            .unwrap_or(0)
    }

    /// Minimum band count of the stacked optical pixel
    pub fn required_optical_size(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| (p.optical + 1) * self.optical_bands)
            .max()
            .unwrap_or(0)
    }

    /// Write the no-data pattern into every slot of `out`
    pub fn fill_nodata(&self, mut out: ArrayViewMut1<'_, f32>) {
        for slot in 0..self.outputs {
            let start = slot * self.slot_width();
            out.slice_mut(s![start..start + self.sar_bands])
                .fill(self.sar_nodata);
            out.slice_mut(s![start + self.sar_bands..start + self.slot_width()])
                .fill(self.optical_nodata);
        }
    }

    /// Compute one output pixel into `out` and return the number of filled slots.
    ///
    /// `sar` and `optical` are the stacked input pixels; `out` must hold
    /// [`output_size`](Self::output_size) values.
    pub fn select_into(
        &self,
        sar: ArrayView1<'_, f32>,
        optical: ArrayView1<'_, f32>,
        mut out: ArrayViewMut1<'_, f32>,
    ) -> usize {
        self.fill_nodata(out.view_mut());

        let mut filled = 0;
        for pair in &self.pairs {
            if filled == self.outputs {
                break;
            }
            let sar_start = pair.sar * self.sar_bands;
            let opt_start = pair.optical * self.optical_bands;
            let sar_pix = sar.slice(s![sar_start..sar_start + self.sar_bands]);
            let opt_pix = optical.slice(s![opt_start..opt_start + self.optical_bands]);

            if is_nodata(sar_pix, self.sar_nodata) || is_nodata(opt_pix, self.optical_nodata) {
                continue;
            }

            let start = filled * self.slot_width();
            out.slice_mut(s![start..start + self.sar_bands])
                .assign(&sar_pix);
            out.slice_mut(s![start + self.sar_bands..start + self.slot_width()])
                .assign(&opt_pix);
            filled += 1;
        }
        filled
    }

    /// Convenience wrapper over [`select_into`](Self::select_into) for plain slices
    pub fn select(&self, sar: &[f32], optical: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0; self.output_size()];
        self.select_into(
            ArrayView1::from(sar),
            ArrayView1::from(optical),
            ArrayViewMut1::from(out.as_mut_slice()),
        );
        out
    }
}

/// True when every value equals the sentinel exactly
pub fn is_nodata(pixel: ArrayView1<'_, f32>, nodata: f32) -> bool {
    pixel.iter().all(|&v| v == nodata)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(list: &[(usize, usize)]) -> Vec<IndexPair> {
        list.iter().map(|&(s, o)| IndexPair::new(s, o)).collect()
    }

    #[test]
    fn skips_pairs_with_nodata_side() {
        let cfg = FunctorConfig::new(pairs(&[(0, 0), (1, 1)]), 1, 1, 0.0, -9999.0, 1).unwrap();
        let out = cfg.select(&[0.0, 7.0], &[-9999.0, 3.0]);
        assert_eq!(out, vec![7.0, 3.0]);
    }

    #[test]
    fn output_size_is_fixed() {
        let cfg = FunctorConfig::new(pairs(&[(0, 0)]), 2, 4, 0.0, -10000.0, 3).unwrap();
        assert_eq!(cfg.slot_width(), 6);
        assert_eq!(cfg.output_size(), 18);
        assert_eq!(cfg.select(&[1.0, 2.0], &[1.0, 2.0, 3.0, 4.0]).len(), 18);
        assert_eq!(cfg.select(&[0.0, 0.0], &[-10000.0; 4]).len(), 18);
    }

    #[test]
    fn unfilled_slots_keep_sentinel_pattern() {
        let cfg = FunctorConfig::new(pairs(&[(0, 0), (1, 1)]), 2, 1, 0.0, -1.0, 3).unwrap();
        let out = cfg.select(&[5.0, 6.0, 0.0, 0.0], &[9.0, 4.0]);
        assert_eq!(
            out,
            vec![5.0, 6.0, 9.0, 0.0, 0.0, -1.0, 0.0, 0.0, -1.0]
        );
    }

    #[test]
    fn partial_nodata_is_valid_data() {
        let cfg = FunctorConfig::new(pairs(&[(0, 0)]), 2, 2, 0.0, -1.0, 1).unwrap();
        let out = cfg.select(&[0.0, 0.5], &[-1.0, 2.0]);
        assert_eq!(out, vec![0.0, 0.5, -1.0, 2.0]);
    }

    #[test]
    fn nodata_comparison_is_exact() {
        let cfg = FunctorConfig::new(pairs(&[(0, 0)]), 1, 1, 0.0, -10000.0, 1).unwrap();
        let out = cfg.select(&[1e-6], &[-10000.001]);
        assert_eq!(out, vec![1e-6, -10000.001]);
    }

    #[test]
    fn earlier_pairs_take_earlier_slots() {
        // Pair order (1,0), (0,1), (2,2): all valid, so slots follow list order
        let cfg =
            FunctorConfig::new(pairs(&[(1, 0), (0, 1), (2, 2)]), 1, 1, 0.0, 0.0, 2).unwrap();
        let out = cfg.select(&[10.0, 11.0, 12.0], &[20.0, 21.0, 22.0]);
        assert_eq!(out, vec![11.0, 20.0, 10.0, 21.0]);
    }

    #[test]
    fn same_image_can_fill_several_slots() {
        let cfg = FunctorConfig::new(pairs(&[(0, 0), (0, 1)]), 1, 1, 0.0, 0.0, 2).unwrap();
        let out = cfg.select(&[3.0], &[4.0, 5.0]);
        assert_eq!(out, vec![3.0, 4.0, 3.0, 5.0]);
    }

    #[test]
    fn reports_filled_slots() {
        let cfg = FunctorConfig::new(pairs(&[(0, 0), (1, 1), (2, 2)]), 1, 1, 0.0, 0.0, 2).unwrap();
        let mut out = vec![0.0; cfg.output_size()];
        let filled = cfg.select_into(
            ArrayView1::from(&[1.0, 0.0, 0.0][..]),
            ArrayView1::from(&[1.0, 1.0, 1.0][..]),
            ArrayViewMut1::from(out.as_mut_slice()),
        );
        assert_eq!(filled, 1);
    }

    #[test]
    fn required_sizes_follow_highest_index() {
        let cfg = FunctorConfig::new(pairs(&[(0, 2), (3, 1)]), 2, 3, 0.0, 0.0, 1).unwrap();
        assert_eq!(cfg.required_sar_size(), 8);
        assert_eq!(cfg.required_optical_size(), 9);
    }

    #[test]
    fn rejects_zero_outputs() {
        let err = FunctorConfig::new(pairs(&[(0, 0)]), 1, 1, 0.0, 0.0, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "outputs", .. }));
    }

    #[test]
    fn identical_inputs_give_identical_outputs() {
        let cfg = FunctorConfig::new(pairs(&[(0, 1), (1, 0)]), 1, 2, 0.0, 0.0, 2).unwrap();
        let sar = [0.0, 2.0];
        let opt = [1.0, 1.5, 0.0, 0.0];
        assert_eq!(cfg.select(&sar, &opt), cfg.select(&sar, &opt));
    }
}
