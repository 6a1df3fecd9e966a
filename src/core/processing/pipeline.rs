//! Pipeline builder and strip-wise execution.
//!
//! Building a plan runs the whole metadata phase (timestamp parsing, candidate
//! generation, deduplication) and freezes the functor configuration. Running a
//! plan streams strips from two [`BlockSource`]s through the functor and hands
//! the sliced outputs to a [`BlockSink`]. Every configuration error surfaces while
//! building, before any strip is read.
use std::sync::atomic::{AtomicBool, Ordering};

use ndarray::{Array3, ArrayView3, Axis, Zip};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::dedup::{SourceSelection, deduplicate};
use crate::core::functor::FunctorConfig;
use crate::core::pairing::generate_candidates;
use crate::core::params::PairingParams;
use crate::core::processing::tiles::{TileGrid, TileWindow};
use crate::core::slicer::OutputSlicer;
use crate::core::timestamps::{SortStrategy, Timestamp, index_modality};
use crate::error::{Error, Result};
use crate::types::{IndexPair, Modality};

/// Read access to a band-wise stacked image, one window at a time
pub trait BlockSource {
    /// (width, height) in pixels
    fn size(&self) -> (usize, usize);

    /// Total number of stacked bands
    fn band_count(&self) -> usize;

    /// Block of shape `(band_count, window.height, window.width)`
    fn read_block(&mut self, window: &TileWindow) -> Result<Array3<f32>>;
}

/// Receives the N (SAR, optical) outputs of each strip
pub trait BlockSink {
    fn write_slot(
        &mut self,
        slot: usize,
        window: &TileWindow,
        sar: ArrayView3<'_, f32>,
        optical: ArrayView3<'_, f32>,
    ) -> Result<()>;
}

/// Inputs of the metadata phase
#[derive(Debug)]
pub struct PairingInputs<'a, S: AsRef<str>> {
    pub sar_images: usize,
    pub optical_images: usize,
    pub sar_timestamps: &'a [S],
    pub optical_timestamps: &'a [S],
}

/// Result of the metadata phase, before band counts are known
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairingPlan {
    #[serde(skip)]
    pub strategy: SortStrategy,
    pub max_gap: f64,
    #[serde(skip)]
    pub sar_timestamps: Vec<Timestamp>,
    #[serde(skip)]
    pub optical_timestamps: Vec<Timestamp>,
    /// Candidate pairs in original list indices, in priority order
    pub candidates: Vec<IndexPair>,
    pub selection: SourceSelection,
}

/// Frozen execution plan. Nothing in it changes once streaming starts.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pairing: PairingPlan,
    functor: FunctorConfig,
    slicer: OutputSlicer,
    strip_height: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub strips: usize,
    pub pixels: u64,
    /// Pixels where slot k holds real data, per slot
    pub filled_pixels: Vec<u64>,
}

/// Metadata phase: check counts, parse timestamps, generate and deduplicate candidates
pub fn plan_pairs<S: AsRef<str>>(
    inputs: &PairingInputs<'_, S>,
    params: &PairingParams,
) -> Result<PairingPlan> {
    params.validate()?;
    let sar_timestamps = index_modality(Modality::Sar, inputs.sar_images, inputs.sar_timestamps)?;
    let optical_timestamps = index_modality(
        Modality::Optical,
        inputs.optical_images,
        inputs.optical_timestamps,
    )?;
    let strategy = SortStrategy::resolve(params.sorting, params.reference_timestamp.as_deref())?;

    let candidates =
        generate_candidates(&sar_timestamps, &optical_timestamps, strategy, params.max_gap)?;
    let selection = deduplicate(&candidates);

    Ok(PairingPlan {
        strategy,
        max_gap: params.max_gap,
        sar_timestamps,
        optical_timestamps,
        candidates,
        selection,
    })
}

impl ExecutionPlan {
    /// Freeze the functor once the band counts of both modalities are known
    pub fn new(
        pairing: PairingPlan,
        sar_bands: usize,
        optical_bands: usize,
        params: &PairingParams,
    ) -> Result<Self> {
        info!("Number of bands found in SAR images: {}", sar_bands);
        info!("Number of bands found in optical images: {}", optical_bands);
        let functor = FunctorConfig::new(
            pairing.selection.pairs.clone(),
            sar_bands,
            optical_bands,
            params.sar_nodata,
            params.optical_nodata,
            params.outputs,
        )?;
        let slicer = OutputSlicer::from_config(&functor);
        for slot in slicer.slots() {
            debug!(
                "Output #{}: SAR channels {}, optical channels {}",
                slot.slot + 1,
                slot.sar,
                slot.optical
            );
        }
        Ok(Self {
            pairing,
            functor,
            slicer,
            strip_height: params.strip_height,
        })
    }

    pub fn pairing(&self) -> &PairingPlan {
        &self.pairing
    }

    pub fn functor(&self) -> &FunctorConfig {
        &self.functor
    }

    pub fn slicer(&self) -> &OutputSlicer {
        &self.slicer
    }

    pub fn strip_height(&self) -> usize {
        self.strip_height
    }

    pub fn outputs(&self) -> usize {
        self.functor.outputs()
    }

    /// Check that two stacks match the plan before reading from them
    pub fn check_sources<A: BlockSource, B: BlockSource>(&self, sar: &A, optical: &B) -> Result<()> {
        check_stack(Modality::Sar, sar, self.functor.required_sar_size())?;
        check_stack(
            Modality::Optical,
            optical,
            self.functor.required_optical_size(),
        )?;
        let (sx, sy) = sar.size();
        let (ox, oy) = optical.size();
        if (sx, sy) != (ox, oy) {
            return Err(Error::DimensionMismatch {
                modality: Modality::Optical,
                index: 0,
                expected_x: sx,
                expected_y: sy,
                found_x: ox,
                found_y: oy,
            });
        }
        Ok(())
    }
}

fn check_stack<B: BlockSource>(modality: Modality, source: &B, required: usize) -> Result<()> {
    if source.band_count() < required {
        return Err(Error::BandCountMismatch {
            modality,
            index: 0,
            expected: required,
            found: source.band_count(),
        });
    }
    Ok(())
}

fn check_block(
    modality: Modality,
    block: &Array3<f32>,
    bands: usize,
    window: &TileWindow,
) -> Result<()> {
    let expected = (bands, window.height, window.width);
    if block.dim() != expected {
        return Err(Error::Processing(format!(
            "{} block at row {} has shape {:?}, expected {:?}",
            modality,
            window.y,
            block.dim(),
            expected
        )));
    }
    Ok(())
}

/// Build the plan in one go when band counts are already known
pub fn build_plan<S: AsRef<str>>(
    inputs: &PairingInputs<'_, S>,
    sar_bands: usize,
    optical_bands: usize,
    params: &PairingParams,
) -> Result<ExecutionPlan> {
    let pairing = plan_pairs(inputs, params)?;
    ExecutionPlan::new(pairing, sar_bands, optical_bands, params)
}

/// Evaluate the functor over one pair of input blocks.
///
/// Returns the output block `(output_size, rows, cols)` and, per slot, the number
/// of pixels where that slot holds real data. Pixels are processed in parallel.
pub fn process_block(
    functor: &FunctorConfig,
    sar: ArrayView3<'_, f32>,
    optical: ArrayView3<'_, f32>,
) -> (Array3<f32>, Vec<u64>) {
    let (_, rows, cols) = sar.dim();
    let mut out = Array3::<f32>::zeros((functor.output_size(), rows, cols));
    let filled = Zip::from(out.lanes_mut(Axis(0)))
        .and(sar.lanes(Axis(0)))
        .and(optical.lanes(Axis(0)))
        .par_map_collect(|o, s, p| functor.select_into(s, p, o));

    let mut histogram = vec![0u64; functor.outputs()];
    for &count in filled.iter() {
        for slot in histogram.iter_mut().take(count) {
            *slot += 1;
        }
    }
    (out, histogram)
}

/// Stream the plan over both sources, strip by strip.
///
/// `cancel` is checked before each strip; once set, the run stops with
/// [`Error::Cancelled`].
pub fn run_tiles<A, B, K>(
    plan: &ExecutionPlan,
    sar: &mut A,
    optical: &mut B,
    sink: &mut K,
    cancel: Option<&AtomicBool>,
) -> Result<RunStats>
where
    A: BlockSource,
    B: BlockSource,
    K: BlockSink,
{
    plan.check_sources(sar, optical)?;
    let (width, height) = sar.size();
    let grid = TileGrid::new(width, height, plan.strip_height);
    info!(
        "Streaming {}x{} pixels in {} strips of up to {} rows",
        width,
        height,
        grid.len(),
        plan.strip_height
    );

    let mut stats = RunStats {
        filled_pixels: vec![0; plan.outputs()],
        ..Default::default()
    };
    for window in grid.iter() {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(Error::Cancelled);
        }
        let sar_block = sar.read_block(&window)?;
        let opt_block = optical.read_block(&window)?;
        check_block(Modality::Sar, &sar_block, sar.band_count(), &window)?;
        check_block(Modality::Optical, &opt_block, optical.band_count(), &window)?;
        let (out, histogram) = process_block(&plan.functor, sar_block.view(), opt_block.view());

        for (slot, (sar_view, opt_view)) in plan.slicer.views(out.view()).into_iter().enumerate() {
            sink.write_slot(slot, &window, sar_view, opt_view)?;
        }

        stats.strips += 1;
        stats.pixels += window.pixels() as u64;
        for (total, count) in stats.filled_pixels.iter_mut().zip(histogram) {
            *total += count;
        }
        debug!("Strip at row {} done ({} rows)", window.y, window.height);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_block_fills_each_pixel_independently() {
        let cfg = FunctorConfig::new(
            vec![IndexPair::new(0, 0), IndexPair::new(1, 1)],
            1,
            1,
            0.0,
            -1.0,
            2,
        )
        .unwrap();
        // Two pixels: first has both pairs valid, second only the second pair
        let sar = Array3::from_shape_vec((2, 1, 2), vec![5.0, 0.0, 6.0, 7.0]).unwrap();
        let opt = Array3::from_shape_vec((2, 1, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let (out, histogram) = process_block(&cfg, sar.view(), opt.view());

        assert_eq!(out.dim(), (4, 1, 2));
        let px0: Vec<f32> = out.slice(ndarray::s![.., 0, 0]).to_vec();
        let px1: Vec<f32> = out.slice(ndarray::s![.., 0, 1]).to_vec();
        assert_eq!(px0, vec![5.0, 1.0, 6.0, 3.0]);
        assert_eq!(px1, vec![7.0, 4.0, 0.0, -1.0]);
        assert_eq!(histogram, vec![2, 1]);
    }
}
