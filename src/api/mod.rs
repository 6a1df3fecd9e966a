//! High-level, ergonomic library API: plan SAR/optical pairs from timestamp lists,
//! or run the complete pairing over GDAL rasters and write the N output pairs.
//! Prefer these entrypoints over the low-level `core` modules when integrating
//! SARPAIR.
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use tracing::info;

use crate::core::params::PairingParams;
use crate::core::processing::pipeline::{
    ExecutionPlan, PairingInputs, PairingPlan, RunStats, plan_pairs, run_tiles,
};
use crate::error::{Error, Result};
use crate::io::gdal::{GdalRaster, GdalStack};
use crate::io::writers::metadata::RunSummary;
use crate::io::writers::tiff::{GdalSlotWriter, GeoReference, OutputPaths};
use crate::types::Modality;

/// Two image time series and their acquisition timestamps (seconds)
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesInputs {
    pub sar_images: Vec<PathBuf>,
    pub optical_images: Vec<PathBuf>,
    pub sar_timestamps: Vec<String>,
    pub optical_timestamps: Vec<String>,
}

impl TimeSeriesInputs {
    fn pairing_inputs(&self) -> PairingInputs<'_, String> {
        PairingInputs {
            sar_images: self.sar_images.len(),
            optical_images: self.optical_images.len(),
            sar_timestamps: &self.sar_timestamps,
            optical_timestamps: &self.optical_timestamps,
        }
    }
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct ProcessReport {
    /// (SAR, optical) output files, slot order
    pub outputs: Vec<(PathBuf, PathBuf)>,
    pub stats: RunStats,
    pub summary: RunSummary,
}

/// Metadata phase only: no raster is opened
pub fn plan_time_series(inputs: &TimeSeriesInputs, params: &PairingParams) -> Result<PairingPlan> {
    plan_pairs(&inputs.pairing_inputs(), params)
}

/// Summary of the pairing decisions, without running the rasters
pub fn summarize_time_series(
    inputs: &TimeSeriesInputs,
    params: &PairingParams,
) -> Result<RunSummary> {
    let pairing = plan_time_series(inputs, params)?;
    Ok(RunSummary::from_pairing(
        &pairing,
        &inputs.sar_images,
        &inputs.optical_images,
    ))
}

/// Pair, stack and stream both time series, then write the N output pairs.
///
/// Output files only appear once the whole raster has been processed; on error
/// or cancellation nothing is left behind.
pub fn process_time_series(
    inputs: &TimeSeriesInputs,
    outputs: &OutputPaths,
    params: &PairingParams,
    cancel: Option<&AtomicBool>,
) -> Result<ProcessReport> {
    if outputs.len() != params.outputs || outputs.optical.len() != params.outputs {
        return Err(Error::InvalidArgument {
            arg: "outputs",
            value: format!(
                "{} output paths for {} outputs",
                outputs.len(),
                params.outputs
            ),
        });
    }

    let pairing = plan_time_series(inputs, params)?;

    // Band counts and raster size come from the first image of each list
    let sar_first = first_image(Modality::Sar, &inputs.sar_images)?;
    let opt_first = first_image(Modality::Optical, &inputs.optical_images)?;
    let size = sar_first.size();

    let mut sar_stack = GdalStack::open(
        Modality::Sar,
        &inputs.sar_images,
        &pairing.selection.sar,
        sar_first.metadata.bands,
        size,
    )?;
    let mut opt_stack = GdalStack::open(
        Modality::Optical,
        &inputs.optical_images,
        &pairing.selection.optical,
        opt_first.metadata.bands,
        size,
    )?;

    let plan = ExecutionPlan::new(
        pairing,
        sar_first.metadata.bands,
        opt_first.metadata.bands,
        params,
    )?;

    let georef = sar_stack
        .rasters()
        .first()
        .map(|r| GeoReference {
            geotransform: r.metadata.geotransform,
            projection: r.metadata.projection.clone(),
        })
        .unwrap_or_default();
    let mut writer = GdalSlotWriter::create(outputs, &plan, size, &georef)?;
    let stats = run_tiles(&plan, &mut sar_stack, &mut opt_stack, &mut writer, cancel)?;
    let written = writer.commit()?;

    for (slot, filled) in stats.filled_pixels.iter().enumerate() {
        info!(
            "Output #{}: {} of {} pixels hold real data",
            slot + 1,
            filled,
            stats.pixels
        );
    }

    let summary = RunSummary::from_plan(
        &plan,
        &inputs.sar_images,
        &inputs.optical_images,
        Some(stats.clone()),
    );
    Ok(ProcessReport {
        outputs: written,
        stats,
        summary,
    })
}

fn first_image(modality: Modality, paths: &[PathBuf]) -> Result<GdalRaster> {
    let path = paths.first().ok_or(Error::EmptyImageList { modality })?;
    let raster = GdalRaster::open(path)?;
    info!(
        "First {} image {:?}: {}x{} pixels, {} bands",
        modality, path, raster.metadata.size_x, raster.metadata.size_y, raster.metadata.bands
    );
    Ok(raster)
}
