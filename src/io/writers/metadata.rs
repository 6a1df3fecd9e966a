use std::path::{Path, PathBuf};

use gdal::{Dataset, Metadata};
use serde::Serialize;
use tracing::info;

use crate::core::processing::pipeline::{ExecutionPlan, PairingPlan, RunStats};
use crate::core::slicer::SlotChannels;
use crate::core::timestamps::{SortStrategy, Timestamp, describe_timestamp};
use crate::error::Result;
use crate::io::gdal::GdalError;
use crate::types::{IndexPair, Modality, SortMode};

/// Metadata items describing one output file
pub fn slot_metadata_fields(
    plan: &ExecutionPlan,
    slot: usize,
    modality: Modality,
) -> Vec<(String, String)> {
    let functor = plan.functor();
    let channels = plan.slicer().slot(slot);
    let (range, nodata) = match modality {
        Modality::Sar => (channels.sar, functor.sar_nodata()),
        Modality::Optical => (channels.optical, functor.optical_nodata()),
    };
    let pairing = plan.pairing();
    vec![
        ("MODALITY".to_string(), modality.to_string()),
        ("OUTPUT_SLOT".to_string(), (slot + 1).to_string()),
        ("OUTPUT_SLOTS".to_string(), plan.outputs().to_string()),
        ("CHANNELS".to_string(), range.to_string()),
        ("NODATA".to_string(), nodata.to_string()),
        ("SORTING".to_string(), pairing.strategy.mode().to_string()),
        ("MAX_GAP_SECONDS".to_string(), pairing.max_gap.to_string()),
        (
            "CANDIDATE_PAIRS".to_string(),
            pairing.candidates.len().to_string(),
        ),
    ]
}

/// Set metadata items on the dataset (default domain)
pub fn embed_slot_metadata(
    ds: &mut Dataset,
    fields: &[(String, String)],
) -> std::result::Result<(), GdalError> {
    for (key, value) in fields {
        ds.set_metadata_item(key, value, "")?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateRecord {
    pub sar: usize,
    pub optical: usize,
    pub sar_timestamp: f64,
    pub optical_timestamp: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StackRecord {
    /// Position in the stack
    pub position: usize,
    /// Index in the input list
    pub index: usize,
    pub timestamp: f64,
    pub utc: String,
    pub source: Option<PathBuf>,
}

/// JSON sidecar describing how a run paired and stacked its inputs
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub sorting: SortMode,
    pub reference_timestamp: Option<f64>,
    pub max_gap: f64,
    pub candidates: Vec<CandidateRecord>,
    pub sar_stack: Vec<StackRecord>,
    pub optical_stack: Vec<StackRecord>,
    /// Candidate pairs in stack positions
    pub pairs: Vec<IndexPair>,
    pub outputs: Option<usize>,
    pub slots: Vec<SlotChannels>,
    pub stats: Option<RunStats>,
}

impl RunSummary {
    /// Summary of the metadata phase only
    pub fn from_pairing(
        pairing: &PairingPlan,
        sar_sources: &[PathBuf],
        optical_sources: &[PathBuf],
    ) -> Self {
        let reference_timestamp = match pairing.strategy {
            SortStrategy::AbsoluteGap { reference } => Some(reference),
            _ => None,
        };
        let candidates = pairing
            .candidates
            .iter()
            .map(|pair| {
                let sar_timestamp = value_of(&pairing.sar_timestamps, pair.sar);
                let optical_timestamp = value_of(&pairing.optical_timestamps, pair.optical);
                CandidateRecord {
                    sar: pair.sar,
                    optical: pair.optical,
                    sar_timestamp,
                    optical_timestamp,
                    gap: (sar_timestamp - optical_timestamp).abs(),
                }
            })
            .collect();
        Self {
            sorting: pairing.strategy.mode(),
            reference_timestamp,
            max_gap: pairing.max_gap,
            candidates,
            sar_stack: stack_records(
                &pairing.selection.sar,
                &pairing.sar_timestamps,
                sar_sources,
            ),
            optical_stack: stack_records(
                &pairing.selection.optical,
                &pairing.optical_timestamps,
                optical_sources,
            ),
            pairs: pairing.selection.pairs.clone(),
            outputs: None,
            slots: Vec::new(),
            stats: None,
        }
    }

    /// Summary of a complete run
    pub fn from_plan(
        plan: &ExecutionPlan,
        sar_sources: &[PathBuf],
        optical_sources: &[PathBuf],
        stats: Option<RunStats>,
    ) -> Self {
        let mut summary = Self::from_pairing(plan.pairing(), sar_sources, optical_sources);
        summary.outputs = Some(plan.outputs());
        summary.slots = plan.slicer().slots().collect();
        summary.stats = stats;
        summary
    }
}

fn value_of(timestamps: &[Timestamp], index: usize) -> f64 {
    timestamps.get(index).map(|t| t.value).unwrap_or(f64::NAN)
}

fn stack_records(
    indices: &[usize],
    timestamps: &[Timestamp],
    sources: &[PathBuf],
) -> Vec<StackRecord> {
    indices
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            let timestamp = value_of(timestamps, index);
            StackRecord {
                position,
                index,
                timestamp,
                utc: describe_timestamp(timestamp),
                source: sources.get(index).cloned(),
            }
        })
        .collect()
}

/// Write the run summary as pretty JSON
pub fn write_run_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    info!("Run summary written to {:?}", path);
    Ok(())
}
