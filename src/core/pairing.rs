//! Candidate pair generation.
//!
//! Optical acquisitions are ordered by the selected [`SortStrategy`]. For each of
//! them, in that order, SAR acquisitions are ordered from the closest to the
//! farthest in time and every SAR acquisition within `max_gap` seconds is paired
//! with it. The resulting list is the priority order used when filling output
//! slots: earlier optical images first, and for one optical image, the closest
//! SAR image first.
use tracing::{info, warn};

use crate::core::timestamps::{SortStrategy, Timestamp, describe_timestamp, sort_by_gap};
use crate::error::{Error, Result};
use crate::types::IndexPair;

/// Default maximum SAR/optical gap: 144 hours, in seconds
pub const DEFAULT_MAX_GAP: f64 = 144.0 * 3600.0;

/// Gaps below this many seconds most likely mean the value was given in hours
pub const SMALL_MAX_GAP: f64 = 3600.0;

/// Build the ordered candidate list of (SAR, optical) pairs in original list indices.
///
/// A pair is kept when `|t_sar - t_opt| <= max_gap`. Fails with
/// [`Error::NoPairsFound`] when no pair survives.
pub fn generate_candidates(
    sar: &[Timestamp],
    optical: &[Timestamp],
    strategy: SortStrategy,
    max_gap: f64,
) -> Result<Vec<IndexPair>> {
    if max_gap < SMALL_MAX_GAP {
        warn!(
            "maxgap is small ({} seconds). Did you forget to convert maxgap to seconds?",
            max_gap
        );
    }

    info!("Sorting optical timestamps in {}", strategy);
    let mut optical_sorted = optical.to_vec();
    strategy.sort(&mut optical_sorted);

    let mut pairs = Vec::new();
    let mut sar_sorted = Vec::with_capacity(sar.len());
    for opt in &optical_sorted {
        // Fresh copy each time so ties fall back to input order, not the previous ordering
        sar_sorted.clear();
        sar_sorted.extend_from_slice(sar);
        sort_by_gap(&mut sar_sorted, opt.value);

        pairs.extend(
            sar_sorted
                .iter()
                .filter(|s| (s.value - opt.value).abs() <= max_gap)
                .map(|s| IndexPair::new(s.index, opt.index)),
        );
    }

    if pairs.is_empty() {
        return Err(Error::NoPairsFound { max_gap });
    }

    info!("Candidate pairs of indices:");
    for pair in &pairs {
        let sar_ts = timestamp_of(sar, pair.sar);
        let opt_ts = timestamp_of(optical, pair.optical);
        info!(
            "\tSAR: {} ({}) OPT: {} ({}) gap: {}s",
            pair.sar,
            describe_timestamp(sar_ts),
            pair.optical,
            describe_timestamp(opt_ts),
            (sar_ts - opt_ts).abs()
        );
    }

    Ok(pairs)
}

// Parsed timestamps keep input order, so the original index is also the position
fn timestamp_of(timestamps: &[Timestamp], index: usize) -> f64 {
    timestamps.get(index).map(|t| t.value).unwrap_or(f64::NAN)
}
