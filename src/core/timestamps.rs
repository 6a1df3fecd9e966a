//! Timestamp indexing and ordering strategies.
//!
//! Acquisition timestamps arrive as strings (seconds since an epoch). They are
//! parsed once into [`Timestamp`] values that remember their position in the
//! input list, so that sorting never loses the link to the image they describe.
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{Error, Result};
use crate::types::{Modality, SortMode};

/// One parsed acquisition time and its position in the input list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamp {
    pub value: f64,
    pub index: usize,
}

/// A resolved ordering strategy, ready to sort timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortStrategy {
    Ascending,
    Descending,
    AbsoluteGap { reference: f64 },
}

impl SortStrategy {
    /// Resolve a [`SortMode`] selector. `Abs` needs a parsable reference timestamp.
    pub fn resolve(mode: SortMode, reference: Option<&str>) -> Result<Self> {
        match mode {
            SortMode::Asc => Ok(SortStrategy::Ascending),
            SortMode::Des => Ok(SortStrategy::Descending),
            SortMode::Abs => {
                let reference = reference.ok_or(Error::MissingReferenceTimestamp)?;
                Ok(SortStrategy::AbsoluteGap {
                    reference: parse_timestamp(reference)?,
                })
            }
        }
    }

    pub fn mode(&self) -> SortMode {
        match self {
            SortStrategy::Ascending => SortMode::Asc,
            SortStrategy::Descending => SortMode::Des,
            SortStrategy::AbsoluteGap { .. } => SortMode::Abs,
        }
    }

    /// Stable in-place sort; ties keep their relative order.
    pub fn sort(&self, timestamps: &mut [Timestamp]) {
        match *self {
            SortStrategy::Ascending => timestamps.sort_by(|a, b| compare(a.value, b.value)),
            SortStrategy::Descending => timestamps.sort_by(|a, b| compare(b.value, a.value)),
            SortStrategy::AbsoluteGap { reference } => sort_by_gap(timestamps, reference),
        }
    }
}

impl std::fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortStrategy::Ascending => write!(f, "ascending order"),
            SortStrategy::Descending => write!(f, "descending order"),
            SortStrategy::AbsoluteGap { reference } => write!(
                f,
                "ascending gap to reference timestamp {} ({})",
                reference,
                describe_timestamp(*reference)
            ),
        }
    }
}

/// Stable sort by ascending `|t - reference|`
pub fn sort_by_gap(timestamps: &mut [Timestamp], reference: f64) {
    timestamps.sort_by(|a, b| compare((a.value - reference).abs(), (b.value - reference).abs()));
}

/// Numeric order of finite values; `-0.0` and `0.0` compare equal
fn compare(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Parse one timestamp string. Surrounding whitespace is ignored; anything that is
/// not a finite number is rejected.
pub fn parse_timestamp(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::InvalidTimestamp {
            value: s.to_string(),
        }),
    }
}

/// Parse a whole timestamp list, keeping each entry's original index
pub fn index_timestamps<S: AsRef<str>>(values: &[S]) -> Result<Vec<Timestamp>> {
    values
        .iter()
        .enumerate()
        .map(|(index, s)| {
            Ok(Timestamp {
                value: parse_timestamp(s.as_ref())?,
                index,
            })
        })
        .collect()
}

/// Ensure an image list and its timestamp list have the same length
pub fn check_counts(modality: Modality, images: usize, timestamps: usize) -> Result<()> {
    if images != timestamps {
        return Err(Error::ImageCountMismatch {
            modality,
            images,
            timestamps,
        });
    }
    Ok(())
}

/// Check counts, parse, and log the timestamps of one modality
pub fn index_modality<S: AsRef<str>>(
    modality: Modality,
    images: usize,
    values: &[S],
) -> Result<Vec<Timestamp>> {
    check_counts(modality, images, values.len())?;
    let timestamps = index_timestamps(values)?;
    info!("Timestamps for {} images:", modality);
    for ts in &timestamps {
        info!("\t#{}: {} ({})", ts.index, ts.value, describe_timestamp(ts.value));
    }
    Ok(timestamps)
}

/// Human readable UTC rendering of a seconds timestamp, for logs and summaries
pub fn describe_timestamp(value: f64) -> String {
    let secs = value.floor();
    let nanos = ((value - secs) * 1e9) as u32;
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return "out of range".to_string();
    }
    match DateTime::<Utc>::from_timestamp(secs as i64, nanos) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => "out of range".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(ts: &[Timestamp]) -> Vec<f64> {
        ts.iter().map(|t| t.value).collect()
    }

    fn indices(ts: &[Timestamp]) -> Vec<usize> {
        ts.iter().map(|t| t.index).collect()
    }

    #[test]
    fn parses_numbers_and_keeps_indices() {
        let ts = index_timestamps(&["10", " 50.5 ", "-3e2"]).unwrap();
        assert_eq!(values(&ts), vec![10.0, 50.5, -300.0]);
        assert_eq!(indices(&ts), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_non_numeric_timestamps() {
        for bad in ["", "abc", "12abc", "NaN", "inf"] {
            let err = parse_timestamp(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidTimestamp { .. }), "{bad} should be rejected");
        }
    }

    #[test]
    fn count_mismatch_names_the_modality() {
        let err = index_modality(Modality::Optical, 3, &["1", "2"]).unwrap_err();
        match err {
            Error::ImageCountMismatch {
                modality,
                images,
                timestamps,
            } => {
                assert_eq!(modality, Modality::Optical);
                assert_eq!(images, 3);
                assert_eq!(timestamps, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ascending_and_descending_are_reversed() {
        let mut asc = index_timestamps(&["30", "10", "20", "50"]).unwrap();
        let mut des = asc.clone();
        SortStrategy::Ascending.sort(&mut asc);
        SortStrategy::Descending.sort(&mut des);
        assert_eq!(values(&asc), vec![10.0, 20.0, 30.0, 50.0]);
        let mut reversed = values(&des);
        reversed.reverse();
        assert_eq!(values(&asc), reversed);
    }

    #[test]
    fn sorting_is_stable_on_ties() {
        let mut ts = index_timestamps(&["20", "10", "20", "10"]).unwrap();
        SortStrategy::Ascending.sort(&mut ts);
        assert_eq!(indices(&ts), vec![1, 3, 0, 2]);

        let mut ts = index_timestamps(&["20", "10", "20", "10"]).unwrap();
        SortStrategy::Descending.sort(&mut ts);
        assert_eq!(indices(&ts), vec![0, 2, 1, 3]);
    }

    #[test]
    fn signed_zeros_are_equal_timestamps() {
        let mut ts = index_timestamps(&["0", "-0"]).unwrap();
        SortStrategy::Ascending.sort(&mut ts);
        assert_eq!(indices(&ts), vec![0, 1]);

        let mut ts = index_timestamps(&["-0", "0"]).unwrap();
        SortStrategy::Descending.sort(&mut ts);
        assert_eq!(indices(&ts), vec![0, 1]);

        let mut ts = index_timestamps(&["5", "-5"]).unwrap();
        sort_by_gap(&mut ts, -0.0);
        assert_eq!(indices(&ts), vec![0, 1]);
    }

    #[test]
    fn absolute_gap_is_non_decreasing() {
        let strategy = SortStrategy::resolve(SortMode::Abs, Some("100")).unwrap();
        let mut ts = index_timestamps(&["40", "130", "95", "100", "170", "60"]).unwrap();
        strategy.sort(&mut ts);
        let gaps: Vec<f64> = ts.iter().map(|t| (t.value - 100.0).abs()).collect();
        assert!(gaps.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(indices(&ts), vec![3, 2, 1, 5, 0, 4]);
    }

    #[test]
    fn absolute_gap_ties_keep_input_order() {
        let mut ts = index_timestamps(&["110", "90", "100"]).unwrap();
        sort_by_gap(&mut ts, 100.0);
        assert_eq!(indices(&ts), vec![2, 0, 1]);
    }

    #[test]
    fn abs_strategy_needs_a_valid_reference() {
        assert!(matches!(
            SortStrategy::resolve(SortMode::Abs, None),
            Err(Error::MissingReferenceTimestamp)
        ));
        assert!(matches!(
            SortStrategy::resolve(SortMode::Abs, Some("yesterday")),
            Err(Error::InvalidTimestamp { .. })
        ));
        assert_eq!(
            SortStrategy::resolve(SortMode::Asc, Some("ignored")).unwrap(),
            SortStrategy::Ascending
        );
    }

    #[test]
    fn describes_epoch_seconds_in_utc() {
        assert_eq!(describe_timestamp(0.0), "1970-01-01T00:00:00Z");
        assert_eq!(describe_timestamp(1_577_836_800.0), "2020-01-01T00:00:00Z");
    }
}
