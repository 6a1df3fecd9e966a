//! Source deduplication: keep only the images referenced by candidate pairs,
//! once each, and rewrite the pairs into the compacted index space.
use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::types::IndexPair;

/// Images selected for stacking, and the candidate pairs expressed in stack positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSelection {
    /// Original SAR list indices, in stacking order
    pub sar: Vec<usize>,
    /// Original optical list indices, in stacking order
    pub optical: Vec<usize>,
    /// Candidate pairs rewritten into stack positions (same order and length as the input)
    pub pairs: Vec<IndexPair>,
}

/// First-occurrence compaction of one modality's indices
#[derive(Debug, Default)]
struct Compactor {
    used: Vec<usize>,
    positions: HashMap<usize, usize>,
}

impl Compactor {
    /// Returns the compact index and whether the original index was seen for the first time
    fn compact(&mut self, original: usize) -> (usize, bool) {
        if let Some(&pos) = self.positions.get(&original) {
            return (pos, false);
        }
        let pos = self.used.len();
        self.used.push(original);
        self.positions.insert(original, pos);
        (pos, true)
    }
}

/// Walk the candidate list once, building per-modality stacks in first-seen order
pub fn deduplicate(candidates: &[IndexPair]) -> SourceSelection {
    info!("Preparing input image stacks");
    let mut sar = Compactor::default();
    let mut optical = Compactor::default();
    let mut pairs = Vec::with_capacity(candidates.len());

    for pair in candidates {
        let (sar_idx, sar_new) = sar.compact(pair.sar);
        if sar_new {
            info!("\tAdd SAR image #{}", pair.sar);
        }
        let (opt_idx, opt_new) = optical.compact(pair.optical);
        if opt_new {
            info!("\tAdd optical image #{}", pair.optical);
        }
        info!(
            "\tNew indices: SAR image #{} --> {}, optical image #{} --> {}",
            pair.sar, sar_idx, pair.optical, opt_idx
        );
        pairs.push(IndexPair::new(sar_idx, opt_idx));
    }

    SourceSelection {
        sar: sar.used,
        optical: optical.used,
        pairs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pairs(list: &[(usize, usize)]) -> Vec<IndexPair> {
        list.iter().map(|&(s, o)| IndexPair::new(s, o)).collect()
    }

    #[test]
    fn compacts_in_first_seen_order() {
        let candidates = pairs(&[(4, 2), (1, 2), (4, 0), (1, 7)]);
        let selection = deduplicate(&candidates);
        assert_eq!(selection.sar, vec![4, 1]);
        assert_eq!(selection.optical, vec![2, 0, 7]);
        assert_eq!(selection.pairs, pairs(&[(0, 0), (1, 0), (0, 1), (1, 2)]));
    }

    #[test]
    fn remapped_pairs_point_back_to_original_indices() {
        let candidates = pairs(&[(3, 1), (0, 1), (3, 5), (2, 4), (0, 5)]);
        let selection = deduplicate(&candidates);
        assert_eq!(selection.pairs.len(), candidates.len());
        for (orig, remapped) in candidates.iter().zip(&selection.pairs) {
            assert_eq!(selection.sar[remapped.sar], orig.sar);
            assert_eq!(selection.optical[remapped.optical], orig.optical);
        }
    }

    #[test]
    fn stack_sizes_match_distinct_indices() {
        let candidates = pairs(&[(0, 0), (0, 1), (2, 1), (2, 0), (5, 3), (0, 3)]);
        let selection = deduplicate(&candidates);
        let distinct_sar: HashSet<usize> = candidates.iter().map(|p| p.sar).collect();
        let distinct_opt: HashSet<usize> = candidates.iter().map(|p| p.optical).collect();
        assert_eq!(selection.sar.len(), distinct_sar.len());
        assert_eq!(selection.optical.len(), distinct_opt.len());
    }

    #[test]
    fn deduplication_is_deterministic() {
        let candidates = pairs(&[(9, 1), (3, 1), (9, 4), (3, 4)]);
        assert_eq!(deduplicate(&candidates), deduplicate(&candidates));
    }
}
