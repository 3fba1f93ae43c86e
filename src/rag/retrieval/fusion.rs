//! Reciprocal Rank Fusion: score = Σ 1/(k + rank + 1), rank 0-based.
//!
//! Combines ranked lists without normalizing their native scores. Items are
//! identified by exact text; the first occurrence supplies the metadata.

use std::collections::HashMap;

use crate::rag::types::{sort_by_score_desc, ScoredDocument};

/// Smoothing constant
pub const RRF_K: u32 = 60;

/// Rank fuser
#[derive(Debug, Clone, Copy)]
pub struct RankFuser {
    k: u32,
}

impl Default for RankFuser {
    fn default() -> Self {
        Self { k: RRF_K }
    }
}

impl RankFuser {
    pub fn new(k: u32) -> Self {
        Self { k }
    }

    /// Contribution of an item at 0-based `rank`
    pub fn contribution(&self, rank: usize) -> f64 {
        1.0 / (self.k as f64 + rank as f64 + 1.0)
    }

    /// Fuse ranked lists. Every unique item is returned, sorted by fused score;
    /// equal scores keep first-seen order across the lists in argument order.
    pub fn fuse(&self, lists: &[&[ScoredDocument]]) -> Vec<ScoredDocument> {
        let mut fused: Vec<ScoredDocument> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for list in lists {
            for (rank, doc) in list.iter().enumerate() {
                let contribution = self.contribution(rank);
                match positions.get(doc.text.as_str()) {
                    Some(&idx) => fused[idx].score += contribution,
                    None => {
                        positions.insert(doc.text.as_str(), fused.len());
                        fused.push(doc.clone().with_score(contribution));
                    }
                }
            }
        }

        sort_by_score_desc(&mut fused);
        fused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::types::Metadata;

    fn docs(texts: &[&str]) -> Vec<ScoredDocument> {
        texts
            .iter()
            .map(|t| ScoredDocument::new(*t, Metadata::new(), 0.42))
            .collect()
    }

    #[test]
    fn test_rrf_equal_rank_symmetry() {
        let fuser = RankFuser::default();
        let a = docs(&["x", "y", "z"]);
        let b = docs(&["w", "y", "v"]);

        let fused = fuser.fuse(&[a.as_slice(), b.as_slice()]);
        let y = fused.iter().find(|d| d.text == "y").unwrap();
        assert!((y.score - 2.0 / 62.0).abs() < 1e-12);
    }

    #[test]
    fn test_rrf_tie_break_first_seen() {
        let fuser = RankFuser::default();
        let a = docs(&["X", "Y"]);
        let b = docs(&["Y", "X"]);

        let fused = fuser.fuse(&[a.as_slice(), b.as_slice()]);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].score, fused[1].score);
        assert!((fused[0].score - (1.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-12);
        assert_eq!(fused[0].text, "X");
        assert_eq!(fused[1].text, "Y");
    }

    #[test]
    fn test_rrf_rewards_agreement() {
        let fuser = RankFuser::default();
        let a = docs(&["solo-a", "shared"]);
        let b = docs(&["solo-b", "shared"]);

        let fused = fuser.fuse(&[a.as_slice(), b.as_slice()]);
        assert_eq!(fused[0].text, "shared");
        assert_eq!(fused.len(), 3);
    }

    #[test]
    fn test_rrf_single_list_keeps_order() {
        let fuser = RankFuser::default();
        let a = docs(&["first", "second", "third"]);
        let none: Vec<ScoredDocument> = Vec::new();

        let fused = fuser.fuse(&[a.as_slice(), none.as_slice()]);
        let order: Vec<&str> = fused.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
        assert_eq!(fused[0].score, fuser.contribution(0));
    }

    #[test]
    fn test_rrf_empty() {
        let none: Vec<ScoredDocument> = Vec::new();
        assert!(RankFuser::default()
            .fuse(&[none.as_slice(), none.as_slice()])
            .is_empty());
    }
}
