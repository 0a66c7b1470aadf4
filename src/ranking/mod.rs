//! Score aggregation and ranking.
//!
//! Retrieval produces ranked batches; this module folds them into one score
//! per candidate and sorts. Scoring is positional: backends' raw similarity
//! scores are not comparable across strategies, so only ranks count:
//!
//! - vector: a hit at rank `r` for variant `v` adds `1/(v+1) * 1/(r+1)`,
//!   so the raw query (variant 0) outweighs its expansions;
//! - text: a hit at rank `r` in the merged keyword list adds `1/(r+1)`;
//! - soft filter: the fraction of preferred terms the profile matches.
//!
//! The weighted sum of the three decides the order. The sort is stable and
//! descending; ties keep discovery order (vector batches first, then text),
//! which makes a search deterministic for identical backend responses.

pub mod filters;
pub mod quality;

use std::collections::HashMap;

use crate::profiles::{CandidateProfile, CandidateScore, FilterSpec};
use crate::retrieval::{TextRetrieval, VectorRetrieval};

/// Folds retrieval output into combined candidate scores.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator {
    vector_weight: f64,
    text_weight: f64,
    soft_weight: f64,
}

impl ScoreAggregator {
    pub fn new(vector_weight: f64, text_weight: f64, soft_weight: f64) -> Self {
        Self {
            vector_weight,
            text_weight,
            soft_weight,
        }
    }

    /// Merge vector and text retrieval into one scored, descending-sorted
    /// candidate list. Each candidate appears exactly once; the profile kept
    /// is the first occurrence seen.
    pub fn aggregate(
        &self,
        vector: &VectorRetrieval,
        text: &TextRetrieval,
        filter_spec: &FilterSpec,
    ) -> Vec<(CandidateProfile, CandidateScore)> {
        let mut entries: Vec<(CandidateProfile, CandidateScore)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        let mut slot_for =
            |entries: &mut Vec<(CandidateProfile, CandidateScore)>, profile: &CandidateProfile| {
                *positions.entry(profile.id.clone()).or_insert_with(|| {
                    entries.push((profile.clone(), CandidateScore::new(&profile.id)));
                    entries.len() - 1
                })
            };

        for (variant, batch) in vector.batches.iter().enumerate() {
            let variant_weight = 1.0 / (variant as f64 + 1.0);
            for (rank, profile) in batch.iter().enumerate() {
                let slot = slot_for(&mut entries, profile);
                entries[slot].1.vector += variant_weight / (rank as f64 + 1.0);
            }
        }

        for (rank, profile) in text.profiles.iter().enumerate() {
            let slot = slot_for(&mut entries, profile);
            entries[slot].1.text += 1.0 / (rank as f64 + 1.0);
        }

        for (profile, score) in &mut entries {
            score.soft_filter = filters::soft_score(profile, filter_spec);
            score.combine(self.vector_weight, self.text_weight, self.soft_weight);
        }

        entries.sort_by(|a, b| {
            b.1.combined
                .partial_cmp(&a.1.combined)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries
    }
}
