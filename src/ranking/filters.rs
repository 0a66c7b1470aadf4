//! Rule-based filtering.
//!
//! Hard filters run after ranking and truncation, so they narrow the final
//! page rather than reshaping the candidate pool. Matching is
//! case-insensitive substring against the profile's searchable text; an
//! empty spec passes everything through untouched.

use crate::profiles::{CandidateProfile, CandidateScore, FilterSpec};

/// Drop entries that miss a `must_have` term (all are required) or match an
/// `exclude` term (any one rejects). Order is preserved.
pub fn apply_hard(
    entries: Vec<(CandidateProfile, CandidateScore)>,
    spec: &FilterSpec,
) -> Vec<(CandidateProfile, CandidateScore)> {
    if spec.must_have.is_empty() && spec.exclude.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|(profile, _)| passes_hard(profile, spec))
        .collect()
}

/// Whether a single profile satisfies the hard predicates.
pub fn passes_hard(profile: &CandidateProfile, spec: &FilterSpec) -> bool {
    let required = spec.must_have.iter().all(|term| profile.has_keyword(term));
    let excluded = spec.exclude.iter().any(|term| profile.has_keyword(term));
    required && !excluded
}

/// Fraction of `preferred` terms the profile matches, in `[0, 1]`.
/// Zero when the spec has no preferred terms.
pub fn soft_score(profile: &CandidateProfile, spec: &FilterSpec) -> f64 {
    if spec.preferred.is_empty() {
        return 0.0;
    }

    let matched = spec
        .preferred
        .iter()
        .filter(|term| profile.has_keyword(term))
        .count();
    matched as f64 / spec.preferred.len() as f64
}
