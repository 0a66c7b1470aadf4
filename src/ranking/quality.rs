//! Profile-completeness heuristic used by the LLM-enhanced strategy.
//!
//! A thin profile makes a poor rerank candidate and a poor search result; the
//! heuristic scores completeness plus criteria relevance in `[0, 1]` and
//! decides how deep the final page should be. With many high-quality profiles
//! a short page suffices; with few, a longer page compensates.

use crate::catalog::CategoryCriteria;
use crate::profiles::{CandidateProfile, CandidateScore};

/// Minimum quality for a profile to survive [`retain_quality`].
pub const QUALITY_THRESHOLD: f64 = 0.4;

/// Quality at or above which a profile counts as high quality for
/// [`adjusted_count`].
const HIGH_QUALITY: f64 = 0.7;

/// Weight of the criteria-overlap component.
const CRITERIA_WEIGHT: f64 = 0.2;

/// Quality score: summary length tier (up to 0.4), a real name (0.3), a
/// location (0.15), a contact address (0.15), plus up to
/// [`CRITERIA_WEIGHT`] for category-criteria terms appearing in the profile
/// text. Capped at 1.0.
pub fn quality_score(profile: &CandidateProfile, criteria: &CategoryCriteria) -> f64 {
    let mut score = 0.0;

    if let Some(summary) = profile.summary.as_deref() {
        let trimmed = summary.trim();
        if !trimmed.is_empty() {
            score += match trimmed.len() {
                len if len > 200 => 0.4,
                len if len > 100 => 0.3,
                len if len > 50 => 0.2,
                _ => 0.1,
            };
        }
    }

    if profile.name.trim().len() > 2 {
        score += 0.3;
    }
    if profile.location.as_deref().is_some_and(|l| !l.trim().is_empty()) {
        score += 0.15;
    }
    if profile.email.as_deref().is_some_and(|e| !e.trim().is_empty()) {
        score += 0.15;
    }

    score += CRITERIA_WEIGHT * criteria_overlap(profile, criteria);

    score.min(1.0)
}

/// Fraction of criteria terms (hard and soft) present in the profile text.
fn criteria_overlap(profile: &CandidateProfile, criteria: &CategoryCriteria) -> f64 {
    let total = criteria.all_terms().count();
    if total == 0 {
        return 0.0;
    }
    let matched = criteria
        .all_terms()
        .filter(|term| profile.has_keyword(term))
        .count();
    matched as f64 / total as f64
}

/// Drop entries below [`QUALITY_THRESHOLD`], preserving the incoming order.
pub fn retain_quality(
    entries: Vec<(CandidateProfile, CandidateScore)>,
    criteria: &CategoryCriteria,
) -> Vec<(CandidateProfile, CandidateScore)> {
    entries
        .into_iter()
        .filter(|(profile, _)| quality_score(profile, criteria) >= QUALITY_THRESHOLD)
        .collect()
}

/// Final page depth given the quality distribution: 10 when at least five
/// entries are high quality, 15 when at least three are, 20 otherwise.
pub fn adjusted_count(
    entries: &[(CandidateProfile, CandidateScore)],
    criteria: &CategoryCriteria,
) -> usize {
    let high = entries
        .iter()
        .filter(|(profile, _)| quality_score(profile, criteria) >= HIGH_QUALITY)
        .count();

    if high >= 5 {
        10
    } else if high >= 3 {
        15
    } else {
        20
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(
        name: &str,
        summary: Option<&str>,
        location: Option<&str>,
        email: Option<&str>,
    ) -> CandidateProfile {
        CandidateProfile {
            id: "x".to_string(),
            name: name.to_string(),
            email: email.map(str::to_string),
            location: location.map(str::to_string),
            summary: summary.map(str::to_string),
        }
    }

    fn complete() -> CandidateProfile {
        profile(
            "Alice Smith",
            Some(&"board-certified radiologist ".repeat(10)),
            Some("Boston"),
            Some("alice@example.com"),
        )
    }

    fn no_criteria() -> CategoryCriteria {
        CategoryCriteria::default()
    }

    #[test]
    fn test_complete_profile_scores_one() {
        assert!((quality_score(&complete(), &no_criteria()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_length_tiers() {
        let long = profile("Al", Some(&"x".repeat(201)), None, None);
        let medium = profile("Al", Some(&"x".repeat(101)), None, None);
        let short = profile("Al", Some(&"x".repeat(51)), None, None);
        let tiny = profile("Al", Some("x"), None, None);
        let none = profile("Al", None, None, None);

        assert!((quality_score(&long, &no_criteria()) - 0.4).abs() < 1e-12);
        assert!((quality_score(&medium, &no_criteria()) - 0.3).abs() < 1e-12);
        assert!((quality_score(&short, &no_criteria()) - 0.2).abs() < 1e-12);
        assert!((quality_score(&tiny, &no_criteria()) - 0.1).abs() < 1e-12);
        assert_eq!(quality_score(&none, &no_criteria()), 0.0);
    }

    #[test]
    fn test_short_name_does_not_count() {
        // Two characters is an initial, not a name.
        let initials = profile("AS", Some(&"x".repeat(201)), None, None);
        assert!((quality_score(&initials, &no_criteria()) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_blank_attributes_do_not_count() {
        let blank = profile("Alice Smith", Some("   "), Some(" "), Some(""));
        assert!((quality_score(&blank, &no_criteria()) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_criteria_overlap_adds_relevance() {
        let criteria = CategoryCriteria {
            hard: vec!["MD degree".to_string()],
            soft: vec!["telemedicine".to_string()],
        };
        let relevant = profile("Al", Some("holds an MD degree, does telemedicine"), None, None);
        let irrelevant = profile("Al", Some("drives a forklift most weekdays"), None, None);

        let gap = quality_score(&relevant, &criteria) - quality_score(&irrelevant, &criteria);
        assert!((gap - CRITERIA_WEIGHT).abs() < 1e-12);
    }

    #[test]
    fn test_retain_quality_drops_thin_profiles() {
        let entries = vec![
            (complete(), CandidateScore::new("a")),
            (profile("X", None, None, None), CandidateScore::new("b")),
        ];
        let kept = retain_quality(entries, &no_criteria());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].0.name, "Alice Smith");
    }

    #[test]
    fn test_retain_quality_preserves_order() {
        let entries = vec![
            (profile("First Person", Some(&"x".repeat(60)), None, None), CandidateScore::new("a")),
            (complete(), CandidateScore::new("b")),
        ];
        let kept = retain_quality(entries, &no_criteria());
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].0.name, "First Person");
    }

    #[test]
    fn test_adjusted_count_tiers() {
        let high: Vec<_> = (0..6)
            .map(|i| (complete(), CandidateScore::new(format!("c{i}"))))
            .collect();
        assert_eq!(adjusted_count(&high, &no_criteria()), 10);

        assert_eq!(adjusted_count(&high[..3], &no_criteria()), 15);
        assert_eq!(adjusted_count(&high[..2], &no_criteria()), 20);
        assert_eq!(adjusted_count(&[], &no_criteria()), 20);
    }
}
