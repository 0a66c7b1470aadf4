//! Prompt construction for the LLM-assisted stages.
//!
//! Every prompt here instructs the model to answer with bare JSON so the
//! defensive parsers in [`crate::utils::text`] can recover the payload even
//! when the model wraps it in markdown fences or prose.
//!
//! Prompts are stored as Rust string literals (not external files) for
//! compile-time inclusion and zero-cost access.

use crate::catalog::CategoryCriteria;
use crate::profiles::CandidateProfile;
use crate::utils::{normalize_whitespace, truncate_with_ellipsis};

/// Maximum summary length included per candidate in the rerank digest.
/// Keeps the prompt within budget for a few dozen candidates.
const DIGEST_SUMMARY_CHARS: usize = 400;

/// System message for the rerank stage.
pub const RERANK_SYSTEM: &str = "You are an expert technical recruiter. You rank candidates by how \
     well their profile matches a hiring category. Respond ONLY with a JSON \
     array of candidate ids, best match first. No commentary, no markdown.";

/// System message for query expansion.
pub const QUERY_EXPANSION_SYSTEM: &str = "You are a search specialist who rewrites hiring queries into diverse \
     semantic variants. Respond ONLY with a JSON array of strings.";

/// System message for filter extraction.
pub const FILTER_EXTRACTION_SYSTEM: &str = "You extract screening criteria from a hiring category description. \
     Respond ONLY with the requested JSON object.";

/// Build the user message for the rerank stage: the category, its criteria,
/// and a numbered digest of each candidate.
pub fn rerank_prompt(
    category: &str,
    criteria: &CategoryCriteria,
    candidates: &[&CandidateProfile],
) -> String {
    let mut digest = String::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let summary = match candidate.summary.as_deref() {
            Some(summary) => normalize_whitespace(summary),
            None => "(no summary)".to_string(),
        };
        digest.push_str(&format!(
            "{}. id={} name={} location={}\n   {}\n",
            i + 1,
            candidate.id,
            candidate.name,
            candidate.location.as_deref().unwrap_or("unknown"),
            truncate_with_ellipsis(&summary, DIGEST_SUMMARY_CHARS),
        ));
    }

    format!(
        "Hiring category: {category}\n\n\
         Hard requirements (candidates missing these should rank last):\n{}\n\n\
         Preferred qualifications (break ties in favour of these):\n{}\n\n\
         Candidates:\n{digest}\n\
         Return a JSON array containing every candidate id above, ordered \
         from best to worst fit.",
        bullet_list(&criteria.hard),
        bullet_list(&criteria.soft),
    )
}

/// Build the user message for query expansion: ask for `count` alternative
/// phrasings of the search intent.
pub fn query_expansion_prompt(category: &str, query_text: &str, count: usize) -> String {
    format!(
        "Hiring category: {category}\n\
         Base query: {query_text}\n\n\
         Write {count} alternative search queries that capture the same \
         hiring intent with different vocabulary (synonyms, related job \
         titles, credentials, domain jargon). Return a JSON array of \
         {count} strings."
    )
}

/// Build the user message for filter extraction.
pub fn filter_extraction_prompt(category: &str) -> String {
    format!(
        "Hiring category: {category}\n\n\
         Extract screening terms for this category as a JSON object with \
         three string-array fields:\n\
         - \"must_have\": terms a matching profile must contain\n\
         - \"exclude\": terms that disqualify a profile\n\
         - \"preferred\": terms that make a profile stronger but are not \
         required\n\
         Keep each list short (at most 5 terms) and use lowercase."
    )
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, name: &str, summary: &str) -> CandidateProfile {
        CandidateProfile {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            location: Some("Chicago".to_string()),
            summary: Some(summary.to_string()),
        }
    }

    #[test]
    fn test_rerank_prompt_lists_every_candidate() {
        let criteria = CategoryCriteria {
            hard: vec!["JD degree".to_string()],
            soft: vec!["big law experience".to_string()],
        };
        let a = candidate("c1", "Alice", "Tax attorney, 8 years at a big four");
        let b = candidate("c2", "Bob", "Corporate associate");
        let prompt = rerank_prompt("tax lawyer", &criteria, &[&a, &b]);

        assert!(prompt.contains("id=c1"));
        assert!(prompt.contains("id=c2"));
        assert!(prompt.contains("JD degree"));
        assert!(prompt.contains("big law experience"));
    }

    #[test]
    fn test_rerank_prompt_truncates_long_summaries() {
        let criteria = CategoryCriteria::default();
        let long = candidate("c1", "Alice", &"x".repeat(2000));
        let prompt = rerank_prompt("radiology", &criteria, &[&long]);
        assert!(!prompt.contains(&"x".repeat(500)));
    }

    #[test]
    fn test_rerank_prompt_handles_missing_summary() {
        let criteria = CategoryCriteria::default();
        let bare = CandidateProfile {
            id: "c9".to_string(),
            name: "Dana".to_string(),
            email: None,
            location: None,
            summary: None,
        };
        let prompt = rerank_prompt("bankers", &criteria, &[&bare]);
        assert!(prompt.contains("(no summary)"));
        assert!(prompt.contains("location=unknown"));
    }

    #[test]
    fn test_query_expansion_prompt_mentions_count() {
        let prompt = query_expansion_prompt("mathematics_phd", "PhD mathematician", 4);
        assert!(prompt.contains("4 alternative"));
        assert!(prompt.contains("PhD mathematician"));
    }

    #[test]
    fn test_filter_extraction_prompt_names_all_fields() {
        let prompt = filter_extraction_prompt("doctors_md");
        assert!(prompt.contains("must_have"));
        assert!(prompt.contains("exclude"));
        assert!(prompt.contains("preferred"));
    }
}
