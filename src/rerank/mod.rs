//! LLM rerank pass.
//!
//! The model sees a digest of the top candidates and answers with an id
//! ordering. The response is advisory: ids we never sent are ignored, ids
//! the model forgot keep their relative order after the ones it ranked, and
//! a malformed response leaves the ranking untouched. The pass can therefore
//! reorder results but never add, drop, or invent candidates.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::CategoryCatalog;
use crate::llm_client::{LlmClient, Message};
use crate::profiles::{CandidateProfile, CandidateScore};
use crate::prompts;

/// Most candidates ever sent to the model in one rerank call; keeps the
/// prompt well inside context limits.
pub const MAX_RERANK_CANDIDATES: usize = 25;

type Entries = Vec<(CandidateProfile, CandidateScore)>;

/// Reorders ranked candidates with one LLM call.
pub struct Reranker<L> {
    llm: Arc<L>,
    catalog: Arc<CategoryCatalog>,
}

impl<L: LlmClient> Reranker<L> {
    pub fn new(llm: Arc<L>, catalog: Arc<CategoryCatalog>) -> Self {
        Self { llm, catalog }
    }

    /// Rerank `entries` for `category`. Returns the (possibly reordered)
    /// entries and whether the model's ordering was actually applied.
    ///
    /// Only the first [`MAX_RERANK_CANDIDATES`] entries are offered to the
    /// model; anything past that keeps its position after them.
    pub async fn rerank(&self, category: &str, entries: Entries) -> (Entries, bool) {
        if entries.len() < 2 || !self.llm.is_available() {
            return (entries, false);
        }

        let head_len = entries.len().min(MAX_RERANK_CANDIDATES);
        let criteria = self.catalog.criteria(category);
        let digest: Vec<&CandidateProfile> =
            entries[..head_len].iter().map(|(p, _)| p).collect();

        let messages = [
            Message::system(prompts::RERANK_SYSTEM),
            Message::user(prompts::rerank_prompt(category, &criteria, &digest)),
        ];

        let response = match self.llm.generate(&messages).await {
            Ok(response) => response,
            Err(e) => {
                warn!(category, error = %e, "rerank call failed, keeping score order");
                return (entries, false);
            }
        };

        match parse_id_order(&response) {
            Some(order) => {
                let reordered = apply_order(entries, head_len, &order);
                debug!(category, ranked = order.len(), "rerank applied");
                (reordered, true)
            }
            None => {
                warn!(category, "unparseable rerank response, keeping score order");
                (entries, false)
            }
        }
    }
}

/// Parse the model response into an id list, tolerating markdown wrapping.
fn parse_id_order(response: &str) -> Option<Vec<String>> {
    let payload = crate::utils::extract_json_from_response(response)?;
    serde_json::from_str::<Vec<String>>(payload).ok()
}

/// Reorder the first `head_len` entries by `order`; unknown ids are skipped,
/// unranked head entries follow in their original order, and the tail is
/// appended untouched.
fn apply_order(entries: Entries, head_len: usize, order: &[String]) -> Entries {
    let mut entries = entries;
    let tail = entries.split_off(head_len);

    let mut reordered: Entries = Vec::with_capacity(head_len + tail.len());

    // Placed entries leave the pool, so a duplicate id in the answer simply
    // finds nothing the second time.
    for id in order {
        if let Some(pos) = entries.iter().position(|(p, _)| &p.id == id) {
            reordered.push(entries.remove(pos));
        }
    }

    reordered.extend(entries);
    reordered.extend(tail);
    reordered
}
