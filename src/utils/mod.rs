//! Shared utilities.
//!
//! Includes:
//! - String normalization and truncation helpers
//! - Defensive JSON extraction from LLM responses
//! - Keyword sanitization for the full-text index
//! - Concurrency helpers (semaphore-bounded fan-out with a deadline)

pub mod concurrency;
pub mod text;

pub use concurrency::bounded_join_all;
pub use text::{
    extract_json_from_response, normalize_whitespace, sanitize_keyword, truncate_with_ellipsis,
};
