//! Text processing utilities.

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("static regex is valid"))
}

/// Collapse consecutive whitespace to a single space and trim the ends.
/// Used when building candidate digests for rerank prompts.
pub fn normalize_whitespace(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    whitespace_re().replace_all(s, " ").trim().to_string()
}

/// Truncate `s` to at most `max_len` Unicode scalar values, appending `"..."`
/// when truncation occurred. Counts characters, not bytes, so multi-byte
/// summaries truncate cleanly.
///
/// `max_len == 0` yields an empty string; `max_len <= 3` yields that many dots.
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }

    let char_count = s.chars().count();
    if char_count <= max_len {
        return s.to_string();
    }

    if max_len <= 3 {
        return ".".repeat(max_len);
    }

    let keep_chars = max_len - 3;
    let byte_offset = s
        .char_indices()
        .nth(keep_chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    format!("{}...", &s[..byte_offset])
}

/// Extract the first JSON object or array from a potentially markdown-wrapped
/// LLM response.
///
/// Tries, in order:
/// 1. ` ```json ... ``` ` fenced code block
/// 2. ` ``` ... ``` ` fenced code block
/// 3. Bare `{...}` or `[...]` delimited by the first `{`/`[` and last `}`/`]`
///
/// Returns `None` if no JSON-like content is found. The caller still has to
/// parse the slice; models wrap otherwise-valid JSON in prose often enough
/// that this pre-pass pays for itself.
pub fn extract_json_from_response(s: &str) -> Option<&str> {
    if let Some(inner) = extract_fenced_block(s, "```json") {
        return Some(inner);
    }

    if let Some(inner) = extract_fenced_block(s, "```") {
        return Some(inner);
    }

    // Prefer whichever bare delimiter appears first so an array answer
    // containing object elements is not mis-sliced at the inner `{`.
    let obj_start = s.find('{');
    let arr_start = s.find('[');

    match (obj_start, arr_start) {
        (Some(o), Some(a)) if a < o => slice_delimited(s, a, ']'),
        (Some(o), _) => {
            slice_delimited(s, o, '}').or_else(|| arr_start.and_then(|a| slice_delimited(s, a, ']')))
        }
        (None, Some(a)) => slice_delimited(s, a, ']'),
        (None, None) => None,
    }
}

fn slice_delimited(s: &str, start: usize, close: char) -> Option<&str> {
    let end = s.rfind(close)?;
    if end > start {
        Some(&s[start..=end])
    } else {
        None
    }
}

/// Extract content inside a fenced code block starting with `fence`.
fn extract_fenced_block<'a>(s: &'a str, fence: &str) -> Option<&'a str> {
    let start = s.find(fence)?;
    let after_fence = start + fence.len();

    let newline = s[after_fence..].find('\n')?;
    let content_start = after_fence + newline + 1;

    let close = s[content_start..].find("```")?;
    let content = s[content_start..content_start + close].trim();

    if content.is_empty() {
        return None;
    }

    Some(content)
}

/// Escape Lucene special characters in a keyword before it reaches the
/// BM25 index query. Escapes `+ - ! ( ) { } [ ] ^ " ~ * ? : \ /` and the
/// two-char operators `&&` and `||`.
pub fn sanitize_keyword(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    const SPECIAL: &[char] = &[
        '+', '-', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '/',
    ];

    let mut result = String::with_capacity(s.len() * 2);
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if i + 1 < chars.len() {
            if chars[i] == '&' && chars[i + 1] == '&' {
                result.push_str("\\&&");
                i += 2;
                continue;
            }
            if chars[i] == '|' && chars[i + 1] == '|' {
                result.push_str("\\||");
                i += 2;
                continue;
            }
        }

        let c = chars[i];
        if SPECIAL.contains(&c) {
            result.push('\\');
        }
        result.push(c);
        i += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- normalize_whitespace ---

    #[test]
    fn test_normalize_whitespace_collapses_runs() {
        assert_eq!(
            normalize_whitespace("senior   tax\t\tattorney"),
            "senior tax attorney"
        );
        assert_eq!(normalize_whitespace("  MD\nphysician  "), "MD physician");
    }

    #[test]
    fn test_normalize_whitespace_empty_and_blank() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace("  \t\n "), "");
    }

    // --- truncate_with_ellipsis ---

    #[test]
    fn test_truncate_basic() {
        assert_eq!(truncate_with_ellipsis("hello world", 8), "hello...");
        assert_eq!(truncate_with_ellipsis("hi", 10), "hi");
    }

    #[test]
    fn test_truncate_multibyte_summary() {
        let s = "你好世界测试";
        assert_eq!(truncate_with_ellipsis(s, 5), "你好...");
    }

    #[test]
    fn test_truncate_degenerate_lengths() {
        assert_eq!(truncate_with_ellipsis("hello", 0), "");
        assert_eq!(truncate_with_ellipsis("hello", 2), "..");
        assert_eq!(truncate_with_ellipsis("hello", 3), "...");
    }

    // --- extract_json_from_response ---

    #[test]
    fn test_extract_json_fenced() {
        let s = "Ranked candidates:\n```json\n[\"a\", \"b\"]\n```\nDone.";
        assert_eq!(extract_json_from_response(s), Some("[\"a\", \"b\"]"));
    }

    #[test]
    fn test_extract_json_plain_fence() {
        let s = "```\n{\"must_have\": []}\n```";
        assert_eq!(extract_json_from_response(s), Some("{\"must_have\": []}"));
    }

    #[test]
    fn test_extract_json_bare_array_of_objects() {
        let s = "Here you go: [{\"id\": \"x\"}] — hope that helps";
        assert_eq!(extract_json_from_response(s), Some("[{\"id\": \"x\"}]"));
    }

    #[test]
    fn test_extract_json_bare_object() {
        let s = "The filters are {\"exclude\": [\"intern\"]}.";
        assert_eq!(
            extract_json_from_response(s),
            Some("{\"exclude\": [\"intern\"]}")
        );
    }

    #[test]
    fn test_extract_json_none_for_prose() {
        assert_eq!(
            extract_json_from_response("I cannot rank these candidates."),
            None
        );
        assert_eq!(extract_json_from_response(""), None);
    }

    // --- sanitize_keyword ---

    #[test]
    fn test_sanitize_keyword_passthrough() {
        assert_eq!(sanitize_keyword("radiologist"), "radiologist");
        assert_eq!(sanitize_keyword(""), "");
    }

    #[test]
    fn test_sanitize_keyword_escapes_specials() {
        assert_eq!(sanitize_keyword("M&A"), "M&A");
        assert_eq!(sanitize_keyword("C++"), "C\\+\\+");
        assert_eq!(sanitize_keyword("a:b"), "a\\:b");
        assert_eq!(sanitize_keyword("(GP)"), "\\(GP\\)");
    }

    #[test]
    fn test_sanitize_keyword_two_char_operators() {
        assert_eq!(sanitize_keyword("a&&b"), "a\\&&b");
        assert_eq!(sanitize_keyword("a||b"), "a\\||b");
    }
}
