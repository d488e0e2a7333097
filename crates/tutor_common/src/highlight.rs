//! Answer post-processing: term highlighting.
//!
//! Wraps whole-word, case-insensitive occurrences of high-value terms in a
//! lightweight inline marker (`[[term]]`) the renderer understands. The
//! transform is deterministic and idempotent: spans already inside markers
//! are never touched, so running it on its own output is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

/// Terms shorter than this are never highlighted (common short words would
/// drown the answer in markers).
const MIN_TERM_CHARS: usize = 3;

/// Matches existing `[[...]]` spans so they are carried through untouched.
static MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[[^\[\]]*\]\]").expect("marker pattern"));

/// Highlight every candidate term in `answer`. Longest terms are applied
/// first so a multi-word term is never shadowed by one of its substrings.
/// Safe on an empty term list.
pub fn highlight_terms(answer: &str, terms: &[String]) -> String {
    let mut candidates: Vec<&str> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| t.chars().count() >= MIN_TERM_CHARS)
        .collect();
    if candidates.is_empty() {
        return answer.to_string();
    }
    candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    candidates.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

    let mut out = answer.to_string();
    for term in candidates {
        out = wrap_term(&out, term);
    }
    out
}

/// Wrap one term everywhere outside existing `[[...]]` markers.
fn wrap_term(text: &str, term: &str) -> String {
    let term_re = match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))) {
        Ok(re) => re,
        // An unbuildable pattern (e.g. a term that is pure punctuation after
        // escaping) just means "skip this term".
        Err(_) => return text.to_string(),
    };

    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for m in MARKER_PATTERN.find_iter(text) {
        out.push_str(&wrap_outside(&text[last..m.start()], &term_re));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&wrap_outside(&text[last..], &term_re));
    out
}

fn wrap_outside(segment: &str, term_re: &Regex) -> String {
    term_re
        .replace_all(segment, |caps: &regex::Captures| {
            format!("[[{}]]", &caps[0])
        })
        .into_owned()
}
