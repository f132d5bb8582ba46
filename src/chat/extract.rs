//! Symptom extraction from free text: slang normalization, direct substring
//! matching against known symptoms, and typo-tolerant fuzzy token matching.

use std::collections::BTreeSet;

use crate::kb::{self, KnowledgeBase};

/// Minimum normalized edit-distance similarity for a token to count as a
/// typo of a known symptom. Tunable for tests.
pub const SIMILARITY_CUTOFF: f64 = 0.85;

// Longer phrases first, so "tummy ache" wins over "tummy".
const SLANG: &[(&str, &str)] = &[
    ("tummy ache", "stomach pain"),
    ("belly ache", "stomach pain"),
    ("tummy", "stomach"),
    ("throwing up", "vomiting"),
    ("threw up", "vomiting"),
    ("puking", "vomiting"),
    ("can't sleep", "insomnia"),
    ("cant sleep", "insomnia"),
    ("feeling sick", "nausea"),
    ("feel sick", "nausea"),
    ("the runs", "diarrhea"),
    ("high temperature", "fever"),
    ("head is pounding", "headache"),
];

/// Rewrites colloquial phrasing into the vocabulary the knowledge base uses.
pub(crate) fn normalize_slang(text: &str) -> String {
    let mut out = text.to_lowercase();
    for (slang, canonical) in SLANG {
        if out.contains(slang) {
            out = out.replace(slang, canonical);
        }
    }
    out
}

/// Returns every known symptom mentioned in `text`, matched directly or via
/// fuzzy token similarity.
pub(crate) fn extract(text: &str, kb: &KnowledgeBase) -> BTreeSet<String> {
    let text = normalize_slang(text);
    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .collect();

    let mut found = BTreeSet::new();
    for symptom in kb.symptoms() {
        let readable = kb::symptom_label(symptom);
        if text.contains(&readable) || text.contains(symptom) {
            found.insert(symptom.to_string());
            continue;
        }
        if tokens
            .iter()
            .any(|token| strsim::normalized_levenshtein(token, &readable) >= SIMILARITY_CUTOFF)
        {
            found.insert(symptom.to_string());
        }
    }
    found
}
