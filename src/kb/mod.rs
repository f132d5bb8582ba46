//! Disease/symptom knowledge base: the read-only mappings consumed by the
//! matcher and the assistant.

pub mod loader;

use std::collections::{BTreeMap, BTreeSet};

/// Placeholder shown when a disease has no curated description.
pub const NO_DESCRIPTION: &str = "No description available.";

const CLOSE_MATCH_CUTOFF: f64 = 0.5;
const CLOSE_MATCH_LIMIT: usize = 5;
const MIN_SUBSTRING_HITS: usize = 3;

/// Normalizes a disease name to its canonical title-case form.
pub fn normalize_disease(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a symptom name to its canonical lowercase, underscore-joined form.
pub fn normalize_symptom(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Human-readable rendering of a canonical symptom name.
pub fn symptom_label(symptom: &str) -> String {
    symptom.replace('_', " ")
}

/// The four mappings behind every diagnosis: disease→symptoms, its inverse,
/// disease→description, and disease→precautions. Ordered maps keep listing
/// and ranking tie-breaks deterministic. Built once at startup, read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    disease_symptoms: BTreeMap<String, BTreeSet<String>>,
    symptom_diseases: BTreeMap<String, BTreeSet<String>>,
    descriptions: BTreeMap<String, String>,
    precautions: BTreeMap<String, Vec<String>>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one disease↔symptom association, keeping both directions of
    /// the mapping in sync. Blank names are ignored.
    pub fn add_association(&mut self, disease: &str, symptom: &str) {
        let disease = normalize_disease(disease);
        let symptom = normalize_symptom(symptom);
        if disease.is_empty() || symptom.is_empty() {
            return;
        }
        self.disease_symptoms
            .entry(disease.clone())
            .or_default()
            .insert(symptom.clone());
        self.symptom_diseases
            .entry(symptom)
            .or_default()
            .insert(disease);
    }

    pub fn set_description(&mut self, disease: &str, description: &str) {
        let disease = normalize_disease(disease);
        let description = description.trim();
        if disease.is_empty() || description.is_empty() {
            return;
        }
        self.descriptions.insert(disease, description.to_string());
    }

    pub fn set_precautions(&mut self, disease: &str, precautions: Vec<String>) {
        let disease = normalize_disease(disease);
        if disease.is_empty() || precautions.is_empty() {
            return;
        }
        self.precautions.insert(disease, precautions);
    }

    pub fn diseases(&self) -> impl Iterator<Item = &str> {
        self.disease_symptoms.keys().map(String::as_str)
    }

    pub fn symptoms(&self) -> impl Iterator<Item = &str> {
        self.symptom_diseases.keys().map(String::as_str)
    }

    pub fn symptoms_of(&self, disease: &str) -> Option<&BTreeSet<String>> {
        self.disease_symptoms.get(disease)
    }

    pub fn diseases_with(&self, symptom: &str) -> Option<&BTreeSet<String>> {
        self.symptom_diseases.get(symptom)
    }

    pub fn contains_symptom(&self, symptom: &str) -> bool {
        self.symptom_diseases.contains_key(symptom)
    }

    /// Description for a disease, falling back to a placeholder.
    pub fn description(&self, disease: &str) -> &str {
        self.descriptions
            .get(disease)
            .map(String::as_str)
            .unwrap_or(NO_DESCRIPTION)
    }

    /// Curated precautions for a disease; empty when none are known.
    pub fn precautions(&self, disease: &str) -> &[String] {
        self.precautions
            .get(disease)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn disease_count(&self) -> usize {
        self.disease_symptoms.len()
    }

    pub fn symptom_count(&self) -> usize {
        self.symptom_diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disease_symptoms.is_empty()
    }

    fn disease_names(&self) -> impl Iterator<Item = &str> {
        self.disease_symptoms.keys().map(String::as_str).chain(
            self.descriptions
                .keys()
                .filter(|name| !self.disease_symptoms.contains_key(*name))
                .map(String::as_str),
        )
    }

    /// Resolves a user-supplied disease query against known disease names:
    /// exact case-insensitive match first, then whole-word containment so
    /// "flu" finds "Bird Flu" but never "Acid Reflux".
    pub fn resolve_disease(&self, query: &str) -> Option<&str> {
        let needle = query.trim();
        if needle.is_empty() {
            return None;
        }

        if let Some(name) = self
            .disease_names()
            .find(|name| name.eq_ignore_ascii_case(needle))
        {
            return Some(name);
        }

        let needle_words: Vec<String> =
            needle.split_whitespace().map(str::to_lowercase).collect();
        if needle_words.is_empty() {
            return None;
        }
        self.disease_names().find(|name| {
            let words: Vec<String> = name.split_whitespace().map(str::to_lowercase).collect();
            words.len() >= needle_words.len()
                && words
                    .windows(needle_words.len())
                    .any(|window| window == needle_words.as_slice())
        })
    }

    /// Symptom search used by the list surface: substring hits, topped up
    /// with close fuzzy matches when fewer than three names contain the term.
    pub fn search_symptoms(&self, query: &str) -> Vec<String> {
        let needle = normalize_symptom(query);
        if needle.is_empty() {
            return self.symptoms().map(str::to_string).collect();
        }

        let mut hits: Vec<String> = self
            .symptoms()
            .filter(|name| name.contains(&needle))
            .map(str::to_string)
            .collect();

        if hits.len() < MIN_SUBSTRING_HITS {
            let mut close: Vec<(f64, &str)> = self
                .symptoms()
                .map(|name| (strsim::normalized_levenshtein(&needle, name), name))
                .filter(|(similarity, _)| *similarity >= CLOSE_MATCH_CUTOFF)
                .collect();
            close.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
            for (_, name) in close.into_iter().take(CLOSE_MATCH_LIMIT) {
                if !hits.iter().any(|hit| hit == name) {
                    hits.push(name.to_string());
                }
            }
            hits.sort();
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.add_association("bird flu", "fever");
        kb.add_association("bird flu", "Sore Throat");
        kb.add_association("acid reflux", "heartburn");
        kb.add_association("acid reflux", "chest pain");
        kb.set_description("bird flu", "An avian influenza infection.");
        kb.set_precautions("bird flu", vec!["Rest".to_string(), "Hydrate".to_string()]);
        kb
    }

    #[test]
    fn normalization_produces_canonical_forms() {
        assert_eq!(normalize_disease("  bird   flu "), "Bird Flu");
        assert_eq!(normalize_disease("INFLUENZA"), "Influenza");
        assert_eq!(normalize_symptom(" Sore  Throat "), "sore_throat");
        assert_eq!(symptom_label("sore_throat"), "sore throat");
    }

    #[test]
    fn association_maps_stay_inverse_of_each_other() {
        let kb = sample_kb();
        for disease in kb.diseases() {
            for symptom in kb.symptoms_of(disease).expect("symptom set") {
                assert!(
                    kb.diseases_with(symptom)
                        .is_some_and(|set| set.contains(disease)),
                    "symptom {symptom} should map back to {disease}"
                );
            }
        }
        for symptom in kb.symptoms() {
            for disease in kb.diseases_with(symptom).expect("disease set") {
                assert!(
                    kb.symptoms_of(disease)
                        .is_some_and(|set| set.contains(symptom)),
                    "disease {disease} should map back to {symptom}"
                );
            }
        }
    }

    #[test]
    fn missing_description_and_precautions_fall_back_to_defaults() {
        let kb = sample_kb();
        assert_eq!(kb.description("Acid Reflux"), NO_DESCRIPTION);
        assert!(kb.precautions("Acid Reflux").is_empty());
        assert_eq!(kb.description("Bird Flu"), "An avian influenza infection.");
        assert_eq!(kb.precautions("Bird Flu").len(), 2);
    }

    #[test]
    fn resolve_disease_prefers_exact_match() {
        let kb = sample_kb();
        assert_eq!(kb.resolve_disease("acid reflux"), Some("Acid Reflux"));
        assert_eq!(kb.resolve_disease("BIRD FLU"), Some("Bird Flu"));
    }

    #[test]
    fn resolve_disease_matches_whole_words_only() {
        let kb = sample_kb();
        assert_eq!(kb.resolve_disease("flu"), Some("Bird Flu"));
        assert_eq!(kb.resolve_disease("reflux"), Some("Acid Reflux"));
        assert_eq!(kb.resolve_disease("lux"), None);
        assert_eq!(kb.resolve_disease(""), None);
    }

    #[test]
    fn resolve_disease_covers_description_only_entries() {
        let mut kb = sample_kb();
        kb.set_description("rare syndrome", "Documented but without symptom rows.");
        assert_eq!(kb.resolve_disease("rare syndrome"), Some("Rare Syndrome"));
    }

    #[test]
    fn search_symptoms_adds_close_matches_for_typos() {
        let mut kb = KnowledgeBase::new();
        kb.add_association("Migraine", "headache");
        kb.add_association("Migraine", "nausea");
        kb.add_association("Flu", "fever");

        let hits = kb.search_symptoms("hedache");
        assert!(hits.contains(&"headache".to_string()));

        let direct = kb.search_symptoms("head");
        assert!(direct.contains(&"headache".to_string()));
    }
}
