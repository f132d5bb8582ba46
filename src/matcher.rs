//! Symptom-to-disease matching and scoring.
//!
//! `score` is a pure function of the input symptom set and the knowledge
//! base: one vote per known symptom to every disease associated with it,
//! then a strategy-specific score per voted disease, ranked descending with
//! a deterministic name tie-break.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::kb::KnowledgeBase;

/// How many candidates are presented to the user.
pub const TOP_CANDIDATES: usize = 3;

/// Minimum score shown for the top candidate. Display-only: the stored
/// ranking keeps raw scores.
pub const CONFIDENCE_FLOOR: f64 = 35.0;

/// Scoring policies. Both are legitimate design points from the product's
/// history; `JaccardCoverage` is the more discriminative default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringStrategy {
    /// `votes / |disease symptoms| * 100`: rewards explaining the disease's
    /// profile, ignores unexplained user symptoms.
    Coverage,
    /// `|I|/|U| * 70 + |I|/|user| * 30`: penalizes size mismatch between the
    /// user's set and the disease's profile while rewarding recall.
    #[default]
    JaccardCoverage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub disease: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }

    pub fn guidance(self) -> &'static str {
        match self {
            Severity::Mild => "Home care recommended.",
            Severity::Moderate => "Consider seeing a doctor.",
            Severity::Severe => "Seek medical attention.",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.label(), self.guidance())
    }
}

/// Coarse urgency classification from the reported symptom count alone.
pub fn severity(symptom_count: usize) -> Severity {
    match symptom_count {
        0..=2 => Severity::Mild,
        3..=4 => Severity::Moderate,
        _ => Severity::Severe,
    }
}

/// Ranks candidate diseases for a symptom set. Symptoms unknown to the
/// knowledge base are ignored; diseases with no overlapping symptom are
/// excluded. The returned list is the full ranking, not just the top
/// presentation slice.
pub fn score(
    symptoms: &BTreeSet<String>,
    kb: &KnowledgeBase,
    strategy: ScoringStrategy,
) -> Vec<ScoredCandidate> {
    let known: Vec<&str> = symptoms
        .iter()
        .map(String::as_str)
        .filter(|symptom| kb.contains_symptom(symptom))
        .collect();
    if known.is_empty() {
        return Vec::new();
    }

    let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
    for symptom in &known {
        if let Some(diseases) = kb.diseases_with(symptom) {
            for disease in diseases {
                *votes.entry(disease.as_str()).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<ScoredCandidate> = votes
        .into_iter()
        .filter_map(|(disease, overlap)| {
            let profile = kb.symptoms_of(disease)?;
            if profile.is_empty() {
                return None;
            }
            let raw = match strategy {
                ScoringStrategy::Coverage => overlap as f64 / profile.len() as f64 * 100.0,
                ScoringStrategy::JaccardCoverage => {
                    // Every vote comes from a user symptom inside the
                    // disease profile, so the vote count is |I|.
                    let union = profile.len() + known.len() - overlap;
                    let jaccard = overlap as f64 / union as f64;
                    let coverage = overlap as f64 / known.len() as f64;
                    jaccard * 70.0 + coverage * 30.0
                }
            };
            Some(ScoredCandidate {
                disease: disease.to_string(),
                score: round_one(raw),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.disease.cmp(&b.disease))
    });
    ranked
}

/// The presentation slice of a ranking: top candidates with the confidence
/// floor applied to the first entry. Never touches the input ranking.
pub fn for_display(ranked: &[ScoredCandidate]) -> Vec<ScoredCandidate> {
    let mut out: Vec<ScoredCandidate> = ranked.iter().take(TOP_CANDIDATES).cloned().collect();
    if let Some(top) = out.first_mut()
        && top.score < CONFIDENCE_FLOOR
    {
        top.score = CONFIDENCE_FLOOR;
    }
    out
}

/// Floor correction for the top candidate's score when rendered on its own.
pub fn display_top_score(score: f64) -> f64 {
    if score < CONFIDENCE_FLOOR {
        CONFIDENCE_FLOOR
    } else {
        score
    }
}

fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
