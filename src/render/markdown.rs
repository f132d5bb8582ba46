use std::collections::BTreeSet;
use std::sync::OnceLock;

use minijinja::{Environment, context};

use crate::error::CheckError;
use crate::kb::{self, KnowledgeBase};
use crate::matcher::{ScoredCandidate, Severity};

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(serde::Serialize)]
struct CandidateRow {
    disease: String,
    score: f64,
    description: String,
}

fn env() -> Result<&'static Environment<'static>, CheckError> {
    if let Some(env) = ENV.get() {
        return Ok(env);
    }

    let mut env = Environment::new();
    env.add_filter("truncate", |s: String, max_bytes: usize| -> String {
        if s.len() <= max_bytes {
            return s;
        }
        if max_bytes == 0 {
            return "…".to_string();
        }
        let mut boundary = max_bytes;
        while boundary > 0 && !s.is_char_boundary(boundary) {
            boundary -= 1;
        }
        let mut out = s[..boundary].trim_end().to_string();
        out.push('…');
        out
    });
    env.add_filter("pct", |v: f64| -> String { format!("{v:.1}") });
    env.add_template("analysis.md.j2", include_str!("../../templates/analysis.md.j2"))?;
    env.add_template(
        "chat_summary.md.j2",
        include_str!("../../templates/chat_summary.md.j2"),
    )?;
    env.add_template("disease.md.j2", include_str!("../../templates/disease.md.j2"))?;

    Ok(ENV.get_or_init(|| env))
}

fn candidate_rows(kb: &KnowledgeBase, candidates: &[ScoredCandidate]) -> Vec<CandidateRow> {
    candidates
        .iter()
        .map(|candidate| CandidateRow {
            disease: candidate.disease.clone(),
            score: candidate.score,
            description: kb.description(&candidate.disease).to_string(),
        })
        .collect()
}

fn symptom_labels(symptoms: &BTreeSet<String>) -> Vec<String> {
    symptoms
        .iter()
        .map(|symptom| kb::symptom_label(symptom))
        .collect()
}

/// Full analysis report for the one-shot analyze surface.
pub(crate) fn analysis(
    kb: &KnowledgeBase,
    symptoms: &BTreeSet<String>,
    candidates: &[ScoredCandidate],
    severity: Severity,
) -> Result<String, CheckError> {
    let template = env()?.get_template("analysis.md.j2")?;
    Ok(template.render(context! {
        symptoms => symptom_labels(symptoms),
        candidates => candidate_rows(kb, candidates),
        severity => severity.to_string(),
    })?)
}

/// Conversational summary of a diagnosis, used for chat turns.
pub(crate) fn chat_summary(
    kb: &KnowledgeBase,
    symptoms: &BTreeSet<String>,
    candidates: &[ScoredCandidate],
) -> Result<String, CheckError> {
    let template = env()?.get_template("chat_summary.md.j2")?;
    Ok(template.render(context! {
        symptoms => symptom_labels(symptoms),
        candidates => candidate_rows(kb, candidates),
    })?)
}

/// Everything known about one disease.
pub(crate) fn disease_info(kb: &KnowledgeBase, name: &str) -> Result<String, CheckError> {
    let template = env()?.get_template("disease.md.j2")?;
    let symptoms: Vec<String> = kb
        .symptoms_of(name)
        .map(|set| set.iter().map(|s| kb::symptom_label(s)).collect())
        .unwrap_or_default();
    Ok(template.render(context! {
        name => name,
        description => kb.description(name),
        symptoms => symptoms,
    })?)
}
