//! Command-line surface: argument definitions and one-shot command dispatch.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;

use crate::chat;
use crate::error::CheckError;
use crate::kb::{self, KnowledgeBase, loader};
use crate::matcher::{self, ScoredCandidate, ScoringStrategy};
use crate::render;

#[derive(Debug, Parser)]
#[command(
    name = "symcheck",
    version,
    about = "Symptom triage and assistant CLI"
)]
pub struct Cli {
    /// Directory containing the knowledge-base CSV files.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank candidate conditions for a set of symptoms.
    Analyze {
        /// Symptom to include; repeat the flag for more.
        #[arg(short = 's', long = "symptom", value_name = "NAME")]
        symptoms: Vec<String>,
        #[arg(long, value_enum, default_value_t)]
        strategy: StrategyArg,
        /// Emit JSON instead of markdown.
        #[arg(long)]
        json: bool,
    },
    /// Chat with the assistant, optionally pre-seeding a diagnosis.
    Chat {
        /// Symptom to pre-seed the diagnosis context with; repeatable.
        #[arg(short = 's', long = "symptom", value_name = "NAME")]
        symptoms: Vec<String>,
        #[arg(long, value_enum, default_value_t)]
        strategy: StrategyArg,
    },
    /// Show what is known about a condition.
    Disease {
        /// Condition name or a common alias (e.g. "flu").
        name: String,
        /// Emit JSON instead of markdown.
        #[arg(long)]
        json: bool,
    },
    /// List known symptoms, optionally filtered.
    Symptoms {
        /// Filter term; close matches are included when few names contain it.
        #[arg(long, value_name = "TERM")]
        query: Option<String>,
        /// Emit JSON instead of markdown.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum StrategyArg {
    /// Fraction of the disease's symptom profile that was reported.
    Coverage,
    /// Jaccard overlap blended with reported-symptom coverage.
    #[default]
    Jaccard,
}

impl From<StrategyArg> for ScoringStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Coverage => ScoringStrategy::Coverage,
            StrategyArg::Jaccard => ScoringStrategy::JaccardCoverage,
        }
    }
}

#[derive(Serialize)]
struct AnalysisReport {
    symptoms: Vec<String>,
    severity: String,
    candidates: Vec<ScoredCandidate>,
}

#[derive(Serialize)]
struct DiseaseReport<'a> {
    name: &'a str,
    description: &'a str,
    symptoms: Vec<String>,
    precautions: &'a [String],
}

/// Runs a one-shot command and returns its display output. The interactive
/// chat command is dispatched by the binary itself.
pub fn run(cli: Cli) -> anyhow::Result<String> {
    let kb = loader::load_default(cli.data_dir);
    match cli.command {
        Commands::Analyze {
            symptoms,
            strategy,
            json,
        } => analyze(&kb, &symptoms, strategy.into(), json),
        Commands::Disease { name, json } => disease(&kb, &name, json),
        Commands::Symptoms { query, json } => list_symptoms(&kb, query.as_deref(), json),
        Commands::Chat { .. } => Err(CheckError::InvalidArgument(
            "chat is interactive; run `symcheck chat` directly from a terminal".to_string(),
        )
        .into()),
    }
}

/// Normalizes raw symptom arguments against the knowledge base, reporting
/// which inputs were unknown.
pub fn select_symptoms(kb: &KnowledgeBase, raw: &[String]) -> (BTreeSet<String>, Vec<String>) {
    let mut known = BTreeSet::new();
    let mut unknown = Vec::new();
    for name in raw {
        let symptom = kb::normalize_symptom(name);
        if kb.contains_symptom(&symptom) {
            known.insert(symptom);
        } else if !symptom.is_empty() {
            unknown.push(name.clone());
        }
    }
    (known, unknown)
}

fn analyze(
    kb: &KnowledgeBase,
    raw: &[String],
    strategy: ScoringStrategy,
    json: bool,
) -> anyhow::Result<String> {
    if raw.is_empty() {
        return Err(CheckError::InvalidArgument(
            "at least one symptom is required. Example: symcheck analyze -s fever -s cough"
                .to_string(),
        )
        .into());
    }

    let (known, unknown) = select_symptoms(kb, raw);
    if !unknown.is_empty() {
        debug!("ignoring unknown symptoms: {}", unknown.join(", "));
    }

    let ranked = matcher::score(&known, kb, strategy);
    if ranked.is_empty() {
        return Ok(
            "No matching conditions found for the given symptoms. Try `symcheck symptoms` \
             to see what is known."
                .to_string(),
        );
    }

    let severity = matcher::severity(known.len());
    let display = matcher::for_display(&ranked);

    if json {
        let report = AnalysisReport {
            symptoms: known.iter().cloned().collect(),
            severity: severity.label().to_string(),
            candidates: display,
        };
        return Ok(render::json::to_pretty(&report)?);
    }
    Ok(render::markdown::analysis(kb, &known, &display, severity)?)
}

fn disease(kb: &KnowledgeBase, name: &str, json: bool) -> anyhow::Result<String> {
    let Some(canonical) = chat::resolve_condition(kb, name) else {
        return Err(CheckError::NotFound {
            entity: "disease".to_string(),
            id: name.to_string(),
            suggestion: "Try `symcheck symptoms --query <term>`, or ask about common \
                         conditions like flu or migraine."
                .to_string(),
        }
        .into());
    };

    if json {
        let symptoms: Vec<String> = kb
            .symptoms_of(canonical)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        let report = DiseaseReport {
            name: canonical,
            description: kb.description(canonical),
            symptoms,
            precautions: kb.precautions(canonical),
        };
        return Ok(render::json::to_pretty(&report)?);
    }
    Ok(render::markdown::disease_info(kb, canonical)?)
}

fn list_symptoms(kb: &KnowledgeBase, query: Option<&str>, json: bool) -> anyhow::Result<String> {
    let names = match query {
        Some(term) => kb.search_symptoms(term),
        None => kb.symptoms().map(str::to_string).collect(),
    };

    if json {
        return Ok(render::json::to_pretty(&names)?);
    }

    if names.is_empty() {
        return Ok(format!(
            "No symptoms matched '{}'.",
            query.unwrap_or_default()
        ));
    }

    let mut out = format!("# Known Symptoms ({})\n\n", names.len());
    for name in &names {
        out.push_str("- ");
        out.push_str(name);
        out.push('\n');
    }
    Ok(out)
}
