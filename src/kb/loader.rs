//! CSV ingestion for the knowledge base, with a built-in fallback dataset.
//!
//! Three tabular sources are read from a data directory: `dataset.csv`
//! (`Source`/`Target` disease→symptom pairs), `disease_description.csv`
//! (`Disease`/`Description`), and `disease_precaution.csv`
//! (`Disease`/`Precaution_1..4`). Missing or malformed data never aborts
//! startup: problems are logged and the loader degrades, down to a small
//! compiled-in dataset when no associations are usable at all.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CheckError;
use crate::kb::KnowledgeBase;

pub const DATASET_FILE: &str = "dataset.csv";
pub const DESCRIPTION_FILE: &str = "disease_description.csv";
pub const PRECAUTION_FILE: &str = "disease_precaution.csv";

const PRECAUTION_COLUMNS: usize = 4;

/// Loads the knowledge base from `dir`, falling back to the built-in
/// dataset when no symptom associations can be read.
pub fn load(dir: &Path) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();

    match load_associations(&dir.join(DATASET_FILE), &mut kb) {
        Ok(rows) => debug!(
            rows,
            diseases = kb.disease_count(),
            symptoms = kb.symptom_count(),
            "loaded symptom associations"
        ),
        Err(err) => warn!(
            "could not load {DATASET_FILE} from {}: {err}",
            dir.display()
        ),
    }

    if kb.is_empty() {
        warn!(
            "no usable disease data under {}; using the built-in dataset",
            dir.display()
        );
        return builtin();
    }

    if let Err(err) = load_descriptions(&dir.join(DESCRIPTION_FILE), &mut kb) {
        warn!("could not load {DESCRIPTION_FILE}: {err}");
    }
    if let Err(err) = load_precautions(&dir.join(PRECAUTION_FILE), &mut kb) {
        warn!("could not load {PRECAUTION_FILE}: {err}");
    }

    kb
}

/// Picks the data directory: an explicit override, else `./data`, else the
/// per-user data dir. `None` means no candidate exists on disk.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        if dir.is_dir() {
            return Some(dir);
        }
        warn!("data directory {} does not exist", dir.display());
        return None;
    }

    let local = PathBuf::from("data");
    if local.is_dir() {
        return Some(local);
    }

    if let Some(base) = dirs::data_dir() {
        let shared = base.join("symcheck");
        if shared.is_dir() {
            return Some(shared);
        }
    }

    None
}

pub fn load_default(explicit: Option<PathBuf>) -> KnowledgeBase {
    match resolve_data_dir(explicit) {
        Some(dir) => load(&dir),
        None => {
            warn!("no data directory found; using the built-in dataset");
            builtin()
        }
    }
}

fn column(headers: &csv::StringRecord, name: &str, file: &str) -> Result<usize, CheckError> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| CheckError::MalformedData {
            file: file.to_string(),
            reason: format!("missing '{name}' column"),
        })
}

fn load_associations(path: &Path, kb: &mut KnowledgeBase) -> Result<usize, CheckError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let disease_col = column(&headers, "Source", DATASET_FILE)?;
    let symptom_col = column(&headers, "Target", DATASET_FILE)?;

    let mut rows = 0usize;
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                debug!("skipping malformed row in {DATASET_FILE}: {err}");
                continue;
            }
        };
        let disease = record.get(disease_col).unwrap_or("").trim();
        let symptom = record.get(symptom_col).unwrap_or("").trim();
        if disease.is_empty() || symptom.is_empty() {
            continue;
        }
        kb.add_association(disease, symptom);
        rows += 1;
    }
    Ok(rows)
}

fn load_descriptions(path: &Path, kb: &mut KnowledgeBase) -> Result<(), CheckError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let disease_col = column(&headers, "Disease", DESCRIPTION_FILE)?;
    let description_col = column(&headers, "Description", DESCRIPTION_FILE)?;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                debug!("skipping malformed row in {DESCRIPTION_FILE}: {err}");
                continue;
            }
        };
        let disease = record.get(disease_col).unwrap_or("").trim();
        let description = record.get(description_col).unwrap_or("").trim();
        if disease.is_empty() || description.is_empty() {
            continue;
        }
        kb.set_description(disease, description);
    }
    Ok(())
}

fn load_precautions(path: &Path, kb: &mut KnowledgeBase) -> Result<(), CheckError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let disease_col = column(&headers, "Disease", PRECAUTION_FILE)?;
    let precaution_cols: Vec<usize> = (1..=PRECAUTION_COLUMNS)
        .filter_map(|i| {
            let name = format!("Precaution_{i}");
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(&name))
        })
        .collect();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                debug!("skipping malformed row in {PRECAUTION_FILE}: {err}");
                continue;
            }
        };
        let disease = record.get(disease_col).unwrap_or("").trim();
        if disease.is_empty() {
            continue;
        }
        let precautions: Vec<String> = precaution_cols
            .iter()
            .filter_map(|&col| record.get(col))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(capitalize)
            .collect();
        if !precautions.is_empty() {
            kb.set_precautions(disease, precautions);
        }
    }
    Ok(())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

const BUILTIN_ASSOCIATIONS: &[(&str, &[&str])] = &[
    (
        "Influenza",
        &[
            "fever",
            "cough",
            "sore_throat",
            "muscle_pain",
            "fatigue",
            "chills",
        ],
    ),
    (
        "Common Cold",
        &["runny_nose", "sneezing", "sore_throat", "cough", "congestion"],
    ),
    (
        "Migraine",
        &["headache", "nausea", "sensitivity_to_light", "blurred_vision"],
    ),
    (
        "Gastroenteritis",
        &["vomiting", "diarrhea", "stomach_pain", "nausea", "fever"],
    ),
    (
        "Dengue",
        &["fever", "headache", "joint_pain", "muscle_pain", "rash", "chills"],
    ),
    (
        "Typhoid",
        &["fever", "abdominal_pain", "headache", "fatigue", "constipation"],
    ),
    (
        "Hypertension",
        &["headache", "dizziness", "chest_pain", "blurred_vision"],
    ),
    (
        "Acid Reflux",
        &["heartburn", "chest_pain", "regurgitation", "cough"],
    ),
];

const BUILTIN_DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "Influenza",
        "A contagious respiratory infection caused by influenza viruses, \
         typically with abrupt onset of fever and body aches.",
    ),
    (
        "Common Cold",
        "A mild viral infection of the nose and throat; unpleasant but \
         usually harmless and self-limiting.",
    ),
    (
        "Migraine",
        "A recurring headache disorder causing throbbing pain, often on one \
         side of the head, frequently with nausea and light sensitivity.",
    ),
    (
        "Gastroenteritis",
        "Inflammation of the stomach and intestines, usually from infection, \
         causing vomiting and diarrhea.",
    ),
    (
        "Dengue",
        "A mosquito-borne viral infection causing high fever, severe \
         headache, and joint and muscle pain.",
    ),
    (
        "Typhoid",
        "A bacterial infection spread through contaminated food and water, \
         marked by prolonged fever and abdominal discomfort.",
    ),
    (
        "Hypertension",
        "Persistently elevated blood pressure; often symptomless but can \
         cause headaches and dizziness when pronounced.",
    ),
    (
        "Acid Reflux",
        "Backflow of stomach acid into the esophagus, producing heartburn \
         and an acidic taste.",
    ),
];

const BUILTIN_PRECAUTIONS: &[(&str, &[&str])] = &[
    (
        "Influenza",
        &[
            "Rest and stay hydrated",
            "Take fever-reducing medication if needed",
            "Avoid close contact with others",
            "Consult a doctor if symptoms worsen",
        ],
    ),
    (
        "Common Cold",
        &[
            "Rest",
            "Drink warm fluids",
            "Gargle with salt water for a sore throat",
        ],
    ),
    (
        "Migraine",
        &[
            "Rest in a quiet dark room",
            "Stay hydrated",
            "Avoid known triggers",
        ],
    ),
    (
        "Gastroenteritis",
        &[
            "Sip oral rehydration solution",
            "Eat bland food",
            "Wash hands frequently",
            "See a doctor if dehydration develops",
        ],
    ),
    (
        "Dengue",
        &[
            "Drink plenty of fluids",
            "Use paracetamol rather than aspirin",
            "Seek medical attention promptly",
        ],
    ),
    (
        "Typhoid",
        &[
            "Complete the prescribed antibiotics",
            "Drink safe water",
            "Eat light meals",
        ],
    ),
    (
        "Hypertension",
        &[
            "Reduce salt intake",
            "Exercise regularly",
            "Monitor blood pressure",
            "Take prescribed medication",
        ],
    ),
];

/// Small compiled-in dataset used when no CSV sources are usable, so the
/// assistant can still answer rather than crash.
pub fn builtin() -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    for (disease, symptoms) in BUILTIN_ASSOCIATIONS {
        for symptom in *symptoms {
            kb.add_association(disease, symptom);
        }
    }
    for (disease, description) in BUILTIN_DESCRIPTIONS {
        kb.set_description(disease, description);
    }
    for (disease, precautions) in BUILTIN_PRECAUTIONS {
        kb.set_precautions(
            disease,
            precautions.iter().map(|p| p.to_string()).collect(),
        );
    }
    kb
}
