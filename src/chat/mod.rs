//! The assistant: a context-aware dialogue router over the matcher.
//!
//! One mutable `DiagnosisContext` per assistant instance; every reply is a
//! synchronous function of the input text, the knowledge base, and that
//! context. Intent classification is ordered and first-match-wins, with
//! symptom extraction as the next-to-last resort and a fixed guidance
//! fallback at the end.

mod advice;
mod extract;
mod intent;

pub use extract::SIMILARITY_CUTOFF;

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use tracing::warn;

use crate::kb::KnowledgeBase;
use crate::matcher::{self, ScoredCandidate, ScoringStrategy, Severity};
use crate::render;

use intent::{FollowUp, Intent, RuleSet, Social};

const GREETINGS: &[&str] = &[
    "Hello! I'm your medical assistant. How can I help you today?",
    "Hi there! Tell me about your symptoms and I'll try to help.",
    "Hello! I'm here to assist with symptom analysis. What's bothering you?",
];

const FAREWELL: &str = "Take care! Remember to consult a healthcare professional for serious \
     concerns. Goodbye!";

const THANKS: &str =
    "You're welcome! Feel free to ask if you have more questions. Stay healthy!";

const NO_CONDITION_MATCH: &str = "I couldn't find any conditions matching those symptoms. \
     Please try describing them differently.";

const FALLBACK_WITH_DIAGNOSIS: &str = "I'm here to help explain your results. You can ask:\n\
     - \"Is this serious?\"\n\
     - \"What should I do?\"\n\
     - \"How is it treated?\"\n\
     - \"Tell me more about the condition\"";

const FALLBACK_WITHOUT_DIAGNOSIS: &str = "Please run the symptom analysis first, or describe \
     what you're experiencing (for example \"I have a headache and fever\"). Then I can help \
     answer questions about the results.";

// Curated colloquial names for conditions, resolved before the knowledge base.
const DISEASE_ALIASES: &[(&str, &str)] = &[
    ("flu", "influenza"),
    ("cold", "common cold"),
    ("stomach flu", "gastroenteritis"),
    ("stomach bug", "gastroenteritis"),
    ("food poisoning", "gastroenteritis"),
    ("high blood pressure", "hypertension"),
    ("gerd", "acid reflux"),
    ("heartburn trouble", "acid reflux"),
];

const SELF_REFERENCES: &[&str] = &[
    "it",
    "this",
    "that",
    "condition",
    "the condition",
    "this condition",
    "my condition",
    "diagnosis",
    "my diagnosis",
    "the diagnosis",
    "my results",
];

/// The assistant's session memory: the most recent diagnosis plus the
/// cumulative set of symptoms mentioned across the whole chat. All fields
/// exist from construction; a new diagnosis replaces the current one
/// wholesale while the mentioned set only ever grows.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisContext {
    candidates: Vec<ScoredCandidate>,
    symptoms: BTreeSet<String>,
    severity: Option<Severity>,
    mentioned: BTreeSet<String>,
}

impl DiagnosisContext {
    pub fn has_diagnosis(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Full ranked candidate list from the latest diagnosis, highest first.
    pub fn candidates(&self) -> &[ScoredCandidate] {
        &self.candidates
    }

    pub fn top(&self) -> Option<&ScoredCandidate> {
        self.candidates.first()
    }

    /// The symptom set that produced the latest diagnosis.
    pub fn symptoms(&self) -> &BTreeSet<String> {
        &self.symptoms
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    /// Every symptom mentioned in chat so far, across all turns.
    pub fn mentioned_symptoms(&self) -> &BTreeSet<String> {
        &self.mentioned
    }

    pub(crate) fn replace_diagnosis(
        &mut self,
        candidates: Vec<ScoredCandidate>,
        symptoms: BTreeSet<String>,
        severity: Option<Severity>,
    ) {
        self.candidates = candidates;
        self.symptoms = symptoms;
        self.severity = severity;
    }
}

/// Rule-based dialogue router. Holds a reference to the knowledge base and
/// owns the session's diagnosis context.
pub struct Assistant<'a> {
    kb: &'a KnowledgeBase,
    strategy: ScoringStrategy,
    rules: RuleSet,
    context: DiagnosisContext,
}

impl<'a> Assistant<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self {
            kb,
            strategy: ScoringStrategy::default(),
            rules: RuleSet::new(),
            context: DiagnosisContext::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ScoringStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn context(&self) -> &DiagnosisContext {
        &self.context
    }

    /// Syncs an externally computed diagnosis (e.g. from an explicit
    /// analyze action) so follow-up questions are grounded in the same
    /// result the user was shown.
    pub fn set_context(
        &mut self,
        candidates: Vec<ScoredCandidate>,
        symptoms: BTreeSet<String>,
        severity: Severity,
    ) {
        self.context
            .replace_diagnosis(candidates, symptoms, Some(severity));
    }

    /// One chat turn: classify, answer, and possibly re-diagnose from
    /// symptoms found in the text.
    pub fn respond(&mut self, input: &str) -> String {
        let text = input.trim().to_lowercase();
        if text.is_empty() {
            return self.fallback();
        }

        if let Some(intent) = self.rules.classify(&text, self.context.has_diagnosis()) {
            return match intent {
                Intent::DiseaseQuery { subject } => self.disease_query(&subject),
                Intent::FollowUp(FollowUp::SeverityConcern) => {
                    advice::severity_advice(&self.context)
                }
                Intent::FollowUp(FollowUp::Treatment) => {
                    advice::treatment_advice(&self.context, self.kb)
                }
                Intent::FollowUp(FollowUp::NextSteps) => {
                    advice::next_steps(&self.context, self.kb)
                }
                Intent::FollowUp(FollowUp::Explain) => advice::explain(&self.context, self.kb),
                Intent::Social(Social::Greeting) => greeting(),
                Intent::Social(Social::Farewell) => FAREWELL.to_string(),
                Intent::Social(Social::Thanks) => THANKS.to_string(),
            };
        }

        let found = extract::extract(&text, self.kb);
        if !found.is_empty() {
            return self.diagnose_mentioned(found);
        }

        self.fallback()
    }

    /// Renders a summary of the current diagnosis, if one exists.
    pub fn diagnosis_summary(&self) -> Option<String> {
        if !self.context.has_diagnosis() {
            return None;
        }
        let display = matcher::for_display(self.context.candidates());
        Some(self.render_summary(self.context.symptoms(), &display))
    }

    fn disease_query(&self, subject: &str) -> String {
        if self.is_self_reference(subject) {
            return advice::explain(&self.context, self.kb);
        }
        match resolve_condition(self.kb, subject) {
            Some(name) => {
                let name = name.to_string();
                render::markdown::disease_info(self.kb, &name).unwrap_or_else(|err| {
                    warn!("disease template failed: {err}");
                    format!("**{name}**\n\n{}", self.kb.description(&name))
                })
            }
            None => format!(
                "I don't have information about '{subject}'. Try asking about common \
                 conditions like flu, cold, or migraine."
            ),
        }
    }

    fn diagnose_mentioned(&mut self, found: BTreeSet<String>) -> String {
        self.context.mentioned.extend(found.iter().cloned());

        let ranked = matcher::score(&found, self.kb, self.strategy);
        if ranked.is_empty() {
            return NO_CONDITION_MATCH.to_string();
        }

        let severity = matcher::severity(found.len());
        let display = matcher::for_display(&ranked);
        let summary = self.render_summary(&found, &display);
        self.context
            .replace_diagnosis(ranked, found, Some(severity));
        summary
    }

    fn render_summary(&self, symptoms: &BTreeSet<String>, display: &[ScoredCandidate]) -> String {
        render::markdown::chat_summary(self.kb, symptoms, display).unwrap_or_else(|err| {
            warn!("summary template failed: {err}");
            let mut out = String::from("Possible conditions:\n");
            for candidate in display {
                out.push_str(&format!(
                    "- {} ({:.1}% match)\n",
                    candidate.disease, candidate.score
                ));
            }
            out
        })
    }

    fn is_self_reference(&self, subject: &str) -> bool {
        if SELF_REFERENCES.contains(&subject) {
            return true;
        }
        self.context
            .top()
            .is_some_and(|top| top.disease.eq_ignore_ascii_case(subject))
    }

    fn fallback(&self) -> String {
        if self.context.has_diagnosis() {
            FALLBACK_WITH_DIAGNOSIS.to_string()
        } else {
            FALLBACK_WITHOUT_DIAGNOSIS.to_string()
        }
    }
}

/// Resolves a user-facing condition name: curated aliases first, then the
/// knowledge base's exact and word-boundary matching.
pub fn resolve_condition<'k>(kb: &'k KnowledgeBase, query: &str) -> Option<&'k str> {
    let lowered = query.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if let Some(target) = DISEASE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, target)| *target)
        && let Some(name) = kb.resolve_disease(target)
    {
        return Some(name);
    }
    kb.resolve_disease(&lowered)
}

/// True when the input reads as a goodbye; interactive front-ends use this
/// to end the session after the farewell reply.
pub fn is_farewell(text: &str) -> bool {
    intent::farewell_pattern().is_match(&text.trim().to_lowercase())
}

fn greeting() -> String {
    GREETINGS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(GREETINGS[0])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::loader;

    fn word_boundary_kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.add_association("Bird Flu", "fever");
        kb.add_association("Bird Flu", "cough");
        kb.add_association("Acid Reflux", "heartburn");
        kb.set_description("Bird Flu", "An avian influenza infection.");
        kb.set_description("Acid Reflux", "Backflow of stomach acid.");
        kb
    }

    #[test]
    fn disease_query_resolves_via_alias_without_context() {
        let kb = loader::builtin();
        let mut assistant = Assistant::new(&kb);
        let reply = assistant.respond("What is Flu?");
        assert!(reply.contains("Influenza"), "got: {reply}");
        assert!(reply.contains("consult"));
    }

    #[test]
    fn disease_query_matches_whole_words_only() {
        let kb = word_boundary_kb();
        let mut assistant = Assistant::new(&kb);

        let reply = assistant.respond("tell me about flu");
        assert!(reply.contains("Bird Flu"), "got: {reply}");
        assert!(!reply.contains("Acid Reflux"));

        let miss = assistant.respond("what is dragon pox?");
        assert!(miss.contains("don't have information about 'dragon pox'"));
    }

    #[test]
    fn advice_is_gated_until_a_diagnosis_exists() {
        let kb = loader::builtin();
        let mut assistant = Assistant::new(&kb);
        // Self-referential query routes to the explainer, which guides
        // instead of failing.
        let reply = assistant.respond("what is it?");
        assert!(reply.contains("run the symptom analysis first"));
    }

    #[test]
    fn follow_ups_use_the_synced_context() {
        let kb = loader::builtin();
        let mut assistant = Assistant::new(&kb);
        assistant.set_context(
            vec![ScoredCandidate {
                disease: "Influenza".to_string(),
                score: 82.0,
            }],
            BTreeSet::from(["fever".to_string(), "cough".to_string()]),
            Severity::Severe,
        );

        let severity = assistant.respond("is this serious?");
        assert!(severity.contains("severe"));
        assert!(severity.contains("Influenza"));

        let treatment = assistant.respond("how do i treat it?");
        assert!(treatment.contains("Treatment suggestions for Influenza"));

        let explain = assistant.respond("tell me more");
        assert!(explain.contains("About Influenza"));
        assert!(explain.contains("82.0%"));
    }

    #[test]
    fn next_steps_equal_treatment_advice() {
        let kb = loader::builtin();
        let mut assistant = Assistant::new(&kb);
        assistant.set_context(
            vec![ScoredCandidate {
                disease: "Influenza".to_string(),
                score: 64.0,
            }],
            BTreeSet::from(["fever".to_string()]),
            Severity::Mild,
        );

        let steps = assistant.respond("what should i do?");
        let treatment = assistant.respond("how is it treated?");
        assert_eq!(steps, treatment);
    }

    #[test]
    fn social_intents_get_canned_responses() {
        let kb = loader::builtin();
        let mut assistant = Assistant::new(&kb);

        let greeting = assistant.respond("hi there");
        assert!(GREETINGS.contains(&greeting.as_str()));

        assert_eq!(assistant.respond("thanks a lot"), THANKS);
        assert_eq!(assistant.respond("bye for now"), FAREWELL);
        assert!(is_farewell("ok bye"));
        assert!(!is_farewell("i have a fever"));
    }

    #[test]
    fn extraction_produces_a_diagnosis_and_updates_context() {
        let kb = loader::builtin();
        let mut assistant = Assistant::new(&kb);

        let reply = assistant.respond("i have a hedache and some nausea");
        assert!(reply.contains("Migraine"), "got: {reply}");
        assert!(reply.contains("not a diagnosis"));

        let context = assistant.context();
        assert!(context.has_diagnosis());
        assert!(context.symptoms().contains("headache"));
        assert!(context.mentioned_symptoms().contains("nausea"));
        assert_eq!(context.severity(), Some(Severity::Mild));
    }

    #[test]
    fn mentioned_symptoms_accumulate_across_turns() {
        let kb = loader::builtin();
        let mut assistant = Assistant::new(&kb);

        assistant.respond("i have a fever");
        assistant.respond("now also a cough");

        let mentioned = assistant.context().mentioned_symptoms();
        assert!(mentioned.contains("fever"));
        assert!(mentioned.contains("cough"));
        // The current diagnosis reflects only the latest turn's symptoms.
        assert!(!assistant.context().symptoms().contains("fever"));
        assert!(assistant.context().symptoms().contains("cough"));
    }

    #[test]
    fn fallback_depends_on_whether_a_diagnosis_exists() {
        let kb = loader::builtin();
        let mut assistant = Assistant::new(&kb);

        let before = assistant.respond("zzzz qqqq");
        assert!(before.contains("run the symptom analysis first"));

        assistant.set_context(
            vec![ScoredCandidate {
                disease: "Influenza".to_string(),
                score: 55.0,
            }],
            BTreeSet::from(["fever".to_string()]),
            Severity::Mild,
        );
        let after = assistant.respond("zzzz qqqq");
        assert!(after.contains("Is this serious?"));
    }

    #[test]
    fn disease_query_outranks_follow_ups_and_social() {
        let kb = loader::builtin();
        let mut assistant = Assistant::new(&kb);
        assistant.set_context(
            vec![ScoredCandidate {
                disease: "Migraine".to_string(),
                score: 70.0,
            }],
            BTreeSet::from(["headache".to_string()]),
            Severity::Mild,
        );

        let reply = assistant.respond("thanks, tell me about dengue");
        assert!(reply.contains("Dengue"), "got: {reply}");
    }

    #[test]
    fn resolve_condition_falls_back_to_raw_query_when_alias_misses() {
        let kb = word_boundary_kb();
        // No "Influenza" here, so the flu alias cannot resolve; the raw
        // query still finds Bird Flu by word boundary.
        assert_eq!(resolve_condition(&kb, "flu"), Some("Bird Flu"));
        assert_eq!(resolve_condition(&kb, "reflux"), Some("Acid Reflux"));
        assert_eq!(resolve_condition(&kb, "lux"), None);
    }
}
