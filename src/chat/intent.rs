//! Ordered intent rules for the assistant. The table is data: one pass,
//! first match wins, context-gated entries skipped while no diagnosis exists.

use std::sync::OnceLock;

use regex::Regex;

const DISEASE_QUERY_PATTERN: &str =
    r"(?:what is|what's|tell me (?:more )?about|info(?:rmation)? (?:on|about))\s+(.+)";
const SEVERITY_PATTERN: &str =
    r"\b(?:serious|severe|bad|dangerous|worry|worried|concern|concerned|die|dying)\b";
const TREATMENT_PATTERN: &str =
    r"\b(?:treatment|treated|treat|cure|remedy|remedies|medicine|medication|heal|get better)\b";
const NEXT_STEPS_PATTERN: &str = r"what (?:should|do) i do|\bnext steps?\b";
const EXPLAIN_PATTERN: &str =
    r"\bwhat is this\b|\bexplain\b|\btell me more\b|\bmore info(?:rmation)?\b|\bdetails\b";
const GREETING_PATTERN: &str =
    r"\b(?:hi|hello|hey|greetings|good morning|good afternoon|good evening)\b";
const FAREWELL_PATTERN: &str = r"\b(?:bye|goodbye|see you|exit|quit)\b";
const THANKS_PATTERN: &str = r"\b(?:thanks|thank you|thank|appreciate|appreciated)\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FollowUp {
    SeverityConcern,
    Treatment,
    NextSteps,
    Explain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Social {
    Greeting,
    Farewell,
    Thanks,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Intent {
    /// Explicit "what is X" style query with the cleaned-up subject.
    DiseaseQuery { subject: String },
    FollowUp(FollowUp),
    Social(Social),
}

#[derive(Debug, Clone, Copy)]
enum RuleKind {
    DiseaseQuery,
    FollowUp(FollowUp),
    Social(Social),
}

struct Rule {
    pattern: Regex,
    kind: RuleKind,
    needs_context: bool,
}

fn rule(pattern: &str, kind: RuleKind, needs_context: bool) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("intent pattern must compile"),
        kind,
        needs_context,
    }
}

pub(crate) struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub(crate) fn new() -> Self {
        let rules = vec![
            rule(DISEASE_QUERY_PATTERN, RuleKind::DiseaseQuery, false),
            rule(
                SEVERITY_PATTERN,
                RuleKind::FollowUp(FollowUp::SeverityConcern),
                true,
            ),
            rule(
                TREATMENT_PATTERN,
                RuleKind::FollowUp(FollowUp::Treatment),
                true,
            ),
            rule(
                NEXT_STEPS_PATTERN,
                RuleKind::FollowUp(FollowUp::NextSteps),
                true,
            ),
            rule(EXPLAIN_PATTERN, RuleKind::FollowUp(FollowUp::Explain), true),
            rule(GREETING_PATTERN, RuleKind::Social(Social::Greeting), false),
            rule(FAREWELL_PATTERN, RuleKind::Social(Social::Farewell), false),
            rule(THANKS_PATTERN, RuleKind::Social(Social::Thanks), false),
        ];
        Self { rules }
    }

    /// Classifies lowercased input against the rule table. `None` means no
    /// pattern rule applies and symptom extraction should run instead.
    pub(crate) fn classify(&self, text: &str, has_context: bool) -> Option<Intent> {
        for rule in &self.rules {
            if rule.needs_context && !has_context {
                continue;
            }
            let Some(captures) = rule.pattern.captures(text) else {
                continue;
            };
            match rule.kind {
                RuleKind::DiseaseQuery => {
                    let subject = clean_subject(captures.get(1).map_or("", |m| m.as_str()));
                    if subject.is_empty() {
                        continue;
                    }
                    return Some(Intent::DiseaseQuery { subject });
                }
                RuleKind::FollowUp(follow_up) => return Some(Intent::FollowUp(follow_up)),
                RuleKind::Social(social) => return Some(Intent::Social(social)),
            }
        }
        None
    }
}

pub(crate) fn farewell_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(FAREWELL_PATTERN).expect("farewell pattern must compile"))
}

fn clean_subject(raw: &str) -> String {
    let mut subject = raw.trim().trim_end_matches(['?', '!', '.', ',']).trim();
    for article in ["a ", "an ", "the "] {
        if let Some(rest) = subject.strip_prefix(article) {
            subject = rest.trim();
            break;
        }
    }
    subject.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disease_query_wins_over_everything() {
        let rules = RuleSet::new();
        let intent = rules.classify("thanks, but what is dengue?", true);
        assert_eq!(
            intent,
            Some(Intent::DiseaseQuery {
                subject: "dengue".to_string()
            })
        );
    }

    #[test]
    fn subject_is_cleaned_of_articles_and_punctuation() {
        let rules = RuleSet::new();
        assert_eq!(
            rules.classify("tell me about the flu!", false),
            Some(Intent::DiseaseQuery {
                subject: "flu".to_string()
            })
        );
        assert_eq!(
            rules.classify("info on a migraine", false),
            Some(Intent::DiseaseQuery {
                subject: "migraine".to_string()
            })
        );
    }

    #[test]
    fn follow_ups_require_context() {
        let rules = RuleSet::new();
        assert_eq!(rules.classify("is this serious?", false), None);
        assert_eq!(
            rules.classify("is this serious?", true),
            Some(Intent::FollowUp(FollowUp::SeverityConcern))
        );
        assert_eq!(
            rules.classify("how do i treat it", true),
            Some(Intent::FollowUp(FollowUp::Treatment))
        );
        assert_eq!(
            rules.classify("what should i do now", true),
            Some(Intent::FollowUp(FollowUp::NextSteps))
        );
        assert_eq!(
            rules.classify("tell me more", true),
            Some(Intent::FollowUp(FollowUp::Explain))
        );
    }

    #[test]
    fn severity_outranks_treatment_when_both_match() {
        let rules = RuleSet::new();
        assert_eq!(
            rules.classify("is it serious, and how do i treat it?", true),
            Some(Intent::FollowUp(FollowUp::SeverityConcern))
        );
    }

    #[test]
    fn social_keywords_are_word_bounded() {
        let rules = RuleSet::new();
        assert_eq!(rules.classify("this is strange", false), None);
        assert_eq!(
            rules.classify("hi there", false),
            Some(Intent::Social(Social::Greeting))
        );
        assert_eq!(
            rules.classify("goodbye then", false),
            Some(Intent::Social(Social::Farewell))
        );
        assert_eq!(
            rules.classify("thank you so much", false),
            Some(Intent::Social(Social::Thanks))
        );
    }

    #[test]
    fn unmatched_input_yields_none() {
        let rules = RuleSet::new();
        assert_eq!(rules.classify("i have a headache", false), None);
    }
}
