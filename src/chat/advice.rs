//! Advice generators: pure reads of the diagnosis context. None of these
//! re-score, and all of them answer with guidance instead of failing when no
//! diagnosis exists yet.

use crate::chat::DiagnosisContext;
use crate::kb::{self, KnowledgeBase};
use crate::matcher::{self, Severity};

pub(crate) const RUN_ANALYSIS_FIRST: &str = "I don't have a diagnosis to work from yet. \
     Please run the symptom analysis first, then I can help with your results.";

const DISCLAIMER: &str = "*This is general information. Always consult a healthcare provider \
     for personalized medical advice.*";

pub(crate) fn severity_advice(context: &DiagnosisContext) -> String {
    let Some(top) = context.top() else {
        return RUN_ANALYSIS_FIRST.to_string();
    };

    match context.severity() {
        Some(Severity::Severe) => format!(
            "Based on your symptoms, this appears to be a severe situation.\n\n\
             **Important:** you should seek medical attention promptly. \
             {} can be serious and requires professional evaluation.\n\n\
             Consider visiting a doctor or an urgent care clinic soon.",
            top.disease
        ),
        Some(Severity::Moderate) => format!(
            "Your symptoms suggest a moderate condition.\n\n\
             I recommend scheduling an appointment with your doctor to discuss {}. \
             While not an emergency, it's best to get professional medical advice.\n\n\
             Monitor your symptoms and seek immediate care if they worsen.",
            top.disease
        ),
        _ => format!(
            "Your symptoms appear to be mild.\n\n\
             Home care and rest may help with {}. If symptoms persist for more \
             than a few days or worsen, consult a healthcare provider.\n\n\
             Stay hydrated and get plenty of rest.",
            top.disease
        ),
    }
}

pub(crate) fn treatment_advice(context: &DiagnosisContext, kb: &KnowledgeBase) -> String {
    let Some(top) = context.top() else {
        return RUN_ANALYSIS_FIRST.to_string();
    };

    let mut out = format!("Treatment suggestions for {}:\n\n", top.disease);
    let precautions = kb.precautions(&top.disease);
    if precautions.is_empty() {
        out.push_str(
            "**General care:**\n\
             - Rest and adequate sleep\n\
             - Stay well-hydrated\n\
             - Over-the-counter pain relievers if needed\n\
             - Monitor symptoms closely\n\n\
             **When to see a doctor:**\n\
             - Symptoms worsen or do not improve\n\
             - High fever\n\
             - Severe pain\n\
             - Difficulty breathing\n\n",
        );
    } else {
        out.push_str("**Recommended precautions:**\n");
        for precaution in precautions {
            out.push_str("- ");
            out.push_str(precaution);
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(DISCLAIMER);
    out
}

// Restates the treatment advice; there is no separate next-steps policy.
pub(crate) fn next_steps(context: &DiagnosisContext, kb: &KnowledgeBase) -> String {
    treatment_advice(context, kb)
}

pub(crate) fn explain(context: &DiagnosisContext, kb: &KnowledgeBase) -> String {
    let Some(top) = context.top() else {
        return RUN_ANALYSIS_FIRST.to_string();
    };

    let description = kb.description(&top.disease);
    let symptom_list = kb
        .symptoms_of(&top.disease)
        .map(|set| {
            set.iter()
                .map(|symptom| kb::symptom_label(symptom))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let strength = if top.score > 70.0 {
        "This is a strong match based on your symptoms."
    } else if top.score > 40.0 {
        "This is a moderate match. Other conditions are also possible."
    } else {
        "This is a possible match, but other conditions should also be considered."
    };

    let mut out = format!("**About {}**\n\n{description}\n\n", top.disease);
    if !symptom_list.is_empty() {
        out.push_str(&format!("Common symptoms include: {symptom_list}.\n\n"));
    }
    out.push_str(&format!(
        "Your match: {:.1}%\n\n{strength}",
        matcher::display_top_score(top.score)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ScoredCandidate;
    use std::collections::BTreeSet;

    fn kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.add_association("Influenza", "fever");
        kb.add_association("Influenza", "cough");
        kb.set_description("Influenza", "A contagious respiratory infection.");
        kb.set_precautions(
            "Influenza",
            vec!["Rest".to_string(), "Drink fluids".to_string()],
        );
        kb.add_association("Mystery Pox", "rash");
        kb
    }

    fn context_with(disease: &str, score: f64, severity: Severity) -> DiagnosisContext {
        let mut context = DiagnosisContext::default();
        context.replace_diagnosis(
            vec![ScoredCandidate {
                disease: disease.to_string(),
                score,
            }],
            BTreeSet::from(["fever".to_string()]),
            Some(severity),
        );
        context
    }

    #[test]
    fn every_generator_guides_without_a_diagnosis() {
        let kb = kb();
        let empty = DiagnosisContext::default();
        assert_eq!(severity_advice(&empty), RUN_ANALYSIS_FIRST);
        assert_eq!(treatment_advice(&empty, &kb), RUN_ANALYSIS_FIRST);
        assert_eq!(next_steps(&empty, &kb), RUN_ANALYSIS_FIRST);
        assert_eq!(explain(&empty, &kb), RUN_ANALYSIS_FIRST);
    }

    #[test]
    fn severity_advice_escalates_with_the_label() {
        let severe = severity_advice(&context_with("Influenza", 80.0, Severity::Severe));
        assert!(severe.contains("seek medical attention"));
        assert!(severe.contains("Influenza"));

        let moderate = severity_advice(&context_with("Influenza", 60.0, Severity::Moderate));
        assert!(moderate.contains("appointment"));

        let mild = severity_advice(&context_with("Influenza", 40.0, Severity::Mild));
        assert!(mild.contains("Home care"));
    }

    #[test]
    fn treatment_advice_lists_curated_precautions() {
        let kb = kb();
        let advice = treatment_advice(&context_with("Influenza", 80.0, Severity::Mild), &kb);
        assert!(advice.contains("- Rest"));
        assert!(advice.contains("- Drink fluids"));
        assert!(advice.contains("general information"));
    }

    #[test]
    fn treatment_advice_falls_back_without_precautions() {
        let kb = kb();
        let advice = treatment_advice(&context_with("Mystery Pox", 50.0, Severity::Mild), &kb);
        assert!(advice.contains("General care"));
        assert!(advice.contains("When to see a doctor"));
    }

    #[test]
    fn next_steps_restates_treatment_advice() {
        let kb = kb();
        let context = context_with("Influenza", 80.0, Severity::Moderate);
        assert_eq!(next_steps(&context, &kb), treatment_advice(&context, &kb));
    }

    #[test]
    fn explain_renders_description_symptoms_and_floored_score() {
        let kb = kb();
        let explanation = explain(&context_with("Influenza", 12.0, Severity::Mild), &kb);
        assert!(explanation.contains("About Influenza"));
        assert!(explanation.contains("contagious respiratory infection"));
        assert!(explanation.contains("cough, fever"));
        assert!(explanation.contains("35.0%"));
        assert!(explanation.contains("possible match"));
    }
}
