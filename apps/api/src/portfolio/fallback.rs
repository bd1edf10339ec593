use crate::portfolio::models::{Generation, Section};
use crate::portfolio::sanitizer::{
    DEFAULT_BIO, DEFAULT_CALL_TO_ACTION, DEFAULT_HEADLINE, DEFAULT_NAME,
};
use crate::questionnaire::Answers;

/// Builds portfolio copy straight from the answers, without the model.
/// Deterministic: the same answers always produce the same result.
pub fn fallback_generation(answers: &Answers) -> Generation {
    let answer_or = |id: &str, placeholder: &str| -> String {
        answers
            .get(id)
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .unwrap_or(placeholder)
            .to_string()
    };

    Generation {
        name: answer_or("name", DEFAULT_NAME),
        headline: answer_or("headline", DEFAULT_HEADLINE),
        bio: DEFAULT_BIO.to_string(),
        sections: vec![
            Section {
                title: "Highlights".to_string(),
                items: vec![
                    answer_or("project", "Top project"),
                    answer_or("stack", "Primary tools"),
                    answer_or("goal", "Primary goal"),
                ],
            },
            Section {
                title: "Background".to_string(),
                items: vec![
                    answer_or("role", "Role"),
                    answer_or("location", "Location"),
                    answer_or("website", "Website"),
                ],
            },
        ],
        call_to_action: DEFAULT_CALL_TO_ACTION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, &str)]) -> Answers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_answers_use_placeholders() {
        let g = fallback_generation(&Answers::new());
        assert_eq!(g.name, "Your Name");
        assert_eq!(g.headline, "Your one-line headline");
        assert_eq!(g.sections[0].title, "Highlights");
        assert_eq!(
            g.sections[0].items,
            vec!["Top project", "Primary tools", "Primary goal"]
        );
        assert_eq!(g.sections[1].title, "Background");
        assert_eq!(g.sections[1].items, vec!["Role", "Location", "Website"]);
        assert_eq!(g.call_to_action, "Get in touch to collaborate.");
    }

    #[test]
    fn test_answers_fill_their_slots() {
        let g = fallback_generation(&answers(&[
            ("name", " Ada Lovelace "),
            ("headline", "Analytical engine programmer"),
            ("project", "Notes on the Engine"),
            ("stack", "Punch cards"),
            ("goal", "Get hired"),
            ("role", "Software Engineer"),
            ("location", "London, UK"),
            ("website", "https://ada.dev"),
        ]));
        assert_eq!(g.name, "Ada Lovelace");
        assert_eq!(g.headline, "Analytical engine programmer");
        assert_eq!(
            g.sections[0].items,
            vec!["Notes on the Engine", "Punch cards", "Get hired"]
        );
        assert_eq!(
            g.sections[1].items,
            vec!["Software Engineer", "London, UK", "https://ada.dev"]
        );
    }

    #[test]
    fn test_skipped_answers_fall_back_to_placeholders() {
        let g = fallback_generation(&answers(&[("name", ""), ("stack", "   ")]));
        assert_eq!(g.name, "Your Name");
        assert_eq!(g.sections[0].items[1], "Primary tools");
    }

    #[test]
    fn test_is_deterministic() {
        let a = answers(&[("name", "Ada"), ("goal", "Find clients")]);
        assert_eq!(fallback_generation(&a), fallback_generation(&a));
    }
}
