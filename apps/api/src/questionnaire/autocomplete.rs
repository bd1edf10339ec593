//! Autocomplete — filters a question's suggestions against typed input and
//! tracks keyboard/mouse highlight over the visible list.

use crate::questionnaire::catalog::Question;

/// At most this many suggestions are presented at once.
pub const MAX_VISIBLE_SUGGESTIONS: usize = 10;

/// Suggestions for `question` matching `input`: case-insensitive substring
/// containment, original order, placeholder echoes removed, capped for display.
pub fn filter_suggestions(question: &Question, input: &str) -> Vec<&'static str> {
    let needle = input.trim().to_lowercase();
    let placeholder = question.placeholder.trim();

    question
        .suggestions
        .iter()
        .copied()
        .filter(|s| s.trim() != placeholder)
        .filter(|s| needle.is_empty() || s.to_lowercase().contains(&needle))
        .take(MAX_VISIBLE_SUGGESTIONS)
        .collect()
}

/// What Enter should do with the current panel state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterAction {
    /// A highlighted suggestion was picked into the input.
    Picked(String),
    /// Nothing highlighted; submit the input as the answer.
    Submit(String),
}

/// Input box plus suggestion dropdown for one question.
#[derive(Debug, Clone)]
pub struct SuggestionPanel {
    question: Question,
    input: String,
    open: bool,
    highlighted: Option<usize>,
}

impl SuggestionPanel {
    /// Starts with `draft` in the input, panel closed.
    pub fn new(question: Question, draft: &str) -> Self {
        Self {
            question,
            input: draft.to_string(),
            open: false,
            highlighted: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn visible_suggestions(&self) -> Vec<&'static str> {
        filter_suggestions(&self.question, &self.input)
    }

    /// The dropdown shows while open, when the input is blank or something matches.
    pub fn is_shown(&self) -> bool {
        self.open && (self.input.trim().is_empty() || !self.visible_suggestions().is_empty())
    }

    pub fn focus(&mut self) {
        self.open = true;
    }

    pub fn dismiss(&mut self) {
        self.open = false;
    }

    pub fn type_input(&mut self, value: &str) {
        self.input = value.to_string();
        self.open = true;
        self.highlighted = None;
    }

    pub fn highlight_next(&mut self) {
        self.open = true;
        let len = self.visible_suggestions().len();
        if len == 0 {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(i) => (i + 1) % len,
            None => 0,
        });
    }

    pub fn highlight_previous(&mut self) {
        self.open = true;
        let len = self.visible_suggestions().len();
        if len == 0 {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(i) if i > 0 && i < len => i - 1,
            _ => len - 1,
        });
    }

    pub fn hover(&mut self, index: usize) {
        if index < self.visible_suggestions().len() {
            self.highlighted = Some(index);
        }
    }

    /// Copies the suggestion at `index` verbatim into the input and closes the panel.
    pub fn pick(&mut self, index: usize) -> Option<&str> {
        let choice = *self.visible_suggestions().get(index)?;
        self.input = choice.to_string();
        self.open = false;
        self.highlighted = None;
        Some(&self.input)
    }

    pub fn press_enter(&mut self) -> EnterAction {
        if self.is_shown() {
            if let Some(index) = self.highlighted {
                if let Some(picked) = self.pick(index) {
                    return EnterAction::Picked(picked.to_string());
                }
            }
        }
        self.open = false;
        EnterAction::Submit(self.input.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::catalog::Catalog;

    fn question(placeholder: &'static str, suggestions: &'static [&'static str]) -> Question {
        Question {
            id: "q",
            text: "?",
            placeholder,
            suggestions,
            validate: None,
            branch: None,
        }
    }

    const HEADLINES: &[&str] = &[
        "Product designer focused on fintech",
        "Founder shipping AI tools",
    ];

    #[test]
    fn test_fin_matches_only_fintech_headline() {
        let q = question("", HEADLINES);
        assert_eq!(
            filter_suggestions(&q, "fin"),
            vec!["Product designer focused on fintech"]
        );
    }

    #[test]
    fn test_matching_is_case_insensitive_and_order_preserving() {
        let q = question("", HEADLINES);
        assert_eq!(filter_suggestions(&q, "FOUNDER"), vec!["Founder shipping AI tools"]);
        assert_eq!(filter_suggestions(&q, "o"), HEADLINES.to_vec());
    }

    #[test]
    fn test_blank_input_returns_everything() {
        let q = question("", HEADLINES);
        assert_eq!(filter_suggestions(&q, "   "), HEADLINES.to_vec());
    }

    #[test]
    fn test_placeholder_echo_is_excluded() {
        let catalog = Catalog::builtin().unwrap();
        let headline = catalog.get(2).unwrap();
        let q = question(" Atlas ", &["Atlas", "Rift"]);
        assert_eq!(filter_suggestions(&q, ""), vec!["Rift"]);
        assert_eq!(filter_suggestions(headline, "").len(), 3);
    }

    #[test]
    fn test_presentation_is_capped() {
        let catalog = Catalog::builtin().unwrap();
        let role = catalog.get(0).unwrap();
        assert_eq!(role.suggestions.len(), 12);
        assert_eq!(filter_suggestions(role, "").len(), MAX_VISIBLE_SUGGESTIONS);
    }

    #[test]
    fn test_no_match_yields_empty_list() {
        let q = question("", HEADLINES);
        assert!(filter_suggestions(&q, "zzz").is_empty());
    }

    #[test]
    fn test_highlight_wraps_forward_and_backward() {
        let mut panel = SuggestionPanel::new(question("", &["a1", "a2", "a3"]), "");
        panel.highlight_next();
        assert_eq!(panel.highlighted(), Some(0));
        panel.highlight_next();
        panel.highlight_next();
        assert_eq!(panel.highlighted(), Some(2));
        panel.highlight_next();
        assert_eq!(panel.highlighted(), Some(0));
        panel.highlight_previous();
        assert_eq!(panel.highlighted(), Some(2));
    }

    #[test]
    fn test_previous_from_nothing_goes_to_last() {
        let mut panel = SuggestionPanel::new(question("", &["a1", "a2"]), "");
        panel.highlight_previous();
        assert_eq!(panel.highlighted(), Some(1));
    }

    #[test]
    fn test_typing_resets_highlight_and_opens() {
        let mut panel = SuggestionPanel::new(question("", HEADLINES), "");
        panel.highlight_next();
        panel.type_input("fin");
        assert_eq!(panel.highlighted(), None);
        assert!(panel.is_shown());
    }

    #[test]
    fn test_panel_hidden_when_nothing_matches() {
        let mut panel = SuggestionPanel::new(question("", HEADLINES), "");
        panel.type_input("zzz");
        assert!(!panel.is_shown());
    }

    #[test]
    fn test_pick_sets_input_verbatim_and_closes() {
        let mut panel = SuggestionPanel::new(question("", HEADLINES), "");
        panel.type_input("FIN");
        assert_eq!(panel.pick(0), Some("Product designer focused on fintech"));
        assert_eq!(panel.input(), "Product designer focused on fintech");
        assert!(!panel.is_shown());
    }

    #[test]
    fn test_hover_then_enter_picks() {
        let mut panel = SuggestionPanel::new(question("", HEADLINES), "");
        panel.focus();
        panel.hover(1);
        assert_eq!(
            panel.press_enter(),
            EnterAction::Picked("Founder shipping AI tools".to_string())
        );
    }

    #[test]
    fn test_enter_without_highlight_submits_trimmed_input() {
        let mut panel = SuggestionPanel::new(question("", HEADLINES), "");
        panel.type_input("  Indie hacker  ");
        assert_eq!(
            panel.press_enter(),
            EnterAction::Submit("Indie hacker".to_string())
        );
    }

    #[test]
    fn test_dismiss_hides_panel() {
        let mut panel = SuggestionPanel::new(question("", HEADLINES), "draft");
        assert_eq!(panel.input(), "draft");
        panel.focus();
        panel.dismiss();
        assert!(!panel.is_shown());
    }
}
