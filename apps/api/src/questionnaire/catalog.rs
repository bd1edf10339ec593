//! Question Catalog — the fixed, ordered list of questions that drives the flow.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

/// User answers keyed by question id. Ordered so the prompt serializes deterministically.
pub type Answers = BTreeMap<String, String>;

/// Accepts or rejects a trimmed answer.
pub type Validator = fn(&str) -> bool;

/// Computes a non-sequential next question id from the answer and all answers so far.
pub type Branch = fn(&str, &Answers) -> Option<&'static str>;

#[derive(Clone, Copy)]
pub struct Question {
    pub id: &'static str,
    pub text: &'static str,
    pub placeholder: &'static str,
    pub suggestions: &'static [&'static str],
    pub validate: Option<Validator>,
    pub branch: Option<Branch>,
}

impl std::fmt::Debug for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Question")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("has_validator", &self.validate.is_some())
            .field("has_branch", &self.branch.is_some())
            .finish()
    }
}

impl Question {
    /// Applies the question's validator, or the default non-empty rule.
    pub fn accepts(&self, trimmed: &str) -> bool {
        match self.validate {
            Some(validate) => validate(trimmed),
            None => !trimmed.is_empty(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog must contain at least one question")]
    Empty,

    #[error("duplicate question id '{0}'")]
    DuplicateId(&'static str),
}

/// Read-only, non-empty sequence of questions with unique ids.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let catalog = Self { questions };
        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for q in &catalog.questions {
            if !seen.insert(q.id) {
                return Err(CatalogError::DuplicateId(q.id));
            }
        }
        Ok(catalog)
    }

    /// The eight-question portfolio questionnaire.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(BUILTIN_QUESTIONS.to_vec())
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn find_index_by_id(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

const BUILTIN_QUESTIONS: &[Question] = &[
    Question {
        id: "role",
        text: "What best describes you?",
        placeholder: "Type anything...",
        suggestions: &[
            "Software Engineer",
            "Student",
            "Designer",
            "Founder",
            "Freelancer",
            "Creator",
            "Product Manager",
            "Data Analyst",
            "Marketer",
            "Photographer",
            "Writer",
            "Other",
        ],
        validate: None,
        branch: None,
    },
    Question {
        id: "name",
        text: "What is your full name?",
        placeholder: "e.g. Jordan Lee",
        suggestions: &[],
        validate: None,
        branch: None,
    },
    Question {
        id: "headline",
        text: "Write a one-line headline",
        placeholder: "e.g. Product designer focused on fintech",
        suggestions: &[
            "Product designer focused on fintech",
            "Full-stack engineer building modern web apps",
            "Founder shipping AI tools for creators",
        ],
        validate: None,
        branch: None,
    },
    Question {
        id: "location",
        text: "Where are you based?",
        placeholder: "City, Country",
        suggestions: &[
            "San Francisco, USA",
            "New York, USA",
            "London, UK",
            "Berlin, Germany",
            "Toronto, Canada",
        ],
        validate: None,
        branch: None,
    },
    Question {
        id: "website",
        text: "Do you have a personal website?",
        placeholder: "Optional link",
        suggestions: &["https://", "https://yourname.com"],
        validate: None,
        branch: None,
    },
    Question {
        id: "project",
        text: "Share your top project",
        placeholder: "Project name",
        suggestions: &["Atlas", "Rift", "Northstar", "Studio"],
        validate: None,
        branch: None,
    },
    Question {
        id: "stack",
        text: "What tools do you use most?",
        placeholder: "e.g. React, Figma, Notion",
        suggestions: &["React, TypeScript, Next.js", "Figma, Framer, Notion"],
        validate: None,
        branch: None,
    },
    Question {
        id: "goal",
        text: "What is your main goal for this portfolio?",
        placeholder: "e.g. Get hired, find clients",
        suggestions: &["Get hired", "Find clients", "Showcase work", "Raise funding"],
        validate: None,
        branch: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(id: &'static str) -> Question {
        Question {
            id,
            text: "?",
            placeholder: "",
            suggestions: &[],
            validate: None,
            branch: None,
        }
    }

    #[test]
    fn test_builtin_order_and_length() {
        let catalog = Catalog::builtin().unwrap();
        let ids: Vec<_> = (0..catalog.len())
            .filter_map(|i| catalog.get(i).map(|q| q.id))
            .collect();
        assert_eq!(
            ids,
            vec!["role", "name", "headline", "location", "website", "project", "stack", "goal"]
        );
    }

    #[test]
    fn test_builtin_passes_validation() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.len(), 8);
    }

    #[test]
    fn test_find_index_by_id() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.find_index_by_id("headline"), Some(2));
        assert_eq!(catalog.find_index_by_id("goal"), Some(7));
        assert_eq!(catalog.find_index_by_id("nope"), None);
    }

    #[test]
    fn test_get_out_of_bounds_is_none() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.get(catalog.len()).is_none());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert_eq!(Catalog::new(vec![]).unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Catalog::new(vec![plain("a"), plain("b"), plain("a")]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId("a"));
    }

    #[test]
    fn test_default_validator_requires_non_empty() {
        let q = plain("a");
        assert!(q.accepts("hello"));
        assert!(!q.accepts(""));
    }

    #[test]
    fn test_custom_validator_overrides_default() {
        let q = Question {
            validate: Some(|a| a.starts_with("https://")),
            ..plain("website")
        };
        assert!(q.accepts("https://ada.dev"));
        assert!(!q.accepts("ada.dev"));
    }
}
