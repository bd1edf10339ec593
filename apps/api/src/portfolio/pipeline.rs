//! Portfolio generation pipeline.
//!
//! Flow: build prompt from answers → model call → strip fences → parse →
//!       sanitize. Any failure along the way substitutes the sanitized fallback,
//!       so callers always get displayable copy.

use serde::Serialize;
use tracing::{info, warn};

use crate::llm_client::{strip_json_fences, TextGenerator};
use crate::portfolio::fallback::fallback_generation;
use crate::portfolio::models::{Generation, RawGeneration};
use crate::portfolio::prompts::{PORTFOLIO_PROMPT_TEMPLATE, PORTFOLIO_SYSTEM};
use crate::portfolio::sanitizer::sanitize;
use crate::questionnaire::Answers;

/// Message reported when the model call itself fails.
pub const GENERATION_FAILED: &str = "Generation failed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    pub data: Generation,
    /// Model text that could not be parsed. Present only when `data` is the fallback for that reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Set when the model call failed; `data` is then the fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub fn build_portfolio_prompt(answers: &Answers) -> String {
    let answers_json = serde_json::to_string_pretty(answers).unwrap_or_else(|_| "{}".to_string());
    PORTFOLIO_PROMPT_TEMPLATE.replace("{answers_json}", &answers_json)
}

/// Sanitized fallback for `answers`.
pub fn sanitized_fallback(answers: &Answers) -> Generation {
    sanitize(fallback_generation(answers).into())
}

/// Turns model text into an outcome. Unparsable text is not an error: the
/// fallback is substituted and the text kept in `raw`.
pub fn interpret_model_text(text: &str, answers: &Answers) -> GenerationOutcome {
    match serde_json::from_str::<RawGeneration>(strip_json_fences(text)) {
        Ok(raw) => GenerationOutcome {
            data: sanitize(raw),
            raw: None,
            error: None,
        },
        Err(e) => {
            warn!(
                "Model output was not a valid generation ({e}); using fallback: {:?}",
                text.chars().take(80).collect::<String>()
            );
            GenerationOutcome {
                data: sanitized_fallback(answers),
                raw: Some(text.to_string()),
                error: None,
            }
        }
    }
}

/// Runs the full pipeline. Never fails.
pub async fn generate_portfolio(
    generator: &dyn TextGenerator,
    answers: &Answers,
) -> GenerationOutcome {
    let prompt = build_portfolio_prompt(answers);
    info!("Generating portfolio copy from {} answers", answers.len());

    match generator.complete(&prompt, PORTFOLIO_SYSTEM).await {
        Ok(text) => interpret_model_text(&text, answers),
        Err(e) => {
            warn!("Portfolio generation call failed: {e}");
            GenerationOutcome {
                data: sanitized_fallback(answers),
                raw: None,
                error: Some(GENERATION_FAILED.to_string()),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::llm_client::{LlmError, TextGenerator};

    /// Canned generator: replies with fixed text, or fails with a 429.
    pub struct StubGenerator {
        reply: Option<String>,
        pub calls: AtomicUsize,
    }

    impl StubGenerator {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or(LlmError::Api {
                status: 429,
                message: "rate limited".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::StubGenerator;
    use super::*;
    use crate::portfolio::sanitizer::{ELLIPSIS, NAME_LIMIT};

    fn answers(pairs: &[(&str, &str)]) -> Answers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prompt_embeds_answers_as_json() {
        let prompt = build_portfolio_prompt(&answers(&[("name", "Ada"), ("goal", "Get hired")]));
        assert!(prompt.contains("\"name\": \"Ada\""));
        assert!(prompt.contains("\"goal\": \"Get hired\""));
        assert!(prompt.contains("2–6 words"));
        assert!(!prompt.contains("{answers_json}"));
    }

    #[tokio::test]
    async fn test_valid_model_json_is_sanitized() {
        let long_name = "N".repeat(100);
        let text = serde_json::json!({
            "name": long_name,
            "headline": "Designer",
            "bio": "Designs fintech products.",
            "sections": [{"title": "Work", "items": ["Atlas", "Rift", "Studio", "Extra"]}],
            "callToAction": "Let's talk."
        })
        .to_string();
        let outcome = generate_portfolio(&StubGenerator::replying(&text), &Answers::new()).await;

        assert!(outcome.is_ok());
        assert!(outcome.raw.is_none());
        assert_eq!(outcome.data.name.chars().count(), NAME_LIMIT);
        assert!(outcome.data.name.ends_with(ELLIPSIS));
        assert_eq!(outcome.data.sections[0].items, vec!["Atlas", "Rift", "Studio"]);
        assert_eq!(outcome.data.call_to_action, "Let's talk.");
    }

    #[tokio::test]
    async fn test_fenced_model_json_is_accepted() {
        let text = "```json\n{\"name\": \"Ada\"}\n```";
        let outcome = generate_portfolio(&StubGenerator::replying(text), &Answers::new()).await;
        assert!(outcome.raw.is_none());
        assert_eq!(outcome.data.name, "Ada");
    }

    #[tokio::test]
    async fn test_unparsable_output_equals_fallback_and_keeps_raw() {
        let a = answers(&[("name", "Ada"), ("project", "Atlas")]);
        let outcome =
            generate_portfolio(&StubGenerator::replying("Sure! Here is your site."), &a).await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.data, sanitized_fallback(&a));
        assert_eq!(outcome.raw.as_deref(), Some("Sure! Here is your site."));
    }

    #[tokio::test]
    async fn test_wrongly_typed_json_falls_back() {
        let a = answers(&[("name", "Ada")]);
        let outcome = generate_portfolio(&StubGenerator::replying(r#"{"name": 42}"#), &a).await;
        assert_eq!(outcome.data, sanitized_fallback(&a));
        assert!(outcome.raw.is_some());
    }

    #[tokio::test]
    async fn test_call_failure_reports_error_with_usable_fallback() {
        let outcome = generate_portfolio(&StubGenerator::failing(), &Answers::new()).await;

        assert!(!outcome.is_ok());
        assert_eq!(outcome.error.as_deref(), Some(GENERATION_FAILED));
        assert!(outcome.raw.is_none());
        assert_eq!(outcome.data.name, "Your Name");
        assert_eq!(outcome.data.sections.len(), 2);
    }

    #[test]
    fn test_fallback_with_oversized_answers_is_clamped() {
        let long = "p".repeat(200);
        let a = answers(&[("project", long.as_str())]);
        let data = sanitized_fallback(&a);
        assert!(data.sections[0].items[0].ends_with(ELLIPSIS));
        assert!(data.sections[0].items[0].chars().count() <= 60);
    }

    #[test]
    fn test_outcome_serialization_omits_absent_fields() {
        let outcome = interpret_model_text(r#"{"name":"Ada"}"#, &Answers::new());
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("raw").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json["data"]["name"], "Ada");
    }
}
