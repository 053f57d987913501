use crate::core::parse::{coerce_number, extract_object, field_str, field_str_list, JsonExtractError};
use crate::core::prompt::build_extraction_prompt;
use crate::models::ExtractedProfile;
use crate::services::llm::{LlmError, TextGenerator};
use serde_json::Value;
use thiserror::Error;

/// Where a source text blob came from
///
/// Currently both kinds share one extraction template; the hint keeps room
/// for the prompts to diverge without touching callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Github,
    Resume,
}

impl SourceKind {
    fn label(self) -> &'static str {
        match self {
            Self::Github => "GitHub account (profile and repository listing)",
            Self::Resume => "resume",
        }
    }
}

/// Errors from profile extraction
///
/// Unlike scoring, extraction fails hard: this feeds onboarding, where
/// silently wrong data is worse than an explicit retry prompt.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("reasoning service failed: {0}")]
    Gateway(#[from] LlmError),

    #[error("could not parse extraction response: {0}")]
    Malformed(#[from] JsonExtractError),
}

/// Profile Extraction Engine
///
/// Turns a flattened source text blob into a structured profile draft with
/// every field present.
#[derive(Clone)]
pub struct ProfileExtractor<G> {
    gateway: G,
}

impl<G: TextGenerator> ProfileExtractor<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub async fn extract(
        &self,
        source_text: &str,
        kind: SourceKind,
    ) -> Result<ExtractedProfile, ExtractionError> {
        let prompt = build_extraction_prompt(source_text, kind.label());
        let text = self.gateway.generate(&prompt).await?;
        let object = extract_object(&text)?;
        Ok(profile_from_value(&object))
    }
}

/// Build the draft field-by-field; what the model omitted stays at its
/// empty default, so callers can rely on every key being present
fn profile_from_value(object: &Value) -> ExtractedProfile {
    ExtractedProfile {
        name: field_str(object, "name"),
        email: field_str(object, "email"),
        role: field_str(object, "role"),
        skills: field_str_list(object, "skills"),
        tech_stack: field_str_list(object, "techStack"),
        experience: field_str_list(object, "experience"),
        school: field_str(object, "school"),
        location: field_str(object, "location"),
        description: field_str(object, "description"),
        github: field_str(object, "github"),
        devpost: field_str(object, "devpost"),
        num_hackathons: object
            .get("numHackathons")
            .and_then(coerce_number)
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    #[derive(Clone)]
    struct StubGenerator {
        reply: Option<String>,
    }

    impl TextGenerator for StubGenerator {
        fn generate(
            &self,
            _prompt: &str,
        ) -> impl Future<Output = Result<String, LlmError>> + Send {
            let reply = self.reply.clone();
            async move {
                reply.ok_or_else(|| LlmError::InvalidResponse("stub failure".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_extracts_all_fields_with_defaults() {
        let stub = StubGenerator {
            reply: Some(
                r#"{"name": "Ada Lovelace", "skills": ["Rust", "Python"], "numHackathons": "3"}"#
                    .to_string(),
            ),
        };
        let extractor = ProfileExtractor::new(stub);
        let profile = extractor.extract("some repos", SourceKind::Github).await.unwrap();

        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(profile.skills, vec!["Rust", "Python"]);
        assert_eq!(profile.num_hackathons, 3);
        // Uninferred fields come back empty, never missing
        assert_eq!(profile.email, "");
        assert!(profile.tech_stack.is_empty());
    }

    #[tokio::test]
    async fn test_garbage_response_is_a_hard_error() {
        let stub = StubGenerator {
            reply: Some("I could not find a profile in this text.".to_string()),
        };
        let extractor = ProfileExtractor::new(stub);
        let result = extractor.extract("nonsense", SourceKind::Resume).await;
        assert!(matches!(result, Err(ExtractionError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_gateway_failure_is_a_hard_error() {
        let extractor = ProfileExtractor::new(StubGenerator { reply: None });
        let result = extractor.extract("text", SourceKind::Resume).await;
        assert!(matches!(result, Err(ExtractionError::Gateway(_))));
    }
}
