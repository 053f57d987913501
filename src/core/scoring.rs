use crate::core::parse::{
    coerce_number, extract_object, field_str, field_str_list, JsonExtractError,
};
use crate::core::prompt::build_match_prompt;
use crate::models::{MatchResult, MatchTier, UserProfile};
use crate::services::llm::{LlmError, TextGenerator};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Score substituted when the reasoning pipeline fails
pub const DEGRADED_SCORE: f64 = 50.0;

/// Why a scoring call fell back to the degraded result
#[derive(Debug, Error)]
pub enum DegradeReason {
    #[error("reasoning service unavailable: {0}")]
    Upstream(#[from] LlmError),

    #[error("unparseable reasoning response: {0}")]
    Malformed(#[from] JsonExtractError),
}

/// Outcome of a scoring call
///
/// Scoring never errors: failures are folded into a synthetic neutral result
/// so every caller gets a well-formed score. The tag keeps the failure
/// visible in-process; the HTTP layer decides what to surface.
#[derive(Debug)]
pub enum ScoreOutcome {
    Scored(MatchResult),
    Degraded {
        result: MatchResult,
        reason: DegradeReason,
    },
}

impl ScoreOutcome {
    pub fn result(&self) -> &MatchResult {
        match self {
            Self::Scored(result) | Self::Degraded { result, .. } => result,
        }
    }

    pub fn into_result(self) -> MatchResult {
        match self {
            Self::Scored(result) | Self::Degraded { result, .. } => result,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Fields pulled out of the reasoning response before normalization
///
/// The upstream `category` string is deliberately not represented: the tier
/// is recomputed from the clamped score and never trusted verbatim.
#[derive(Debug)]
struct RawVerdict {
    score: f64,
    reason: String,
    needed_roles: Vec<String>,
}

fn parse_verdict(text: &str) -> Result<RawVerdict, JsonExtractError> {
    let object = extract_object(text)?;

    let score_value = object
        .get("score")
        .ok_or(JsonExtractError::MissingField("score"))?;
    let score = coerce_number(score_value).ok_or(JsonExtractError::WrongType {
        field: "score",
        expected: "number",
    })?;

    Ok(RawVerdict {
        score,
        reason: field_str(&object, "reason"),
        needed_roles: field_str_list(&object, "needed_roles"),
    })
}

fn normalize(raw: RawVerdict) -> MatchResult {
    let score = raw.score.clamp(0.0, 100.0);
    MatchResult {
        score,
        tier: MatchTier::from_score(score),
        reason: raw.reason,
        needed_roles: raw.needed_roles,
    }
}

fn degraded(reason: DegradeReason) -> ScoreOutcome {
    let result = MatchResult {
        score: DEGRADED_SCORE,
        tier: MatchTier::from_score(DEGRADED_SCORE),
        reason: format!(
            "Compatibility could not be evaluated ({})",
            failure_class(&reason)
        ),
        needed_roles: vec![],
    };
    ScoreOutcome::Degraded { result, reason }
}

fn failure_class(reason: &DegradeReason) -> &'static str {
    match reason {
        DegradeReason::Upstream(_) => "reasoning service unavailable",
        DegradeReason::Malformed(_) => "reasoning response unreadable",
    }
}

async fn evaluate<G: TextGenerator>(gateway: &G, prompt: &str) -> ScoreOutcome {
    match gateway.generate(prompt).await {
        Ok(text) => match parse_verdict(&text) {
            Ok(raw) => ScoreOutcome::Scored(normalize(raw)),
            Err(e) => {
                tracing::warn!("Discarding unparseable scoring response: {}", e);
                degraded(DegradeReason::Malformed(e))
            }
        },
        Err(e) => {
            tracing::warn!("Scoring call failed upstream: {}", e);
            degraded(DegradeReason::Upstream(e))
        }
    }
}

/// Match Scoring Engine
///
/// Builds the evaluation prompt, invokes the reasoning gateway, and parses
/// and normalizes the verdict. Generic over the gateway seam so tests run
/// against deterministic stubs.
#[derive(Clone)]
pub struct ScoringEngine<G> {
    gateway: G,
}

impl<G: TextGenerator> ScoringEngine<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Score one candidate against the evaluator (and their roster, if any)
    pub async fn score(
        &self,
        evaluator: &UserProfile,
        candidate: &UserProfile,
        roster: &[UserProfile],
    ) -> ScoreOutcome {
        let prompt = build_match_prompt(evaluator, candidate, roster);
        evaluate(&self.gateway, &prompt).await
    }
}

impl<G: TextGenerator + Clone + 'static> ScoringEngine<G> {
    /// Score a list of candidates concurrently, bounded by `concurrency`
    ///
    /// The calls are independent; completions race, but the returned vector
    /// is positionally aligned with `candidates` and the method only returns
    /// once every evaluation has finished.
    pub async fn score_many(
        &self,
        evaluator: &UserProfile,
        candidates: &[UserProfile],
        roster: &[UserProfile],
        concurrency: usize,
    ) -> Vec<ScoreOutcome> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let prompt = build_match_prompt(evaluator, candidate, roster);
            let gateway = self.gateway.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, evaluate(&gateway, &prompt).await)
            });
        }

        let mut slots: Vec<Option<ScoreOutcome>> = (0..candidates.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!("Scoring task failed: {}", e),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    degraded(DegradeReason::Upstream(LlmError::InvalidResponse(
                        "scoring task aborted".to_string(),
                    )))
                })
            })
            .collect()
    }
}
