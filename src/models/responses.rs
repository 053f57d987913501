use serde::{Deserialize, Serialize};
use crate::models::domain::{ChatMessage, MatchResult, MAX_PENDING_REQUESTS};

/// Wire shape of a compatibility verdict
///
/// This is the serialization boundary where the internal four-tier band
/// collapses to the two-value category the client displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub score: f64,
    pub category: String,
    pub reason: String,
    #[serde(rename = "neededRoles")]
    pub needed_roles: Vec<String>,
}

impl From<&MatchResult> for MatchResponse {
    fn from(result: &MatchResult) -> Self {
        Self {
            score: result.score,
            category: result.category().to_string(),
            reason: result.reason.clone(),
            needed_roles: result.needed_roles.clone(),
        }
    }
}

/// One entry of a batch scoring response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    #[serde(flatten)]
    pub verdict: MatchResponse,
}

/// Response for the batch scoring endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchScoreResponse {
    pub results: Vec<CandidateScore>,
}

/// Response for the pending-request count endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCountResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "requestCount")]
    pub request_count: usize,
    #[serde(rename = "maxRequests")]
    pub max_requests: usize,
}

impl PendingCountResponse {
    pub fn new(user_id: String, request_count: usize) -> Self {
        Self {
            user_id,
            request_count,
            max_requests: MAX_PENDING_REQUESTS,
        }
    }
}

/// Response for the team message listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub messages: Vec<ChatMessage>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
