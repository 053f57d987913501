use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to score a pair or a candidate against a team roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreMatchRequest {
    /// Evaluator (the user asking for the score)
    #[validate(length(min = 1))]
    #[serde(alias = "user1_id", rename = "user1Id")]
    pub user1_id: String,
    /// Candidate being evaluated
    #[validate(length(min = 1))]
    #[serde(alias = "user2_id", rename = "user2Id")]
    pub user2_id: String,
    /// Ids of the evaluator's current team members, if any
    #[serde(default)]
    #[serde(alias = "team_member_ids", rename = "teamMemberIds")]
    pub team_member_ids: Vec<String>,
    #[serde(default)]
    #[serde(alias = "hackathon_id", rename = "hackathonId")]
    pub hackathon_id: Option<String>,
}

/// Request to score a list of candidates against one evaluator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BatchScoreRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_ids", rename = "candidateIds")]
    pub candidate_ids: Vec<String>,
    #[serde(default)]
    #[serde(alias = "team_member_ids", rename = "teamMemberIds")]
    pub team_member_ids: Vec<String>,
    #[serde(default)]
    #[serde(alias = "hackathon_id", rename = "hackathonId")]
    pub hackathon_id: Option<String>,
}

/// Request to join (or create) the open team for a hackathon
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JoinTeamRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "hackathon_id", rename = "hackathonId")]
    pub hackathon_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Body for creating a team request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequestBody {
    #[validate(length(min = 1))]
    #[serde(alias = "from_user_id", rename = "fromUserId")]
    pub from_user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "to_user_id", rename = "toUserId")]
    pub to_user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "hackathon_id", rename = "hackathonId")]
    pub hackathon_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for accepting a team request; the caller identifies themselves
/// explicitly, there is no ambient actor identity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AcceptRequestBody {
    #[validate(length(min = 1))]
    #[serde(alias = "current_user_id", rename = "currentUserId")]
    pub current_user_id: String,
}

/// Body for extracting a profile draft from a source
///
/// Exactly one of `github_url` or `resume_text` must be set. PDF decoding
/// happens in the upload pipeline; resumes arrive here already as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractProfileRequest {
    #[serde(default)]
    #[serde(alias = "github_url", rename = "githubUrl")]
    pub github_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "resume_text", rename = "resumeText")]
    pub resume_text: Option<String>,
}

/// Body for posting a chat message to a team
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostMessageRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "sender_id", rename = "senderId")]
    pub sender_id: String,
    #[validate(length(min = 1))]
    pub content: String,
}
