// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ChatMessage, ExtractedProfile, Hackathon, MatchResult, MatchTier, RequestStatus, Team,
    TeamRequest, UserProfile, MAX_PENDING_REQUESTS, STRONG_MATCH_THRESHOLD, TEAM_CAPACITY,
};
pub use requests::{
    AcceptRequestBody, BatchScoreRequest, CreateRequestBody, ExtractProfileRequest,
    JoinTeamRequest, PostMessageRequest, ScoreMatchRequest,
};
pub use responses::{
    BatchScoreResponse, CandidateScore, ErrorResponse, HealthResponse, MatchResponse,
    MessageListResponse, PendingCountResponse,
};
