use serde::{Deserialize, Serialize};

/// Maximum number of members on a team. A team with 4 members is locked.
pub const TEAM_CAPACITY: usize = 4;

/// Maximum number of simultaneously pending team requests per sender.
pub const MAX_PENDING_REQUESTS: usize = 5;

/// Surfaced category threshold: scores at or above this map to "Strong Match".
pub const STRONG_MATCH_THRESHOLD: f64 = 85.0;

/// Hackathon participant profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Preferred role, free-form ("frontend", "ML", "design", ...)
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "techStack", default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub devpost: String,
    #[serde(rename = "hackathonIds", default)]
    pub hackathon_ids: Vec<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Hackathon listing, read-only from this service's perspective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hackathon {
    #[serde(rename = "$id", default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "startDate", default)]
    pub start_date: String,
    #[serde(rename = "endDate", default)]
    pub end_date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// A team forming (or formed) for a hackathon
///
/// Invariant: `members.len() <= TEAM_CAPACITY` and
/// `is_full == (members.len() == TEAM_CAPACITY)`. Membership is mutated only
/// through the assembly controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "hackathonId")]
    pub hackathon_id: String,
    pub members: Vec<String>,
    #[serde(rename = "neededRoles", default)]
    pub needed_roles: Vec<String>,
    #[serde(rename = "isFull", default)]
    pub is_full: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Team {
    /// Whether the team can still accept members
    pub fn is_open(&self) -> bool {
        self.members.len() < TEAM_CAPACITY
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

/// Lifecycle of a team request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Cancelled,
}

/// An invitation from one user to another to team up for a hackathon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRequest {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "fromUserId")]
    pub from_user_id: String,
    #[serde(rename = "toUserId")]
    pub to_user_id: String,
    #[serde(rename = "hackathonId")]
    pub hackathon_id: String,
    pub status: RequestStatus,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TeamRequest {
    pub fn involves(&self, user_id: &str) -> bool {
        self.from_user_id == user_id || self.to_user_id == user_id
    }
}

/// Team chat message (chat is delivered by client polling)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "teamId")]
    pub team_id: String,
    #[serde(rename = "senderId")]
    pub sender_id: String,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Internal four-tier compatibility band, recomputed from the clamped score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    DreamTeam,
    Strong,
    Average,
    Weak,
}

impl MatchTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::DreamTeam
        } else if score >= 70.0 {
            Self::Strong
        } else if score >= 40.0 {
            Self::Average
        } else {
            Self::Weak
        }
    }
}

/// Compatibility verdict produced by the scoring engine
///
/// Computed fresh on every scoring request, never persisted. The wire
/// category is derived from the score at the serialization boundary; the
/// four-tier band is kept here for in-process consumers.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub score: f64,
    pub tier: MatchTier,
    pub reason: String,
    pub needed_roles: Vec<String>,
}

impl MatchResult {
    /// Two-value category surfaced to clients
    pub fn category(&self) -> &'static str {
        if self.score >= STRONG_MATCH_THRESHOLD {
            "Strong Match"
        } else {
            "Good Match"
        }
    }
}

/// Profile draft produced by the extraction engine
///
/// Every field is always present; what the model cannot infer comes back as
/// an empty string, empty list, or zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "techStack", default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub devpost: String,
    #[serde(rename = "numHackathons", default)]
    pub num_hackathons: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_bands() {
        assert_eq!(MatchTier::from_score(95.0), MatchTier::DreamTeam);
        assert_eq!(MatchTier::from_score(90.0), MatchTier::DreamTeam);
        assert_eq!(MatchTier::from_score(89.9), MatchTier::Strong);
        assert_eq!(MatchTier::from_score(70.0), MatchTier::Strong);
        assert_eq!(MatchTier::from_score(69.9), MatchTier::Average);
        assert_eq!(MatchTier::from_score(40.0), MatchTier::Average);
        assert_eq!(MatchTier::from_score(39.9), MatchTier::Weak);
        assert_eq!(MatchTier::from_score(0.0), MatchTier::Weak);
    }

    #[test]
    fn test_surfaced_category_boundary() {
        let result = MatchResult {
            score: 85.0,
            tier: MatchTier::from_score(85.0),
            reason: String::new(),
            needed_roles: vec![],
        };
        assert_eq!(result.category(), "Strong Match");

        let result = MatchResult {
            score: 84.9,
            tier: MatchTier::from_score(84.9),
            reason: String::new(),
            needed_roles: vec![],
        };
        assert_eq!(result.category(), "Good Match");
    }

    #[test]
    fn test_team_open_and_full() {
        let mut team = Team {
            id: "t1".to_string(),
            hackathon_id: "h1".to_string(),
            members: vec!["a".to_string()],
            needed_roles: vec![],
            is_full: false,
            name: None,
            created_at: chrono::Utc::now(),
        };
        assert!(team.is_open());
        assert!(team.has_member("a"));
        assert!(!team.has_member("b"));

        team.members = vec!["a", "b", "c", "d"].into_iter().map(String::from).collect();
        assert!(!team.is_open());
    }
}
