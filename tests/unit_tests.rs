// Unit tests for HackMate Algo

use hackmate_algo::core::parse::{extract_object, first_object_span, JsonExtractError};
use hackmate_algo::core::prompt::{build_extraction_prompt, build_match_prompt, format_list};
use hackmate_algo::models::{
    MatchResult, MatchTier, PendingCountResponse, MatchResponse, UserProfile,
    MAX_PENDING_REQUESTS,
};

fn profile(name: &str, role: &str, skills: &[&str], stack: &[&str]) -> UserProfile {
    UserProfile {
        user_id: name.to_lowercase(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role: role.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        tech_stack: stack.iter().map(|s| s.to_string()).collect(),
        experience: vec![],
        school: "MIT".to_string(),
        location: "Boston".to_string(),
        bio: String::new(),
        github: String::new(),
        devpost: String::new(),
        hackathon_ids: vec![],
        created_at: None,
    }
}

#[test]
fn test_format_list_dedups_and_joins() {
    let items: Vec<String> = ["React", "Node.js", "React", "Postgres", "Node.js"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(format_list(&items), "React, Node.js, Postgres");
}

#[test]
fn test_prompt_is_deterministic() {
    let a = profile("Ada", "backend", &["Rust"], &["Postgres", "Redis"]);
    let b = profile("Grace", "frontend", &["React"], &["TypeScript"]);
    let teammate = profile("Linus", "infra", &["Go"], &["Kubernetes"]);

    assert_eq!(
        build_match_prompt(&a, &b, &[]),
        build_match_prompt(&a, &b, &[])
    );
    assert_eq!(
        build_match_prompt(&a, &b, std::slice::from_ref(&teammate)),
        build_match_prompt(&a, &b, std::slice::from_ref(&teammate))
    );
}

#[test]
fn test_pair_and_team_templates_differ() {
    let a = profile("Ada", "backend", &["Rust"], &[]);
    let b = profile("Grace", "frontend", &["React"], &[]);
    let teammate = profile("Linus", "infra", &["Go"], &[]);

    let pair = build_match_prompt(&a, &b, &[]);
    let team = build_match_prompt(&a, &b, std::slice::from_ref(&teammate));
    assert_ne!(pair, team);
    assert!(team.contains("Current team roster"));
    assert!(!pair.contains("Current team roster"));
}

#[test]
fn test_extraction_prompt_names_every_key() {
    let prompt = build_extraction_prompt("some text", "resume");
    for key in [
        "name",
        "email",
        "role",
        "skills",
        "techStack",
        "experience",
        "school",
        "location",
        "description",
        "github",
        "devpost",
        "numHackathons",
    ] {
        assert!(prompt.contains(key), "prompt missing key {}", key);
    }
}

#[test]
fn test_object_span_ignores_trailing_braces() {
    let text = "prefix {\"a\": 1} suffix {\"b\": 2}";
    assert_eq!(first_object_span(text).unwrap(), "{\"a\": 1}");
}

#[test]
fn test_extract_object_from_fenced_response() {
    let text = "```json\n{\"score\": 88}\n```";
    let value = extract_object(text).unwrap();
    assert_eq!(value["score"], 88);
}

#[test]
fn test_extract_object_failure_kinds() {
    assert!(matches!(
        extract_object("no json here"),
        Err(JsonExtractError::NoObject)
    ));
    assert!(matches!(
        extract_object("{\"score\": 1,}"),
        Err(JsonExtractError::Syntax(_))
    ));
}

#[test]
fn test_tier_and_category_agree_on_bands() {
    for (score, tier) in [
        (95.0, MatchTier::DreamTeam),
        (78.0, MatchTier::Strong),
        (55.0, MatchTier::Average),
        (20.0, MatchTier::Weak),
    ] {
        assert_eq!(MatchTier::from_score(score), tier);
    }
}

#[test]
fn test_match_response_collapses_tiers() {
    // Strong tier (78) still surfaces as "Good Match": only the >= 85 cut
    // shows "Strong Match" on the wire.
    let result = MatchResult {
        score: 78.0,
        tier: MatchTier::from_score(78.0),
        reason: "Pros: complementary. Major Risk: none".to_string(),
        needed_roles: vec!["design".to_string()],
    };
    let response = MatchResponse::from(&result);
    assert_eq!(response.category, "Good Match");
    assert_eq!(response.score, 78.0);
    assert_eq!(response.needed_roles, vec!["design"]);

    let result = MatchResult {
        score: 92.0,
        tier: MatchTier::from_score(92.0),
        reason: String::new(),
        needed_roles: vec![],
    };
    assert_eq!(MatchResponse::from(&result).category, "Strong Match");
}

#[test]
fn test_match_response_wire_shape() {
    let result = MatchResult {
        score: 66.0,
        tier: MatchTier::from_score(66.0),
        reason: "r".to_string(),
        needed_roles: vec![],
    };
    let json = serde_json::to_value(MatchResponse::from(&result)).unwrap();
    assert_eq!(json["score"], 66.0);
    assert_eq!(json["category"], "Good Match");
    assert_eq!(json["reason"], "r");
    assert!(json["neededRoles"].as_array().unwrap().is_empty());
}

#[test]
fn test_pending_count_response_carries_limit() {
    let response = PendingCountResponse::new("u1".to_string(), 3);
    assert_eq!(response.max_requests, MAX_PENDING_REQUESTS);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["userId"], "u1");
    assert_eq!(json["requestCount"], 3);
    assert_eq!(json["maxRequests"], 5);
}
