use crate::models::UserProfile;

/// Shared evaluation rubric interpolated into both templates
///
/// The reasoning service's behavior depends on this exact wording; change it
/// and golden outputs change with it.
const RUBRIC: &str = "\
Scoring rules:
- If both people prefer the same role, apply a role-overlap penalty of 10-20 points.
- Award a complementarity bonus when tech stacks cover each other's gaps. Strong pairings: frontend + backend, web + mobile, ML + product engineering, design + engineering, infrastructure + application.
- Shared schools, locations, or past hackathon experience are minor positives, worth at most 5 points.
- Score bands: 90-100 Dream Team, 70-89 Strong, 40-69 Average, 0-39 Weak.
Respond with ONLY a JSON object, no other text:
{\"score\": <number 0-100>, \"category\": \"<band name>\", \"reason\": \"Pros: <two or three concrete strengths>. Major Risk: <the single biggest risk>\", \"needed_roles\": [<roles the team still needs, as short strings>]}";

/// Deduplicate (first occurrence wins) and join a list for interpolation
pub fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        return "none listed".to_string();
    }
    let mut seen: Vec<&str> = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(&item.as_str()) {
            seen.push(item);
        }
    }
    seen.join(", ")
}

fn format_scalar(value: &str) -> &str {
    if value.is_empty() {
        "not specified"
    } else {
        value
    }
}

/// Render one profile as the block of labelled lines both templates use
fn profile_block(profile: &UserProfile) -> String {
    format!(
        "Name: {}\nPreferred role: {}\nSkills: {}\nTech stack: {}\nExperience: {}\nSchool: {}\nLocation: {}\nBio: {}",
        profile.name,
        format_scalar(&profile.role),
        format_list(&profile.skills),
        format_list(&profile.tech_stack),
        format_list(&profile.experience),
        format_scalar(&profile.school),
        format_scalar(&profile.location),
        format_scalar(&profile.bio),
    )
}

/// Build the evaluation prompt for a pair or a candidate-versus-roster
///
/// Pure function of its inputs: identical profiles and roster produce
/// byte-identical text. Template choice depends only on whether the roster
/// is empty.
pub fn build_match_prompt(
    evaluator: &UserProfile,
    candidate: &UserProfile,
    roster: &[UserProfile],
) -> String {
    if roster.is_empty() {
        format!(
            "You are an expert hackathon team advisor. Evaluate how compatible the two people below would be as hackathon teammates.\n\n\
             Person A:\n{}\n\nPerson B:\n{}\n\n{}",
            profile_block(evaluator),
            profile_block(candidate),
            RUBRIC,
        )
    } else {
        let roster_blocks = roster
            .iter()
            .map(profile_block)
            .collect::<Vec<_>>()
            .join("\n---\n");
        format!(
            "You are an expert hackathon team advisor. {} already has a partially formed team. \
             Evaluate how well the candidate below would complement the existing roster, and which roles the team would still need after adding them.\n\n\
             Current team roster:\n{}\n\nTeam owner:\n{}\n\nCandidate:\n{}\n\n{}",
            evaluator.name,
            roster_blocks,
            profile_block(evaluator),
            profile_block(candidate),
            RUBRIC,
        )
    }
}

/// Build the profile-extraction prompt for a flattened source text
///
/// One universal template today; the source hint selects the lead-in so the
/// two source kinds can diverge later without touching callers.
pub fn build_extraction_prompt(source_text: &str, source_label: &str) -> String {
    format!(
        "You are a profile parser. The text below was gathered from a {}. \
         Extract the person's profile from it.\n\n\
         Respond with ONLY a JSON object, no other text, with exactly these keys \
         (use \"\" for strings, [] for lists, and 0 for numbers you cannot infer):\n\
         {{\"name\": \"\", \"email\": \"\", \"role\": \"\", \"skills\": [], \"techStack\": [], \
         \"experience\": [], \"school\": \"\", \"location\": \"\", \"description\": \"\", \
         \"github\": \"\", \"devpost\": \"\", \"numHackathons\": 0}}\n\n\
         Source text:\n{}",
        source_label, source_text,
    )
}
