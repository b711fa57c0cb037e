use crate::models::{CandidatePool, MatchingRules, SeekerProfile, UserProfile};

const NO_BIO: &str = "No bio provided";
const NO_INTERESTS: &str = "None listed";

fn interests_line(interests: &[String]) -> String {
    if interests.is_empty() {
        NO_INTERESTS.to_string()
    } else {
        interests.join(", ")
    }
}

fn bio_line(bio: &str) -> &str {
    if bio.trim().is_empty() {
        NO_BIO
    } else {
        bio
    }
}

/// Render the matchmaking prompt
///
/// Candidates are labelled only by their 0-based position in `pool`; store
/// ids never reach the model.
pub fn build_match_prompt(
    seeker: &SeekerProfile,
    pool: &CandidatePool,
    rules: &MatchingRules,
) -> String {
    let mut prompt = String::from(
        "You are a study buddy matchmaking assistant. Analyze the following user profile \
         and candidate profiles to suggest the best study matches.\n\n",
    );

    prompt.push_str("Current User Profile:\n");
    prompt.push_str(&format!("- Interests: {}\n", interests_line(&seeker.interests)));
    prompt.push_str(&format!("- Bio: {}\n\n", bio_line(&seeker.bio)));

    prompt.push_str("Candidate Profiles:\n");
    for (index, candidate) in pool.iter() {
        prompt.push_str(&format!("\nCandidate {}: {}\n", index, candidate.name));
        prompt.push_str(&format!("   - Interests: {}\n", interests_line(&candidate.interests)));
        prompt.push_str(&format!("   - Bio: {}\n", bio_line(&candidate.bio)));
    }

    prompt.push_str(&format!(
        "\nFor each candidate, provide a match score (0-100) and a brief, friendly explanation \
         (max {} words) of why they would be a good study buddy. Consider, in order of importance:\n\
         1. Overlapping interests (most important)\n\
         2. Complementary skills\n\
         3. Bio compatibility\n\
         4. Study style hints\n\n",
        rules.reason_word_limit
    ));

    prompt.push_str(
        "Respond with a single valid JSON object and nothing else, using exactly this schema:\n\
         {\n  \"matches\": [\n    {\n      \"candidateIndex\": 0,\n      \"score\": 85,\n      \
         \"reason\": \"Your explanation here\"\n    }\n  ]\n}\n\
         Field types: \"candidateIndex\" is an integer, the candidate number shown above; \
         \"score\" is an integer from 0 to 100; \"reason\" is a string.\n\n",
    );

    prompt.push_str(&format!(
        "Only include candidates with score >= {}. Sort by score descending.",
        rules.min_score
    ));

    prompt
}

/// Render the conversation starter prompt for `me` reaching out to `them`
pub fn build_starter_prompt(me: &UserProfile, them: &UserProfile) -> String {
    let mut prompt = String::from(
        "Generate 4 friendly, natural conversation starters for a study buddy connection.\n\n",
    );

    for (heading, profile) in [("Your Profile", me), ("Their Profile", them)] {
        prompt.push_str(&format!("{}:\n", heading));
        prompt.push_str(&format!("- Name: {}\n", profile.name));
        prompt.push_str(&format!("- Interests: {}\n", interests_line(&profile.interests)));
        prompt.push_str(&format!("- Bio: {}\n\n", bio_line(&profile.bio)));
    }

    prompt.push_str(
        "Create conversation starters that:\n\
         1. Reference shared interests\n\
         2. Are casual and friendly\n\
         3. Invite collaboration\n\
         4. Are 10-20 words each\n\n\
         Respond with a single valid JSON object and nothing else, using exactly this schema \
         (\"starters\" is an array of strings):\n\
         {\n  \"starters\": [\n    \"Your starter here\",\n    \"Another starter\",\n    \
         \"Third starter\",\n    \"Fourth starter\"\n  ]\n}",
    );

    prompt
}
