use crate::models::EnrichedMatch;

/// Clamp a model score into 0-100 and round it to an integer.
#[inline]
pub fn clamp_score(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, 100.0).round() as u8
}

/// Order matches by score (descending) and keep the first `max_results`.
///
/// The sort is stable, so equal scores keep the order they came in with.
pub fn rank_matches(mut matches: Vec<EnrichedMatch>, max_results: usize) -> Vec<EnrichedMatch> {
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches.truncate(max_results);
    matches
}
