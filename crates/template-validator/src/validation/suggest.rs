//! "Did you mean" suggestions for unknown identifiers

/// Closest candidate by normalized Levenshtein similarity, if close enough
pub fn closest<'a, I>(unknown: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|c| *c != unknown)
        .map(|c| (c, strsim::normalized_levenshtein(unknown, c)))
        .filter(|(_, score)| *score >= 0.6)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| format!("did you mean '{}'?", c))
}
