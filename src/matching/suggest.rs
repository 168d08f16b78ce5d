//! "Did you mean" suggestions for catalog names that do not exist.
//!
//! Scores every known name against the requested one:
//! - Case-insensitive equality scores 95
//! - Substring containment scores 85-95 depending on how much is covered
//! - Otherwise a Levenshtein similarity scaled to 0-85

/// Maximum number of suggestions attached to a lookup error.
pub const MAX_SUGGESTIONS: usize = 3;

/// Minimum score for a name to be suggested.
pub const MIN_SUGGESTION_SCORE: u8 = 50;

/// Suggest up to [`MAX_SUGGESTIONS`] known names close to `requested`,
/// best first (ties broken alphabetically).
pub fn suggest_names<'a, I>(requested: &str, names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = normalize_name(requested);

    let mut scored: Vec<(u8, &str)> = names
        .into_iter()
        .map(|name| (similarity(&query, &normalize_name(name)), name))
        .filter(|(score, _)| *score >= MIN_SUGGESTION_SCORE)
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.truncate(MAX_SUGGESTIONS);

    scored.into_iter().map(|(_, name)| name.to_string()).collect()
}

/// Normalize a catalog name for comparison.
///
/// Converts to lowercase and collapses whitespace.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity score (0-95) between two normalized names.
fn similarity(query: &str, target: &str) -> u8 {
    if query.is_empty() || target.is_empty() {
        return 0;
    }

    if query == target {
        return 95;
    }

    if target.contains(query) {
        let ratio = query.len() as f64 / target.len() as f64;
        return (85.0 * ratio + 10.0).min(95.0) as u8;
    }

    if query.contains(target) {
        return 85;
    }

    let distance = levenshtein_distance(query, target);
    let max_len = query.chars().count().max(target.chars().count());

    if distance as f64 / max_len as f64 > 0.5 {
        return 0;
    }

    let similarity = 1.0 - (distance as f64 / max_len as f64);
    (similarity * 85.0) as u8
}

/// Calculate Levenshtein distance between two strings.
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    // Two rolling rows instead of the full matrix
    let mut previous: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut current = vec![0; s2_chars.len() + 1];

    for (i, c1) in s1_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[s2_chars.len()]
}
