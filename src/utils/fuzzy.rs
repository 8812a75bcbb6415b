// Fuzzy matching for "did you mean" suggestions on names and field keys

/// Minimum number of single-character edits turning `s1` into `s2`
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut diagonal = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let next = (row[j] + 1)
                .min(row[j - 1] + 1)
                .min(diagonal + cost);
            diagonal = row[j];
            row[j] = next;
        }
    }
    row[b.len()]
}

/// Case-insensitive substring test
pub fn is_substring_match(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Near matches for `search` among `candidates`, closest first, at most 5.
///
/// A candidate that merely extends `search` (prefix or substring) is also
/// accepted with a distance equal to the extra characters, so
/// `first_inter` still finds `first_interview`.
pub fn find_near_matches<S: AsRef<str>>(
    search: &str,
    candidates: &[S],
    max_distance: usize,
) -> Vec<(String, usize)> {
    let search_lower = search.to_lowercase();
    let mut matches: Vec<(String, usize)> = Vec::new();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let candidate_lower = candidate.to_lowercase();
        let distance = levenshtein_distance(&search_lower, &candidate_lower);

        if distance <= max_distance {
            matches.push((candidate.to_string(), distance));
        } else if !search_lower.is_empty()
            && search_lower.len() < candidate_lower.len()
            && candidate_lower.contains(&search_lower)
        {
            let extra = candidate_lower.len() - search_lower.len();
            let substring_distance = if candidate_lower.starts_with(&search_lower) {
                extra
            } else {
                extra + 1
            };
            if substring_distance <= max_distance + 2 {
                matches.push((candidate.to_string(), substring_distance.min(max_distance)));
            }
        }
    }

    matches.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    matches.dedup_by(|a, b| a.0 == b.0);
    matches.into_iter().take(5).collect()
}

/// Closest single candidate within `max_distance`, if any
pub fn closest_match<'a>(search: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let search = search.to_lowercase();
    candidates
        .iter()
        .map(|c| (*c, levenshtein_distance(&search, &c.to_lowercase())))
        .filter(|(_, d)| *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("same", "same"), 0);
        assert_eq!(levenshtein_distance("面接", "面談"), 1);
    }

    #[test]
    fn test_is_substring_match() {
        assert!(is_substring_match("first_interview", "INTERVIEW"));
        assert!(!is_substring_match("offer", "interview"));
    }

    #[test]
    fn test_find_near_matches() {
        let stages = vec![
            "briefing".to_string(),
            "first_interview".to_string(),
            "final_interview".to_string(),
            "offer".to_string(),
        ];

        let matches = find_near_matches("Offer", &stages, 3);
        assert_eq!(matches[0], ("offer".to_string(), 0));

        let matches = find_near_matches("breifing", &stages, 3);
        assert_eq!(matches[0].0, "briefing");

        let matches = find_near_matches("first_inter", &stages, 3);
        assert!(matches.iter().any(|(name, _)| name == "first_interview"));

        assert!(find_near_matches("aptitude", &stages, 2).is_empty());
    }

    #[test]
    fn test_closest_match() {
        let fields = ["display", "description", "duration"];
        assert_eq!(closest_match("dispaly", &fields, 3), Some("display"));
        assert_eq!(closest_match("zzzzzzzz", &fields, 3), None);
    }
}
