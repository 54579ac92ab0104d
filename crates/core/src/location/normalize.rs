/// Canonical lookup key for a place name.
///
/// Lowercases, drops apostrophes and periods (so `St. Peter's` and `st peters` agree), and
/// folds every other run of non-alphanumeric characters into a single space. Leading and
/// trailing separators are removed. Applying it twice changes nothing.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if matches!(ch, '\'' | '\u{2019}' | '.') {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Levenshtein edit distance between `a` and `b`, counted in characters.
///
/// Uses two rolling rows. With a `max_distance`, returns `max_distance + 1` as soon as the
/// lengths differ by more than the bound or a whole row exceeds it.
pub fn levenshtein(a: &str, b: &str, max_distance: Option<usize>) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if let Some(max) = max_distance {
        if a.len().abs_diff(b.len()) > max {
            return max + 1;
        }
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];

        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }

        if let Some(max) = max_distance {
            if row_min > max {
                return max + 1;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    match max_distance {
        Some(max) if distance > max => max + 1,
        _ => distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_edges() {
        assert_eq!(normalize("  Paris  "), "paris");
        assert_eq!(normalize("NEW   York"), "new york");
    }

    #[test]
    fn normalizes_punctuation() {
        assert_eq!(normalize("Washington, D.C."), "washington dc");
        assert_eq!(normalize("St. Peter's Basilica"), "st peters basilica");
        assert_eq!(normalize("Rio-de_Janeiro"), "rio de janeiro");
        assert_eq!(normalize("São Paulo"), "são paulo");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in [
            "  Statue of Liberty ",
            "Washington, D.C.",
            "ÆRØ  island",
            "--",
            "",
            "JFK / Airport",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn levenshtein_reference_values() {
        assert_eq!(levenshtein("kitten", "sitting", None), 3);
        assert_eq!(levenshtein("", "abc", None), 3);
        assert_eq!(levenshtein("abc", "", None), 3);
        assert_eq!(levenshtein("paris", "paris", None), 0);
        assert_eq!(levenshtein("pari", "paris", None), 1);
    }

    #[test]
    fn levenshtein_bounded_returns_sentinel() {
        assert_eq!(levenshtein("kitten", "sitting", Some(2)), 3);
        assert_eq!(levenshtein("kitten", "sitting", Some(3)), 3);
        assert_eq!(levenshtein("a", "abcdef", Some(2)), 3);
        assert_eq!(levenshtein("zzzzzzzzzz", "paris", Some(2)), 3);
    }

    #[test]
    fn levenshtein_bounded_matches_unbounded_within_limit() {
        let pairs = [("london", "londn"), ("tokyo", "kyoto"), ("rome", "roma")];
        for (a, b) in pairs {
            let full = levenshtein(a, b, None);
            assert_eq!(levenshtein(a, b, Some(full)), full);
        }
    }
}
