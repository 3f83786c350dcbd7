//! name matching with `*` as the only special character
//!
//! `*` matches any (possibly empty) run of characters. Everything else is matched literally and
//! case-sensitively. Matching works on `char`s, so multi-byte characters are never split.
//!
//! Interior literals are searched left to right, first occurrence wins, without backtracking.
//! An interior literal may not reach into the characters that the trailing literal needs:
//! `a*c*c` does not match `ac`.

/// Returns true if `name` matches `pattern`
pub fn matches(name: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return name == pattern;
    }

    let name: Vec<char> = name.chars().collect();
    let parts: Vec<Vec<char>> = pattern.split('*').map(|part| part.chars().collect()).collect();

    // a pattern containing `*` always splits into at least two parts
    let [first, interior @ .., last] = parts.as_slice() else {
        return false;
    };

    if !name.starts_with(first) || !name.ends_with(last) {
        return false;
    }

    if name.len() < first.len() + last.len() {
        return false;
    }

    let suffix_start = name.len() - last.len();
    let mut position = first.len();

    for part in interior.iter().filter(|part| !part.is_empty()) {
        let Some(offset) = find(&name[position..], part) else {
            return false;
        };

        position += offset + part.len();
        if position > suffix_start {
            tracing::trace!(pattern, "interior literal overlaps suffix");
            return false;
        }
    }

    true
}

/// Returns true if `name` matches at least one of `patterns`
pub fn matches_any<S: AsRef<str>>(name: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|pattern| matches(name, pattern.as_ref()))
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }

    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
