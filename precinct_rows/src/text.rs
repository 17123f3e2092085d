//! Small text predicates shared by the county readers.
//!
//! The reports are produced by different vendors, so none of these functions
//! try to be clever: they implement the few checks that all the readers rely
//! on to recognize a line.

/// Collapses all the runs of whitespace (including line breaks) into a single
/// space and trims both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// True if the token is made only of ASCII digits.
pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// True if the line has at least one cased character and none of them
/// are lower case.
///
/// Office titles are printed in capitals in most reports, which is how
/// they get told apart from precinct names.
pub fn is_upper(s: &str) -> bool {
    s.chars().any(|c| c.is_uppercase()) && !s.chars().any(|c| c.is_lowercase())
}

/// Parses the vote count of a cell. Only plain digit tokens are accepted.
pub fn parse_votes(s: &str) -> Option<u64> {
    let t = s.trim();
    if is_digits(t) {
        t.parse::<u64>().ok()
    } else {
        None
    }
}

/// Splits a whitespace-separated line into its leading tokens and the
/// `count` vote columns that end it.
///
/// Returns `None` when the line has fewer than `min_tokens` tokens or when
/// one of the last `count` tokens is not a number.
pub fn split_trailing_counts(
    line: &str,
    count: usize,
    min_tokens: usize,
) -> Option<(Vec<&str>, Vec<u64>)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < min_tokens.max(count) {
        return None;
    }
    let (head, tail) = parts.split_at(parts.len() - count);
    if !tail.iter().all(|p| is_digits(p)) {
        return None;
    }
    // Digit runs that overflow are not vote counts either.
    let counts: Option<Vec<u64>> = tail.iter().map(|p| p.parse::<u64>().ok()).collect();
    counts.map(|c| (head.to_vec(), c))
}

/// True if the label mentions a write-in, in any case.
pub fn mentions_write_in(s: &str) -> bool {
    s.to_lowercase().contains("write")
}

/// Turns a section title into a file stem.
///
/// Characters other than alphanumerics, spaces, `_` and `-` are replaced by
/// `_`, spaces become `_`, doubled underscores are collapsed once and the
/// stem is trimmed of underscores. An empty result becomes `Untitled`.
pub fn section_file_stem(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = replaced
        .replace(' ', "_")
        .replace("__", "_")
        .trim_matches('_')
        .to_string();
    if stem.is_empty() {
        "Untitled".to_string()
    } else {
        stem
    }
}
