/// Fuzzy title matching
///
/// Scores are integers in 0..=100 computed as a weighted ratio over normalized
/// Levenshtein similarity: plain ratio, token-sorted ratio and token-set ratio,
/// switching to best-window partial variants when one string is much longer than
/// the other. Identical (normalized) strings score 100; disjoint strings score low.
///
/// The base ratio is edit distance over the longer length, so an insertion costs more
/// than it would under an indel ratio over the summed lengths.
use strsim::normalized_levenshtein;

/// Best candidate for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch<'a> {
    /// Position of the candidate in the input sequence
    pub index: usize,
    pub choice: &'a str,
    pub score: u8,
}

const UNBASE_SCALE: f64 = 0.95;

/// Returns the highest-scoring candidate for `query`
///
/// Ties keep the earliest candidate. Returns `None` only when there are no candidates.
pub fn extract_one<'a, I>(query: &str, candidates: I) -> Option<FuzzyMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = normalize(query);
    let mut best: Option<FuzzyMatch<'a>> = None;

    for (index, choice) in candidates.into_iter().enumerate() {
        let score = weighted_ratio_normalized(&query, &normalize(choice));
        if best.map_or(true, |b| score > b.score) {
            best = Some(FuzzyMatch {
                index,
                choice,
                score,
            });
            if score == 100 {
                break;
            }
        }
    }

    best
}

/// Similarity score between two raw strings in 0..=100
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    weighted_ratio_normalized(&normalize(a), &normalize(b))
}

fn weighted_ratio_normalized(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = ratio(a, b);

    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let best = if len_ratio < 1.5 {
        let sorted = ratio(&sorted_tokens(a), &sorted_tokens(b)) * UNBASE_SCALE;
        let set = token_set_ratio(a, b, ratio) * UNBASE_SCALE;
        base.max(sorted).max(set)
    } else {
        let partial_scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
        let partial = partial_ratio(a, b) * partial_scale;
        let sorted =
            partial_ratio(&sorted_tokens(a), &sorted_tokens(b)) * UNBASE_SCALE * partial_scale;
        let set = token_set_ratio(a, b, partial_ratio) * UNBASE_SCALE * partial_scale;
        base.max(partial).max(sorted).max(set)
    };

    best.round().clamp(0.0, 100.0) as u8
}

/// Lowercases and replaces anything that is not alphanumeric with a space
fn normalize(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

/// Best ratio of the shorter string against every same-length window of the longer
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let short_len = short.chars().count();
    let long_chars: Vec<char> = long.chars().collect();
    if short_len == 0 {
        return 0.0;
    }
    if short_len == long_chars.len() {
        return ratio(short, long);
    }

    let mut best: f64 = 0.0;
    for window in long_chars.windows(short_len) {
        let window: String = window.iter().collect();
        best = best.max(ratio(short, &window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Compares the shared tokens of both strings against each side's remainder
fn token_set_ratio(a: &str, b: &str, scorer: fn(&str, &str) -> f64) -> f64 {
    let mut tokens_a: Vec<&str> = a.split_whitespace().collect();
    let mut tokens_b: Vec<&str> = b.split_whitespace().collect();
    tokens_a.sort_unstable();
    tokens_a.dedup();
    tokens_b.sort_unstable();
    tokens_b.dedup();

    let shared: Vec<&str> = tokens_a
        .iter()
        .copied()
        .filter(|t| tokens_b.binary_search(t).is_ok())
        .collect();
    let only_a: Vec<&str> = tokens_a
        .iter()
        .copied()
        .filter(|t| shared.binary_search(t).is_err())
        .collect();
    let only_b: Vec<&str> = tokens_b
        .iter()
        .copied()
        .filter(|t| shared.binary_search(t).is_err())
        .collect();

    let shared = shared.join(" ");
    let combined_a = join_nonempty(&shared, &only_a.join(" "));
    let combined_b = join_nonempty(&shared, &only_b.join(" "));

    let mut best = scorer(&combined_a, &combined_b);
    if !shared.is_empty() {
        best = best
            .max(scorer(&shared, &combined_a))
            .max(scorer(&shared, &combined_b));
    }
    best
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}
