use serde::{Deserialize, Serialize};

/// Which end of the query is dropped while searching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimEnd {
    /// Models a 5' overhang: the 3' end binds.
    Front,
    /// Models a 3' overhang: the 5' end binds.
    Back,
}

/// Inclusive template bounds of the longest trimmed `query` that occurs
/// literally in `template`, or `None` if no single base matches.
pub fn kmer_trimming_search(template: &str, query: &str, trim: TrimEnd) -> Option<(usize, usize)> {
    kmer_trimming_search_min(template, query, trim, 1)
}

/// As `kmer_trimming_search`, but never accepts a candidate shorter than
/// `min_len` bases.
pub fn kmer_trimming_search_min(
    template: &str,
    query: &str,
    trim: TrimEnd,
    min_len: usize,
) -> Option<(usize, usize)> {
    let template = template.to_ascii_uppercase();
    let query = query.to_ascii_uppercase();
    let query = query.as_bytes();
    let min_len = min_len.max(1);
    if query.len() < min_len {
        return None;
    }
    (min_len..=query.len()).rev().find_map(|len| {
        let candidate = match trim {
            TrimEnd::Front => &query[query.len() - len..],
            TrimEnd::Back => &query[..len],
        };
        find_subsequence(template.as_bytes(), candidate).map(|start| (start, start + len - 1))
    })
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
